//! Admin content editing.
//!
//! ## Features
//!
//! - Section listings grouped by key prefix, with search
//! - Single and batch saves with cache invalidation and path revalidation
//! - Short-lived "saved" markers per row
//! - Seeding the content table from the bundled dictionaries

mod draft;
mod editor;
mod grouping;
mod revalidate;
mod seed;
mod tracker;

pub use draft::{is_long_content, RowDraft, RowStatus, StatusLabel};
pub use editor::{BatchFailure, ContentEdit, ContentEditor, SaveOutcome};
pub use grouping::{build_listing, filter_groups, group_by_prefix, ContentGroup, ContentListing, ListingState};
pub use revalidate::Revalidator;
pub use seed::{seed, seed_rows, SeedReport};
pub use tracker::{SaveTracker, SAVED_INDICATOR};
