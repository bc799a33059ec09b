//! Database module - content table access.
//!
//! The content table lives in a hosted database. Access goes through the
//! [`ContentStore`] trait so the resolution and editing layers never depend
//! on a particular backend:
//!
//! - `supabase` - PostgREST over HTTPS (production default)
//! - `mongo` - MongoDB collections with the same row shapes

mod models;
mod mongo;
mod supabase;

#[cfg(test)]
pub mod memory;

pub use models::*;
pub use mongo::{Database, MongoContentStore};
pub use supabase::SupabaseContentStore;

use async_trait::async_trait;

use crate::error::ContentResult;

/// Table-level operations on site content and its reference data.
///
/// Read failures caused by the backend being unreachable or refusing the
/// request surface as `ContentError::DataSourceUnavailable`; rejected writes
/// as `Persistence`, missing rows as `NotFound`, stale optimistic writes as
/// `WriteConflict`.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// Every content row, ordered by section then sort order.
    async fn fetch_all(&self) -> ContentResult<Vec<ContentItem>>;

    /// Rows of one section, ordered by sort order.
    async fn fetch_section(&self, section: &str) -> ContentResult<Vec<ContentItem>>;

    /// One row by id.
    async fn fetch_item(&self, id: &str) -> ContentResult<Option<ContentItem>>;

    /// Section reference data, ordered by sort order.
    async fn fetch_sections(&self) -> ContentResult<Vec<ContentSection>>;

    /// Write both locale values and the edit stamp of one row.
    async fn update_item(&self, update: &ContentUpdate) -> ContentResult<ContentItem>;

    /// Insert or update rows by `content_key`. Returns the number written.
    async fn upsert_items(&self, items: &[NewContentItem]) -> ContentResult<usize>;

    /// Look up an active admin by auth user id.
    async fn find_admin(&self, user_id: &str) -> ContentResult<Option<AdminUser>>;
}
