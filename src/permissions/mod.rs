//! Admin access for the content dashboard.
//!
//! ## Features
//!
//! - Cached admin lookups (reduces database hits)
//! - Owner ids from configuration that bypass the lookup
//!
//! ## Usage
//!
//! ```rust,ignore
//! let guard = AdminGuard::new(store.clone(), &registry, config.owner_ids.clone());
//!
//! let admin = guard.require_editor(headers.admin_user()).await?;
//! ```

mod checker;

pub use checker::AdminGuard;
