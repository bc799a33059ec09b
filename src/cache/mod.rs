//! Cache module - Registry-based caching using Moka.
//!
//! ## Architecture
//!
//! - `CacheRegistry` - Central registry holding all named caches, grouped by
//!   invalidation tags
//! - `CacheConfig` - Capacity and TTL/TTI settings with presets
//! - `TypedCache` - Cheap-to-clone typed wrapper over a Moka cache
//!
//! ## Usage
//!
//! ```rust,ignore
//! let admins = registry.get_or_create::<String, Option<AdminUser>>(
//!     "admin_users",
//!     CacheConfig::admin_lookup(),
//! );
//!
//! admins.insert(user_id.clone(), Some(admin));
//! let admin = admins.get(&user_id);
//! ```

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
