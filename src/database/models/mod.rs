//! Database model exports.

pub mod admin_user;
pub mod content_item;
pub mod content_section;

pub use admin_user::{AdminRole, AdminUser};
pub use content_item::{ContentItem, ContentType, ContentUpdate, NewContentItem, ROOT_GROUP};
pub use content_section::ContentSection;
