//! Admin checker with caching.

use std::sync::Arc;

use tracing::debug;

use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::database::{AdminUser, ContentStore};
use crate::error::{ContentError, ContentResult};

/// Resolves dashboard users to admin records.
///
/// Owners (from `ADMIN_OWNER_IDS`) bypass the lookup and act as super
/// admins. Everyone else is looked up in `admin_users`; the answer,
/// including "not an admin", is cached for a few minutes.
#[derive(Clone)]
pub struct AdminGuard {
    store: Arc<dyn ContentStore>,
    cache: TypedCache<String, Option<AdminUser>>,
    owner_ids: Vec<String>,
}

impl AdminGuard {
    pub fn new(store: Arc<dyn ContentStore>, registry: &CacheRegistry, owner_ids: Vec<String>) -> Self {
        let cache = registry.get_or_create("admin_users", CacheConfig::admin_lookup());
        Self {
            store,
            cache,
            owner_ids,
        }
    }

    #[inline]
    pub fn is_owner(&self, user_id: &str) -> bool {
        self.owner_ids.iter().any(|id| id == user_id)
    }

    /// Look up the admin record for a user.
    ///
    /// Returns `None` if the user is not an active admin.
    pub async fn get_admin(&self, user_id: &str) -> ContentResult<Option<AdminUser>> {
        if self.is_owner(user_id) {
            debug!("User {} is an owner, granting admin", user_id);
            return Ok(Some(AdminUser::owner(user_id)));
        }

        let key = user_id.to_string();
        if let Some(cached) = self.cache.get(&key) {
            debug!("Admin cache hit for user {}", user_id);
            return Ok(cached);
        }

        debug!("Admin cache miss for user {}", user_id);

        let admin = self
            .store
            .find_admin(user_id)
            .await?
            .filter(AdminUser::can_edit_content);

        // Errors are not cached; a negative answer is.
        self.cache.insert(key, admin.clone());
        Ok(admin)
    }

    /// Require an admin allowed to edit content.
    ///
    /// # Errors
    /// `Unauthorized` for unknown, inactive or missing users.
    pub async fn require_editor(&self, user_id: Option<&str>) -> ContentResult<AdminUser> {
        let user_id = user_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or_else(|| ContentError::Unauthorized("missing admin identity".to_string()))?;

        self.get_admin(user_id)
            .await?
            .ok_or_else(|| ContentError::Unauthorized(format!("user {user_id} is not an admin")))
    }

    /// Forget the cached answer for a user.
    ///
    /// Call this when admin status might have changed.
    pub fn invalidate(&self, user_id: &str) {
        self.cache.invalidate(&user_id.to_string());
        debug!("Invalidated admin cache for user {}", user_id);
    }
}
