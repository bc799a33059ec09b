//! Admin dashboard users.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdminRole {
    SuperAdmin,
    Admin,
    Editor,
}

/// A row of the `admin_users` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminUser {
    /// Auth provider user id.
    #[serde(alias = "_id")]
    pub id: String,

    pub email: String,

    pub display_name: String,

    pub role: AdminRole,

    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub last_login: Option<DateTime<Utc>>,
}

impl AdminUser {
    /// Synthetic record for a configured owner id.
    pub fn owner(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            email: String::new(),
            display_name: format!("owner:{id}"),
            id,
            role: AdminRole::SuperAdmin,
            is_active: true,
            last_login: None,
        }
    }

    /// Every active role may edit site content.
    pub fn can_edit_content(&self) -> bool {
        self.is_active
    }
}
