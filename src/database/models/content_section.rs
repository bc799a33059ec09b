//! Content section reference data.

use serde::{Deserialize, Serialize};

/// Admin navigation metadata grouping content keys.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentSection {
    #[serde(alias = "_id")]
    pub id: String,

    /// Matches `ContentItem::section`.
    pub section_key: String,

    pub display_name_en: String,

    pub display_name_it: String,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub sort_order: i32,

    #[serde(default)]
    pub icon: Option<String>,
}
