//! Site content rows.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::i18n::Locale;

/// Group name for keys without a dotted prefix.
pub const ROOT_GROUP: &str = "_root";

/// How a content value should be edited and rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    #[default]
    Text,
    Richtext,
    Html,
    Json,
}

impl ContentType {
    /// Infer a content type from a (canonical, English) value.
    ///
    /// JSON-looking values win over length/newline detection.
    pub fn classify(value: &str) -> Self {
        if value.starts_with('[') || value.starts_with('{') {
            Self::Json
        } else if value.contains('\n') || value.chars().count() > 200 {
            Self::Richtext
        } else {
            Self::Text
        }
    }
}

/// One translatable string, stored flat in the `site_content` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(alias = "_id")]
    pub id: String,

    /// Dotted path, unique (e.g. `hero.tagline1`).
    pub content_key: String,

    pub section: String,

    pub content_en: String,

    pub content_it: String,

    #[serde(default)]
    pub content_type: ContentType,

    #[serde(default)]
    pub description: Option<String>,

    /// Value holds a JSON array.
    #[serde(default)]
    pub is_array: bool,

    #[serde(default)]
    pub sort_order: i32,

    pub updated_at: DateTime<Utc>,

    /// Admin user id of the last editor.
    #[serde(default)]
    pub updated_by: Option<String>,
}

impl ContentItem {
    /// The stored value for a locale.
    pub fn value(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.content_en,
            Locale::It => &self.content_it,
        }
    }

    /// Group prefix: the part before the first `.`, or `_root`.
    pub fn group_prefix(&self) -> &str {
        match self.content_key.split_once('.') {
            Some((prefix, _)) => prefix,
            None => ROOT_GROUP,
        }
    }

    /// Last dotted segment, shown as the row label in the editor.
    pub fn display_key(&self) -> &str {
        self.content_key
            .rsplit('.')
            .next()
            .unwrap_or(&self.content_key)
    }
}

/// A single-row edit as written to the store.
#[derive(Debug, Clone)]
pub struct ContentUpdate {
    pub id: String,
    pub content_en: String,
    pub content_it: String,
    pub updated_by: String,
    pub updated_at: DateTime<Utc>,

    /// When set, the write only applies if the row still carries this stamp.
    pub expected_updated_at: Option<DateTime<Utc>>,
}

/// A row produced by the seeder, upserted by `content_key`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewContentItem {
    pub content_key: String,
    pub section: String,
    pub content_en: String,
    pub content_it: String,
    pub content_type: ContentType,
    pub is_array: bool,
    pub sort_order: i32,
}
