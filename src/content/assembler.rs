//! Builds locale dictionaries from the content table.

use std::sync::Arc;

use tracing::debug;

use super::dictionary::{merge, Dictionary};
use crate::database::ContentStore;
use crate::error::{ContentError, ContentResult};
use crate::i18n::{static_dictionary, Locale};

/// Turns flat content rows into a fully populated dictionary.
///
/// Every key of the static dictionary is present in the result: rows
/// overlay it, missing or blank rows fall back to the static value.
#[derive(Clone)]
pub struct DictionaryAssembler {
    store: Arc<dyn ContentStore>,
}

impl DictionaryAssembler {
    pub fn new(store: Arc<dyn ContentStore>) -> Self {
        Self { store }
    }

    /// Fetch every row and assemble the dictionary for `locale`.
    ///
    /// # Errors
    /// `DataSourceUnavailable` if the query fails or the table is empty.
    pub async fn assemble(&self, locale: Locale) -> ContentResult<Dictionary> {
        let rows = self.store.fetch_all().await.map_err(|e| match e {
            ContentError::DataSourceUnavailable(_) => e,
            other => ContentError::DataSourceUnavailable(other.to_string()),
        })?;

        if rows.is_empty() {
            return Err(ContentError::DataSourceUnavailable("no content rows found".to_string()));
        }

        debug!("Assembling '{}' dictionary from {} rows", locale, rows.len());

        let dynamic = Dictionary::from_rows(&rows, locale);
        Ok(merge(static_dictionary(locale), &dynamic))
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::database::memory::MemoryContentStore;
    use crate::database::{ContentItem, ContentType};

    fn row(key: &str, en: &str, it: &str) -> ContentItem {
        ContentItem {
            id: key.to_string(),
            content_key: key.to_string(),
            section: "home".to_string(),
            content_en: en.to_string(),
            content_it: it.to_string(),
            content_type: ContentType::Text,
            description: None,
            is_array: false,
            sort_order: 0,
            updated_at: Utc::now(),
            updated_by: None,
        }
    }

    #[tokio::test]
    async fn test_assemble_overlays_rows_on_static() {
        let store = Arc::new(MemoryContentStore::with_items(vec![row("hero.description", "From DB", "Dal DB")]));
        let assembler = DictionaryAssembler::new(store);

        let en = assembler.assemble(Locale::En).await.expect("assembled");
        assert_eq!(en.get_str("hero.description"), Some("From DB"));
        // Absent from the table, filled from the static dictionary.
        assert_eq!(en.get_str("nav.contact"), Some("Contact"));
        assert!(en.missing_leaves(static_dictionary(Locale::En)).is_empty());

        let it = assembler.assemble(Locale::It).await.expect("assembled");
        assert_eq!(it.get_str("hero.description"), Some("Dal DB"));
        assert_eq!(it.get_str("nav.contact"), Some("Contatti"));
    }

    #[tokio::test]
    async fn test_assemble_fails_when_store_unavailable() {
        let store = Arc::new(MemoryContentStore::with_items(vec![row("hero.cta", "a", "b")]));
        store.set_unavailable(true);

        let err = DictionaryAssembler::new(store).assemble(Locale::En).await.unwrap_err();
        assert!(err.is_unavailable());
    }

    #[tokio::test]
    async fn test_assemble_fails_on_empty_table() {
        let store = Arc::new(MemoryContentStore::new());
        let err = DictionaryAssembler::new(store).assemble(Locale::It).await.unwrap_err();
        assert!(err.is_unavailable());
    }
}
