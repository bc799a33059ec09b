//! Populates the content table from the bundled dictionaries.

use std::collections::HashMap;
use std::slice;

use serde_json::Value;
use tracing::{info, warn};

use crate::content::Dictionary;
use crate::database::{ContentStore, ContentType, NewContentItem};
use crate::i18n::{static_dictionary, Locale};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub seeded: usize,
    pub skipped: usize,
}

/// Flatten a dictionary to `(dotted key, stored string)` pairs.
///
/// Arrays are stored as JSON text; numbers, booleans and nulls are not
/// content and are left out.
fn flatten(dictionary: &Dictionary) -> Vec<(String, String)> {
    dictionary
        .leaves()
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::String(s) => Some((key, s.clone())),
            Value::Array(_) => Some((key, value.to_string())),
            _ => None,
        })
        .collect()
}

/// Build one row per English key, Italian falling back to English.
pub fn seed_rows(en: &Dictionary, it: &Dictionary) -> Vec<NewContentItem> {
    let italian: HashMap<String, String> = flatten(it).into_iter().collect();
    let mut positions: HashMap<String, i32> = HashMap::new();

    flatten(en)
        .into_iter()
        .map(|(key, content_en)| {
            let section = key.split('.').next().unwrap_or(&key).to_string();
            let position = positions.entry(section.clone()).or_insert(0);
            let sort_order = *position;
            *position += 1;

            let content_it = italian
                .get(&key)
                .filter(|v| !v.is_empty())
                .cloned()
                .unwrap_or_else(|| content_en.clone());

            NewContentItem {
                content_type: ContentType::classify(&content_en),
                is_array: content_en.starts_with('['),
                content_key: key,
                section,
                content_en,
                content_it,
                sort_order,
            }
        })
        .collect()
}

/// Upsert every static key into the store.
///
/// Rows are written one at a time so a rejected key does not stop the run.
pub async fn seed(store: &dyn ContentStore) -> SeedReport {
    let rows = seed_rows(static_dictionary(Locale::En), static_dictionary(Locale::It));
    let mut report = SeedReport::default();

    for row in &rows {
        match store.upsert_items(slice::from_ref(row)).await {
            Ok(_) => report.seeded += 1,
            Err(e) => {
                warn!("Skipped content key '{}': {}", row.content_key, e);
                report.skipped += 1;
            }
        }
    }

    info!("Seeded {} content keys ({} skipped)", report.seeded, report.skipped);
    report
}
