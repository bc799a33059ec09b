//! Content editing service behind the admin dashboard.

use std::sync::Arc;
use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::draft::RowDraft;
use super::grouping::{build_listing, ContentListing};
use super::revalidate::Revalidator;
use super::tracker::SaveTracker;
use crate::content::{DictionaryCache, DICTIONARY_TAG};
use crate::database::{ContentItem, ContentSection, ContentStore, ContentUpdate};
use crate::error::{ContentError, ContentResult};

/// One row's new values as submitted by an operator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ContentEdit {
    #[serde(default)]
    pub id: String,
    pub content_en: String,
    pub content_it: String,

    /// The `updated_at` the operator loaded; enables the conflict check.
    #[serde(default)]
    pub expected_updated_at: Option<DateTime<Utc>>,
}

/// Result shape returned to the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SaveOutcome {
    pub success: bool,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Row that stopped a batch.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failed_id: Option<String>,
}

/// The row that stopped a batch save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchFailure {
    pub failed_id: String,
    /// Rows written before the failure.
    pub written: usize,
    pub error: ContentError,
}

impl SaveOutcome {
    pub fn ok() -> Self {
        Self {
            success: true,
            error: None,
            failed_id: None,
        }
    }

    pub fn failed(error: &ContentError) -> Self {
        Self {
            success: false,
            error: Some(error.to_string()),
            failed_id: None,
        }
    }
}

impl From<&BatchFailure> for SaveOutcome {
    fn from(failure: &BatchFailure) -> Self {
        Self {
            failed_id: Some(failure.failed_id.clone()),
            ..Self::failed(&failure.error)
        }
    }
}

fn validate(edit: &ContentEdit, user_id: &str) -> ContentResult<()> {
    if edit.id.trim().is_empty() {
        return Err(ContentError::Validation("missing content id".to_string()));
    }
    if user_id.trim().is_empty() {
        return Err(ContentError::Validation("missing user id".to_string()));
    }
    if edit.content_en.trim().is_empty() && edit.content_it.trim().is_empty() {
        return Err(ContentError::Validation("content cannot be empty".to_string()));
    }
    Ok(())
}

/// Lists and saves site content rows.
///
/// Every successful write invalidates the `dictionary` tag and asks the
/// frontend to revalidate the locale roots, so the next public request
/// reflects the change.
#[derive(Clone)]
pub struct ContentEditor {
    store: Arc<dyn ContentStore>,
    dictionaries: DictionaryCache,
    revalidator: Revalidator,
    tracker: SaveTracker,
}

impl ContentEditor {
    pub fn new(store: Arc<dyn ContentStore>, dictionaries: DictionaryCache, revalidator: Revalidator) -> Self {
        Self {
            store,
            dictionaries,
            revalidator,
            tracker: SaveTracker::default(),
        }
    }

    pub fn tracker(&self) -> &SaveTracker {
        &self.tracker
    }

    pub async fn sections(&self) -> ContentResult<Vec<ContentSection>> {
        self.store.fetch_sections().await
    }

    /// Grouped, optionally filtered rows of one section.
    ///
    /// # Errors
    /// `NotFound` if the section is not registered.
    pub async fn section_listing(&self, section: &str, query: Option<&str>) -> ContentResult<ContentListing> {
        let sections = self.store.fetch_sections().await?;
        if !sections.iter().any(|s| s.section_key == section) {
            return Err(ContentError::NotFound(format!("section {section}")));
        }

        let items = self.store.fetch_section(section).await?;
        Ok(build_listing(&items, query))
    }

    /// Load a stored row for editing.
    pub async fn draft(&self, id: &str) -> ContentResult<RowDraft> {
        self.store
            .fetch_item(id)
            .await?
            .map(RowDraft::new)
            .ok_or_else(|| ContentError::NotFound(format!("content item {id}")))
    }

    /// Save one row and publish the change.
    ///
    /// Returns the saved draft: the stored row and its saved status.
    pub async fn save(&self, edit: &ContentEdit, user_id: &str) -> ContentResult<RowDraft> {
        validate(edit, user_id)?;

        let mut draft = self.draft(&edit.id).await?;
        draft.apply(edit);
        self.save_draft(&mut draft, user_id).await?;
        Ok(draft)
    }

    /// Save a draft row, updating its status in place.
    ///
    /// On failure the draft keeps the operator's values.
    pub async fn save_draft(&self, draft: &mut RowDraft, user_id: &str) -> ContentResult<()> {
        draft.mark_saving();

        match self.commit(&draft.to_edit(), user_id).await {
            Ok((item, until)) => {
                self.publish();
                draft.mark_saved(item, until);
                Ok(())
            }
            Err(e) => {
                draft.mark_failed(e.to_string());
                Err(e)
            }
        }
    }

    /// Save rows in order, stopping at the first failure.
    ///
    /// Publishes once if anything was written, even when a later row fails.
    pub async fn save_batch(&self, edits: &[ContentEdit], user_id: &str) -> Result<usize, BatchFailure> {
        let mut written = 0;
        let mut failure = None;

        for edit in edits {
            match self.commit(edit, user_id).await {
                Ok(_) => written += 1,
                Err(error) => {
                    warn!("Batch save stopped at {} after {} rows: {}", edit.id, written, error);
                    failure = Some(BatchFailure {
                        failed_id: edit.id.clone(),
                        written,
                        error,
                    });
                    break;
                }
            }
        }

        if written > 0 {
            self.publish();
        }

        match failure {
            Some(failure) => Err(failure),
            None => Ok(written),
        }
    }

    /// Validate and write one row, marking it as recently saved.
    async fn commit(&self, edit: &ContentEdit, user_id: &str) -> ContentResult<(ContentItem, Instant)> {
        validate(edit, user_id)?;

        let update = ContentUpdate {
            id: edit.id.clone(),
            content_en: edit.content_en.clone(),
            content_it: edit.content_it.clone(),
            updated_by: user_id.to_string(),
            updated_at: Utc::now(),
            expected_updated_at: edit.expected_updated_at,
        };

        let item = self.store.update_item(&update).await.inspect_err(|e| {
            warn!("Failed to save content {}: {}", edit.id, e);
        })?;

        info!("Content '{}' updated by {}", item.content_key, user_id);
        let until = self.tracker.mark_saved(&item.id, Instant::now());
        Ok((item, until))
    }

    fn publish(&self) {
        self.dictionaries.invalidate(DICTIONARY_TAG);
        self.revalidator.revalidate_locales();
    }
}
