//! Editable row state for the section editor.

use std::time::Instant;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::editor::ContentEdit;
use crate::database::ContentItem;

/// Values longer than this are edited in a multi-line field.
const LONG_CONTENT_CHARS: usize = 100;

/// Whether either value needs a multi-line editor.
pub fn is_long_content(content_en: &str, content_it: &str) -> bool {
    [content_en, content_it]
        .iter()
        .any(|v| v.chars().count() > LONG_CONTENT_CHARS || v.contains('\n'))
}

/// Save state of a single row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RowStatus {
    Neutral,
    Saving,
    /// Saved; shown as such until the instant passes.
    SavedUntil(Instant),
    Failed(String),
}

/// Status label as reported over the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLabel {
    Neutral,
    Saving,
    Saved,
    Failed,
}

impl RowStatus {
    /// The status as seen at `now`; an elapsed saved marker reads neutral.
    pub fn at(&self, now: Instant) -> StatusLabel {
        match self {
            Self::Neutral => StatusLabel::Neutral,
            Self::Saving => StatusLabel::Saving,
            Self::SavedUntil(until) if now < *until => StatusLabel::Saved,
            Self::SavedUntil(_) => StatusLabel::Neutral,
            Self::Failed(_) => StatusLabel::Failed,
        }
    }
}

/// A row being edited: the stored values plus the operator's draft.
///
/// Saves are last-writer-wins unless [`RowDraft::apply`] receives the
/// version the operator loaded.
#[derive(Debug, Clone)]
pub struct RowDraft {
    original: ContentItem,
    pub draft_en: String,
    pub draft_it: String,
    expected_updated_at: Option<DateTime<Utc>>,
    status: RowStatus,
}

impl RowDraft {
    pub fn new(item: ContentItem) -> Self {
        Self {
            draft_en: item.content_en.clone(),
            draft_it: item.content_it.clone(),
            original: item,
            expected_updated_at: None,
            status: RowStatus::Neutral,
        }
    }

    /// Take the submitted values, and the submitted version if any.
    pub fn apply(&mut self, edit: &ContentEdit) {
        self.draft_en = edit.content_en.clone();
        self.draft_it = edit.content_it.clone();
        self.expected_updated_at = edit.expected_updated_at;
    }

    pub fn original(&self) -> &ContentItem {
        &self.original
    }

    pub fn status(&self) -> &RowStatus {
        &self.status
    }

    pub fn has_changes(&self) -> bool {
        self.draft_en != self.original.content_en || self.draft_it != self.original.content_it
    }

    pub fn is_long_content(&self) -> bool {
        is_long_content(&self.draft_en, &self.draft_it)
    }

    pub fn display_key(&self) -> &str {
        self.original.display_key()
    }

    pub fn to_edit(&self) -> ContentEdit {
        ContentEdit {
            id: self.original.id.clone(),
            content_en: self.draft_en.clone(),
            content_it: self.draft_it.clone(),
            expected_updated_at: self.expected_updated_at,
        }
    }

    pub(crate) fn mark_saving(&mut self) {
        self.status = RowStatus::Saving;
    }

    /// The save went through; the stored row becomes the new original.
    pub(crate) fn mark_saved(&mut self, saved: ContentItem, until: Instant) {
        self.draft_en = saved.content_en.clone();
        self.draft_it = saved.content_it.clone();
        self.original = saved;
        self.expected_updated_at = None;
        self.status = RowStatus::SavedUntil(until);
    }

    /// The save failed; the draft stays as typed.
    pub(crate) fn mark_failed(&mut self, message: impl Into<String>) {
        self.status = RowStatus::Failed(message.into());
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use chrono::Utc;

    use super::*;
    use crate::database::ContentType;

    fn item() -> ContentItem {
        ContentItem {
            id: "row-1".to_string(),
            content_key: "values.vision.title".to_string(),
            section: "home".to_string(),
            content_en: "Vision".to_string(),
            content_it: "Visione".to_string(),
            content_type: ContentType::Text,
            description: None,
            is_array: false,
            sort_order: 1,
            updated_at: Utc::now(),
            updated_by: None,
        }
    }

    #[test]
    fn test_has_changes_tracks_draft() {
        let mut draft = RowDraft::new(item());
        assert!(!draft.has_changes());

        draft.draft_it = "Visione!".to_string();
        assert!(draft.has_changes());

        draft.draft_it = "Visione".to_string();
        assert!(!draft.has_changes());
    }

    #[test]
    fn test_long_content_detection() {
        assert!(!is_long_content("short", "breve"));
        assert!(is_long_content(&"x".repeat(101), ""));
        assert!(is_long_content("", "due\nrighe"));
        assert!(!is_long_content(&"x".repeat(100), ""));
    }

    #[test]
    fn test_display_key() {
        assert_eq!(RowDraft::new(item()).display_key(), "title");
    }

    #[test]
    fn test_saved_status_reads_neutral_after_deadline() {
        let now = Instant::now();
        let status = RowStatus::SavedUntil(now + Duration::from_secs(2));

        assert_eq!(status.at(now), StatusLabel::Saved);
        assert_eq!(status.at(now + Duration::from_secs(3)), StatusLabel::Neutral);
    }

    #[test]
    fn test_failed_save_keeps_draft() {
        let mut draft = RowDraft::new(item());
        draft.draft_en = "New vision".to_string();

        draft.mark_saving();
        assert_eq!(draft.status(), &RowStatus::Saving);

        draft.mark_failed("boom");
        assert_eq!(draft.status(), &RowStatus::Failed("boom".to_string()));
        assert_eq!(draft.draft_en, "New vision");
        assert!(draft.has_changes());
    }

    #[test]
    fn test_to_edit_is_last_writer_wins_by_default() {
        let edit = RowDraft::new(item()).to_edit();

        assert_eq!(edit.id, "row-1");
        assert_eq!(edit.expected_updated_at, None);
    }

    #[test]
    fn test_apply_takes_submitted_values_and_version() {
        let mut draft = RowDraft::new(item());
        let stamp = Utc::now();

        draft.apply(&ContentEdit {
            id: "ignored".to_string(),
            content_en: "New".to_string(),
            content_it: "Nuovo".to_string(),
            expected_updated_at: Some(stamp),
        });

        let edit = draft.to_edit();
        assert_eq!(edit.id, "row-1");
        assert_eq!(edit.content_it, "Nuovo");
        assert_eq!(edit.expected_updated_at, Some(stamp));
        assert!(draft.has_changes());

        draft.mark_saved(item(), Instant::now());
        assert_eq!(draft.to_edit().expected_updated_at, None);
    }
}
