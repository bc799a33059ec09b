//! Grouping and search for the section editor.

use serde::Serialize;

use crate::database::{ContentItem, ROOT_GROUP};

/// Rows sharing a key prefix, ordered by `sort_order`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentGroup {
    pub prefix: String,
    pub items: Vec<ContentItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ListingState {
    Populated,
    /// The section has no rows at all.
    NoItems,
    /// Rows exist but none match the query.
    NoMatches,
}

/// What the editor shows for one section.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ContentListing {
    pub groups: Vec<ContentGroup>,
    pub total: usize,
    pub shown: usize,
    pub state: ListingState,
}

/// Group rows by the part of their key before the first `.`.
///
/// Keys without a dot land in `_root`, which sorts first; other groups
/// follow alphabetically, ignoring case.
pub fn group_by_prefix(items: &[ContentItem]) -> Vec<ContentGroup> {
    let mut groups: Vec<ContentGroup> = Vec::new();

    for item in items {
        let prefix = item.group_prefix();
        match groups.iter_mut().find(|g| g.prefix == prefix) {
            Some(group) => group.items.push(item.clone()),
            None => groups.push(ContentGroup {
                prefix: prefix.to_string(),
                items: vec![item.clone()],
            }),
        }
    }

    groups.sort_by(|a, b| {
        (a.prefix != ROOT_GROUP)
            .cmp(&(b.prefix != ROOT_GROUP))
            .then_with(|| a.prefix.to_lowercase().cmp(&b.prefix.to_lowercase()))
            .then_with(|| a.prefix.cmp(&b.prefix))
    });
    for group in &mut groups {
        group.items.sort_by_key(|item| item.sort_order);
    }

    groups
}

/// Case-insensitive match on key, English or Italian value.
///
/// `needle` must already be lowercase.
fn matches(item: &ContentItem, needle: &str) -> bool {
    item.content_key.to_lowercase().contains(needle)
        || item.content_en.to_lowercase().contains(needle)
        || item.content_it.to_lowercase().contains(needle)
}

/// Keep matching rows, dropping groups left empty.
///
/// A blank query keeps everything. Otherwise the query is matched as typed,
/// surrounding spaces included.
pub fn filter_groups(groups: Vec<ContentGroup>, query: &str) -> Vec<ContentGroup> {
    if query.trim().is_empty() {
        return groups;
    }
    let needle = query.to_lowercase();

    groups
        .into_iter()
        .filter_map(|mut group| {
            group.items.retain(|item| matches(item, &needle));
            (!group.items.is_empty()).then_some(group)
        })
        .collect()
}

/// Group and filter a section's rows for display.
pub fn build_listing(items: &[ContentItem], query: Option<&str>) -> ContentListing {
    let total = items.len();
    let groups = filter_groups(group_by_prefix(items), query.unwrap_or_default());
    let shown = groups.iter().map(|g| g.items.len()).sum();

    let state = if total == 0 {
        ListingState::NoItems
    } else if shown == 0 {
        ListingState::NoMatches
    } else {
        ListingState::Populated
    };

    ContentListing {
        groups,
        total,
        shown,
        state,
    }
}
