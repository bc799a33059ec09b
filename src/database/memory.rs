//! In-memory content store for tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use parking_lot::Mutex;
use tokio::sync::Notify;

use super::{AdminUser, ContentItem, ContentSection, ContentStore, ContentUpdate, NewContentItem};
use crate::error::{ContentError, ContentResult};

#[derive(Default)]
pub struct MemoryContentStore {
    items: Mutex<Vec<ContentItem>>,
    sections: Mutex<Vec<ContentSection>>,
    admins: Mutex<Vec<AdminUser>>,
    unavailable: AtomicBool,
    reject_writes: AtomicBool,
    fetch_all_calls: AtomicUsize,
    find_admin_calls: AtomicUsize,
    fetch_gate: Mutex<Option<Arc<Notify>>>,
}

impl MemoryContentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(items: Vec<ContentItem>) -> Self {
        let store = Self::new();
        *store.items.lock() = items;
        store
    }

    pub fn add_section(&self, section: ContentSection) {
        self.sections.lock().push(section);
    }

    pub fn add_admin(&self, admin: AdminUser) {
        self.admins.lock().push(admin);
    }

    /// Simulate an outage: every call fails as unavailable.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Simulate the database rejecting writes (e.g. a constraint violation).
    pub fn set_reject_writes(&self, reject: bool) {
        self.reject_writes.store(reject, Ordering::SeqCst);
    }

    /// Hold every `fetch_all` after it has read the rows until `gate` is
    /// notified. `None` lets fetches through.
    pub fn set_fetch_gate(&self, gate: Option<Arc<Notify>>) {
        *self.fetch_gate.lock() = gate;
    }

    pub fn fetch_all_calls(&self) -> usize {
        self.fetch_all_calls.load(Ordering::SeqCst)
    }

    pub fn find_admin_calls(&self) -> usize {
        self.find_admin_calls.load(Ordering::SeqCst)
    }

    pub fn item(&self, id: &str) -> Option<ContentItem> {
        self.items.lock().iter().find(|i| i.id == id).cloned()
    }

    fn check_available(&self) -> ContentResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(ContentError::DataSourceUnavailable("connection refused".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn fetch_all(&self) -> ContentResult<Vec<ContentItem>> {
        self.fetch_all_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut items = self.items.lock().clone();
        items.sort_by(|a, b| a.section.cmp(&b.section).then(a.sort_order.cmp(&b.sort_order)));

        let gate = self.fetch_gate.lock().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        Ok(items)
    }

    async fn fetch_section(&self, section: &str) -> ContentResult<Vec<ContentItem>> {
        self.check_available()?;
        let mut items: Vec<ContentItem> = self
            .items
            .lock()
            .iter()
            .filter(|i| i.section == section)
            .cloned()
            .collect();
        items.sort_by_key(|i| i.sort_order);
        Ok(items)
    }

    async fn fetch_item(&self, id: &str) -> ContentResult<Option<ContentItem>> {
        self.check_available()?;
        Ok(self.item(id))
    }

    async fn fetch_sections(&self) -> ContentResult<Vec<ContentSection>> {
        self.check_available()?;
        let mut sections = self.sections.lock().clone();
        sections.sort_by_key(|s| s.sort_order);
        Ok(sections)
    }

    async fn update_item(&self, update: &ContentUpdate) -> ContentResult<ContentItem> {
        self.check_available()?;
        if self.reject_writes.load(Ordering::SeqCst) {
            return Err(ContentError::Persistence("violates check constraint".to_string()));
        }

        let mut items = self.items.lock();
        let item = items
            .iter_mut()
            .find(|i| i.id == update.id)
            .ok_or_else(|| ContentError::NotFound(format!("content item {}", update.id)))?;

        if let Some(expected) = update.expected_updated_at
            && item.updated_at != expected
        {
            return Err(ContentError::WriteConflict(item.content_key.clone()));
        }

        item.content_en = update.content_en.clone();
        item.content_it = update.content_it.clone();
        item.updated_by = Some(update.updated_by.clone());
        item.updated_at = update.updated_at;
        Ok(item.clone())
    }

    async fn upsert_items(&self, new_items: &[NewContentItem]) -> ContentResult<usize> {
        self.check_available()?;
        let mut items = self.items.lock();
        for new in new_items {
            let now = Utc::now();
            match items.iter_mut().find(|i| i.content_key == new.content_key) {
                Some(existing) => {
                    existing.section = new.section.clone();
                    existing.content_en = new.content_en.clone();
                    existing.content_it = new.content_it.clone();
                    existing.content_type = new.content_type;
                    existing.is_array = new.is_array;
                    existing.sort_order = new.sort_order;
                    existing.updated_at = now;
                }
                None => {
                    let id = format!("mem-{}", items.len() + 1);
                    items.push(ContentItem {
                        id,
                        content_key: new.content_key.clone(),
                        section: new.section.clone(),
                        content_en: new.content_en.clone(),
                        content_it: new.content_it.clone(),
                        content_type: new.content_type,
                        description: None,
                        is_array: new.is_array,
                        sort_order: new.sort_order,
                        updated_at: now,
                        updated_by: None,
                    });
                }
            }
        }
        Ok(new_items.len())
    }

    async fn find_admin(&self, user_id: &str) -> ContentResult<Option<AdminUser>> {
        self.find_admin_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        Ok(self
            .admins
            .lock()
            .iter()
            .find(|a| a.id == user_id && a.is_active)
            .cloned())
    }
}
