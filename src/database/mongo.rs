//! MongoDB content backend.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Document};
use mongodb::error::{Error as MongoError, ErrorKind};
use mongodb::options::{ClientOptions, ReturnDocument};
use mongodb::{Client, Collection};
use tracing::{debug, info};

use super::{AdminUser, ContentItem, ContentSection, ContentStore, ContentUpdate, NewContentItem};
use crate::error::{ContentError, ContentResult};

const CONTENT_COLLECTION: &str = "site_content";
const SECTIONS_COLLECTION: &str = "content_sections";
const ADMINS_COLLECTION: &str = "admin_users";

/// Database wrapper for MongoDB operations.
#[derive(Debug, Clone)]
pub struct Database {
    db: mongodb::Database,
}

impl Database {
    /// Connect to MongoDB with the given URI and database name.
    ///
    /// # Errors
    /// Returns error if connection fails.
    pub async fn connect(uri: &str, db_name: &str) -> anyhow::Result<Self> {
        let options = ClientOptions::parse(uri).await?;
        let client = Client::with_options(options)?;

        // Ping the database to verify connection
        client
            .database("admin")
            .run_command(doc! { "ping": 1 })
            .await?;

        info!("Successfully connected to MongoDB");

        Ok(Self {
            db: client.database(db_name),
        })
    }

    /// Get a typed collection from the database.
    pub fn collection<T: Send + Sync>(&self, name: &str) -> Collection<T> {
        self.db.collection(name)
    }
}

/// Content store over the `site_content`, `content_sections` and
/// `admin_users` collections.
///
/// Documents use string `_id`s and RFC 3339 `updated_at` strings so rows
/// look the same as the hosted Postgres table.
pub struct MongoContentStore {
    content: Collection<ContentItem>,
    sections: Collection<ContentSection>,
    admins: Collection<AdminUser>,
}

impl MongoContentStore {
    pub fn new(db: &Database) -> Self {
        Self {
            content: db.collection(CONTENT_COLLECTION),
            sections: db.collection(SECTIONS_COLLECTION),
            admins: db.collection(ADMINS_COLLECTION),
        }
    }
}

/// Timestamp format shared by writes and optimistic filters.
fn stamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn read_error(e: MongoError) -> ContentError {
    ContentError::DataSourceUnavailable(e.to_string())
}

fn write_error(e: MongoError) -> ContentError {
    match *e.kind {
        ErrorKind::Write(_) | ErrorKind::Command(_) | ErrorKind::InvalidArgument { .. } => {
            ContentError::Persistence(e.to_string())
        }
        _ => ContentError::DataSourceUnavailable(e.to_string()),
    }
}

fn update_filter(update: &ContentUpdate) -> Document {
    let mut filter = doc! { "_id": update.id.as_str() };
    if let Some(expected) = &update.expected_updated_at {
        filter.insert("updated_at", stamp(expected));
    }
    filter
}

#[async_trait]
impl ContentStore for MongoContentStore {
    async fn fetch_all(&self) -> ContentResult<Vec<ContentItem>> {
        let cursor = self
            .content
            .find(doc! {})
            .sort(doc! { "section": 1, "sort_order": 1 })
            .await
            .map_err(read_error)?;

        let items: Vec<ContentItem> = cursor.try_collect().await.map_err(read_error)?;
        debug!("Fetched {} content rows from MongoDB", items.len());
        Ok(items)
    }

    async fn fetch_section(&self, section: &str) -> ContentResult<Vec<ContentItem>> {
        let cursor = self
            .content
            .find(doc! { "section": section })
            .sort(doc! { "sort_order": 1 })
            .await
            .map_err(read_error)?;

        cursor.try_collect().await.map_err(read_error)
    }

    async fn fetch_item(&self, id: &str) -> ContentResult<Option<ContentItem>> {
        self.content.find_one(doc! { "_id": id }).await.map_err(read_error)
    }

    async fn fetch_sections(&self) -> ContentResult<Vec<ContentSection>> {
        let cursor = self
            .sections
            .find(doc! {})
            .sort(doc! { "sort_order": 1 })
            .await
            .map_err(read_error)?;

        cursor.try_collect().await.map_err(read_error)
    }

    async fn update_item(&self, update: &ContentUpdate) -> ContentResult<ContentItem> {
        let changes = doc! {
            "$set": {
                "content_en": update.content_en.as_str(),
                "content_it": update.content_it.as_str(),
                "updated_by": update.updated_by.as_str(),
                "updated_at": stamp(&update.updated_at),
            }
        };

        let updated = self
            .content
            .find_one_and_update(update_filter(update), changes)
            .return_document(ReturnDocument::After)
            .await
            .map_err(write_error)?;

        if let Some(item) = updated {
            debug!("Updated content item {}", item.content_key);
            return Ok(item);
        }

        // Nothing matched: either the row is gone or its stamp moved on.
        let exists = self
            .content
            .count_documents(doc! { "_id": update.id.as_str() })
            .await
            .map_err(read_error)?
            > 0;

        if exists && update.expected_updated_at.is_some() {
            Err(ContentError::WriteConflict(update.id.clone()))
        } else {
            Err(ContentError::NotFound(format!("content item {}", update.id)))
        }
    }

    async fn upsert_items(&self, items: &[NewContentItem]) -> ContentResult<usize> {
        let now = stamp(&Utc::now());
        let mut written = 0;

        for item in items {
            let content_type = mongodb::bson::to_bson(&item.content_type)
                .map_err(|e| ContentError::Persistence(e.to_string()))?;
            let changes = doc! {
                "$set": {
                    "section": item.section.as_str(),
                    "content_en": item.content_en.as_str(),
                    "content_it": item.content_it.as_str(),
                    "content_type": content_type,
                    "is_array": item.is_array,
                    "sort_order": item.sort_order,
                    "updated_at": now.as_str(),
                },
                "$setOnInsert": { "_id": ObjectId::new().to_hex() },
            };

            self.content
                .update_one(doc! { "content_key": item.content_key.as_str() }, changes)
                .upsert(true)
                .await
                .map_err(write_error)?;
            written += 1;
        }

        Ok(written)
    }

    async fn find_admin(&self, user_id: &str) -> ContentResult<Option<AdminUser>> {
        self.admins
            .find_one(doc! { "_id": user_id, "is_active": true })
            .await
            .map_err(read_error)
    }
}
