//! Supabase (PostgREST) content backend.
//!
//! Talks to `{SUPABASE_URL}/rest/v1/` with the service-role key, so row-level
//! security is enforced by the key's role rather than by this service.

use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};
use url::Url;

use super::{AdminUser, ContentItem, ContentSection, ContentStore, ContentUpdate, NewContentItem};
use crate::error::{ContentError, ContentResult};

const CONTENT_TABLE: &str = "site_content";
const SECTIONS_TABLE: &str = "content_sections";
const ADMINS_TABLE: &str = "admin_users";

/// PostgREST error body.
#[derive(Debug, Deserialize)]
struct ApiError {
    message: String,
}

#[derive(Debug, Serialize)]
struct ContentPatch<'a> {
    content_en: &'a str,
    content_it: &'a str,
    updated_by: &'a str,
    updated_at: String,
}

pub struct SupabaseContentStore {
    client: reqwest::Client,
    rest_url: Url,
    api_key: String,
}

impl SupabaseContentStore {
    /// Create a client for the project at `project_url`.
    ///
    /// # Errors
    /// Returns error if the URL cannot be used as a REST base.
    pub fn new(project_url: &str, api_key: impl Into<String>) -> anyhow::Result<Self> {
        let mut base = Url::parse(project_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }
        let rest_url = base.join("rest/v1/")?;

        Ok(Self {
            client: reqwest::Client::new(),
            rest_url,
            api_key: api_key.into(),
        })
    }

    fn request(&self, method: Method, table: &str) -> ContentResult<RequestBuilder> {
        let url = self
            .rest_url
            .join(table)
            .map_err(|e| ContentError::DataSourceUnavailable(e.to_string()))?;

        Ok(self
            .client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key))
    }

    async fn select<T: DeserializeOwned>(&self, table: &str, query: &[(&str, String)]) -> ContentResult<Vec<T>> {
        let response = self
            .request(Method::GET, table)?
            .query(query)
            .send()
            .await
            .map_err(|e| ContentError::DataSourceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let message = error_message(response).await;
            return Err(ContentError::DataSourceUnavailable(format!("{table} ({status}): {message}")));
        }

        response
            .json()
            .await
            .map_err(|e| ContentError::DataSourceUnavailable(format!("invalid {table} payload: {e}")))
    }
}

fn stamp(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

/// Extract PostgREST's `message`, falling back to the raw body.
async fn error_message(response: Response) -> String {
    let body = response.text().await.unwrap_or_default();
    serde_json::from_str::<ApiError>(&body)
        .map(|e| e.message)
        .unwrap_or(body)
}

/// Classify a failed write response.
async fn write_error(response: Response) -> ContentError {
    let status = response.status();
    let message = error_message(response).await;

    if status.is_server_error() || status == StatusCode::UNAUTHORIZED {
        ContentError::DataSourceUnavailable(format!("{status}: {message}"))
    } else {
        ContentError::Persistence(message)
    }
}

#[async_trait]
impl ContentStore for SupabaseContentStore {
    async fn fetch_all(&self) -> ContentResult<Vec<ContentItem>> {
        let items: Vec<ContentItem> = self
            .select(
                CONTENT_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("order", "section.asc,sort_order.asc".to_string()),
                ],
            )
            .await?;
        debug!("Fetched {} content rows from Supabase", items.len());
        Ok(items)
    }

    async fn fetch_section(&self, section: &str) -> ContentResult<Vec<ContentItem>> {
        self.select(
            CONTENT_TABLE,
            &[
                ("select", "*".to_string()),
                ("section", format!("eq.{section}")),
                ("order", "sort_order.asc".to_string()),
            ],
        )
        .await
    }

    async fn fetch_item(&self, id: &str) -> ContentResult<Option<ContentItem>> {
        let mut rows: Vec<ContentItem> = self
            .select(CONTENT_TABLE, &[("select", "*".to_string()), ("id", format!("eq.{id}"))])
            .await?;
        Ok(rows.pop())
    }

    async fn fetch_sections(&self) -> ContentResult<Vec<ContentSection>> {
        self.select(
            SECTIONS_TABLE,
            &[("select", "*".to_string()), ("order", "sort_order.asc".to_string())],
        )
        .await
    }

    async fn update_item(&self, update: &ContentUpdate) -> ContentResult<ContentItem> {
        let mut query = vec![("id", format!("eq.{}", update.id))];
        if let Some(expected) = &update.expected_updated_at {
            query.push(("updated_at", format!("eq.{}", stamp(expected))));
        }

        let patch = ContentPatch {
            content_en: &update.content_en,
            content_it: &update.content_it,
            updated_by: &update.updated_by,
            updated_at: stamp(&update.updated_at),
        };

        let response = self
            .request(Method::PATCH, CONTENT_TABLE)?
            .query(&query)
            .header("Prefer", "return=representation")
            .json(&patch)
            .send()
            .await
            .map_err(|e| ContentError::DataSourceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(write_error(response).await);
        }

        let mut rows: Vec<ContentItem> = response
            .json()
            .await
            .map_err(|e| ContentError::Persistence(format!("invalid update response: {e}")))?;

        if let Some(row) = rows.pop() {
            return Ok(row);
        }

        // Nothing matched: the row is gone, or its stamp moved on.
        if update.expected_updated_at.is_some() && self.fetch_item(&update.id).await?.is_some() {
            return Err(ContentError::WriteConflict(update.id.clone()));
        }

        Err(ContentError::NotFound(format!("content item {}", update.id)))
    }

    async fn upsert_items(&self, items: &[NewContentItem]) -> ContentResult<usize> {
        if items.is_empty() {
            return Ok(0);
        }

        let response = self
            .request(Method::POST, CONTENT_TABLE)?
            .query(&[("on_conflict", "content_key")])
            .header("Prefer", "resolution=merge-duplicates,return=minimal")
            .json(items)
            .send()
            .await
            .map_err(|e| ContentError::DataSourceUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            let error = write_error(response).await;
            warn!("Content upsert failed: {}", error);
            return Err(error);
        }

        Ok(items.len())
    }

    async fn find_admin(&self, user_id: &str) -> ContentResult<Option<AdminUser>> {
        let mut admins: Vec<AdminUser> = self
            .select(
                ADMINS_TABLE,
                &[
                    ("select", "*".to_string()),
                    ("id", format!("eq.{user_id}")),
                    ("is_active", "eq.true".to_string()),
                ],
            )
            .await?;
        Ok(admins.pop())
    }
}
