//! Request handlers.

use std::time::Instant;

use axum::extract::{Path, Query, State};
use axum::http::header::{ACCEPT_LANGUAGE, CONTENT_LANGUAGE};
use axum::http::{HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use super::error::{status_for, ApiError};
use super::AppState;
use crate::admin::{
    is_long_content, ContentEdit, ContentListing, ListingState, RowDraft, SaveOutcome, SaveTracker, StatusLabel,
};
use crate::database::{ContentItem, ContentSection};
use crate::i18n::Locale;

/// Header carrying the authenticated dashboard user, set by the auth gateway.
pub const ADMIN_USER_HEADER: &str = "x-admin-user";

/// Reports whether the dictionary came from cache, database or static files.
pub const CONTENT_SOURCE_HEADER: &str = "x-content-source";

fn admin_identity(headers: &HeaderMap) -> Option<&str> {
    headers.get(ADMIN_USER_HEADER).and_then(|v| v.to_str().ok())
}

pub async fn health() -> &'static str {
    "ok"
}

pub async fn dictionary(State(state): State<AppState>, headers: HeaderMap) -> Response {
    let accept = headers.get(ACCEPT_LANGUAGE).and_then(|v| v.to_str().ok());
    respond_with_dictionary(&state, Locale::negotiate(accept)).await
}

pub async fn dictionary_for_locale(State(state): State<AppState>, Path(locale): Path<String>) -> Response {
    respond_with_dictionary(&state, Locale::resolve(&locale)).await
}

async fn respond_with_dictionary(state: &AppState, locale: Locale) -> Response {
    let resolved = state.dictionaries.resolve(locale).await;

    let mut response = Json(resolved.dictionary.as_ref()).into_response();
    let headers = response.headers_mut();
    headers.insert(CONTENT_LANGUAGE, HeaderValue::from_static(locale.hreflang()));
    headers.insert(CONTENT_SOURCE_HEADER, HeaderValue::from_static(resolved.source.as_str()));
    response
}

pub async fn sections(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Vec<ContentSection>>, ApiError> {
    state.guard.require_editor(admin_identity(&headers)).await?;
    Ok(Json(state.editor.sections().await?))
}

#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// A content row as shown in the editor.
#[derive(Debug, Serialize)]
pub struct RowView {
    #[serde(flatten)]
    pub item: ContentItem,
    pub display_key: String,
    pub is_long_content: bool,
    pub status: StatusLabel,
}

impl RowView {
    fn from_draft(draft: &RowDraft, now: Instant) -> Self {
        Self {
            item: draft.original().clone(),
            display_key: draft.display_key().to_string(),
            is_long_content: draft.is_long_content(),
            status: draft.status().at(now),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct GroupView {
    pub prefix: String,
    pub items: Vec<RowView>,
}

#[derive(Debug, Serialize)]
pub struct SectionView {
    pub section: String,
    pub total: usize,
    pub shown: usize,
    pub state: ListingState,
    pub groups: Vec<GroupView>,
}

impl SectionView {
    fn new(section: String, listing: ContentListing, tracker: &SaveTracker, now: Instant) -> Self {
        let groups = listing
            .groups
            .into_iter()
            .map(|group| GroupView {
                prefix: group.prefix,
                items: group
                    .items
                    .into_iter()
                    .map(|item| RowView {
                        display_key: item.display_key().to_string(),
                        is_long_content: is_long_content(&item.content_en, &item.content_it),
                        status: tracker.status(&item.id, now),
                        item,
                    })
                    .collect(),
            })
            .collect();

        Self {
            section,
            total: listing.total,
            shown: listing.shown,
            state: listing.state,
            groups,
        }
    }
}

pub async fn section_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(section): Path<String>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<SectionView>, ApiError> {
    state.guard.require_editor(admin_identity(&headers)).await?;

    let listing = state.editor.section_listing(&section, query.q.as_deref()).await?;
    Ok(Json(SectionView::new(section, listing, state.editor.tracker(), Instant::now())))
}

/// A successful single-row save, echoing the stored row.
#[derive(Debug, Serialize)]
pub struct SavedRow {
    #[serde(flatten)]
    pub outcome: SaveOutcome,
    pub row: RowView,
}

pub async fn save_content(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut edit): Json<ContentEdit>,
) -> Result<Json<SavedRow>, ApiError> {
    let admin = state.guard.require_editor(admin_identity(&headers)).await?;

    edit.id = id;
    let draft = state.editor.save(&edit, &admin.id).await?;
    Ok(Json(SavedRow {
        outcome: SaveOutcome::ok(),
        row: RowView::from_draft(&draft, Instant::now()),
    }))
}

#[derive(Debug, Deserialize)]
pub struct BatchRequest {
    pub updates: Vec<ContentEdit>,
}

pub async fn save_batch(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<BatchRequest>,
) -> Result<(StatusCode, Json<SaveOutcome>), ApiError> {
    let admin = state.guard.require_editor(admin_identity(&headers)).await?;

    match state.editor.save_batch(&request.updates, &admin.id).await {
        Ok(_) => Ok((StatusCode::OK, Json(SaveOutcome::ok()))),
        Err(failure) => Ok((status_for(&failure.error), Json(SaveOutcome::from(&failure)))),
    }
}
