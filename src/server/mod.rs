//! HTTP server - public dictionaries and the admin content API.

mod error;
mod handlers;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::admin::{ContentEditor, Revalidator};
use crate::cache::CacheRegistry;
use crate::content::{DictionaryAssembler, DictionaryCache};
use crate::database::ContentStore;
use crate::permissions::AdminGuard;

pub use error::{status_for, ApiError};
pub use handlers::{ADMIN_USER_HEADER, CONTENT_SOURCE_HEADER};

/// Shared services handed to every handler.
#[derive(Clone)]
pub struct AppState {
    pub dictionaries: DictionaryCache,
    pub editor: ContentEditor,
    pub guard: AdminGuard,
}

impl AppState {
    /// Wire the services over one store and cache registry.
    pub fn new(
        store: Arc<dyn ContentStore>,
        registry: &CacheRegistry,
        dictionary_ttl: Duration,
        owner_ids: Vec<String>,
        revalidator: Revalidator,
    ) -> Self {
        let dictionaries = DictionaryCache::new(DictionaryAssembler::new(store.clone()), registry, dictionary_ttl);
        let editor = ContentEditor::new(store.clone(), dictionaries.clone(), revalidator);
        let guard = AdminGuard::new(store, registry, owner_ids);

        Self {
            dictionaries,
            editor,
            guard,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handlers::health))
        .route("/api/dictionary", get(handlers::dictionary))
        .route("/api/dictionary/:locale", get(handlers::dictionary_for_locale))
        .route("/api/admin/sections", get(handlers::sections))
        .route("/api/admin/content/batch", post(handlers::save_batch))
        // GET takes a section key, PUT a row id.
        .route(
            "/api/admin/content/:key",
            get(handlers::section_content).put(handlers::save_content),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Serve until Ctrl+C or SIGTERM.
pub async fn serve(addr: SocketAddr, state: AppState) -> anyhow::Result<()> {
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;

    info!("Listening on {}", listener.local_addr()?);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use axum::body::{to_bytes, Body};
    use axum::http::{Request, StatusCode};
    use chrono::Utc;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::content::DEFAULT_TTL;
    use crate::database::memory::MemoryContentStore;
    use crate::database::{AdminRole, AdminUser, ContentItem, ContentSection, ContentType};
    use crate::i18n::{static_dictionary, Locale};

    fn row(id: &str, key: &str, en: &str, it: &str) -> ContentItem {
        ContentItem {
            id: id.to_string(),
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

    fn setup() -> (Arc<MemoryContentStore>, Router) {
        let store = Arc::new(MemoryContentStore::with_items(vec![
            row("1", "hero.description", "old", "vecchio"),
            row("2", "standalone", "Alone", "Solo"),
        ]));
        store.add_section(ContentSection {
            id: "s1".to_string(),
            section_key: "home".to_string(),
            display_name_en: "Home".to_string(),
            display_name_it: "Home".to_string(),
            description: None,
            sort_order: 0,
            icon: None,
        });
        store.add_admin(AdminUser {
            id: "editor-1".to_string(),
            email: "editor@laxmi.test".to_string(),
            display_name: "Editor".to_string(),
            role: AdminRole::Editor,
            is_active: true,
            last_login: None,
        });

        let state = AppState::new(
            store.clone(),
            &CacheRegistry::new(),
            DEFAULT_TTL,
            vec!["owner-1".to_string()],
            Revalidator::disabled(),
        );
        (store, router(state))
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.expect("infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).expect("request")
    }

    fn admin_get(uri: &str, user: &str) -> Request<Body> {
        Request::builder()
            .uri(uri)
            .header(ADMIN_USER_HEADER, user)
            .body(Body::empty())
            .expect("request")
    }

    fn admin_json(method: &str, uri: &str, user: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(ADMIN_USER_HEADER, user)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .expect("request")
    }

    #[tokio::test]
    async fn test_health() {
        let (_, app) = setup();
        let response = app.oneshot(get("/health")).await.expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_dictionary_by_locale_and_header() {
        let (_, app) = setup();

        let (status, body) = send(&app, get("/api/dictionary/en")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["hero"]["description"], "old");
        assert_eq!(body["nav"]["contact"], "Contact");

        let request = Request::builder()
            .uri("/api/dictionary")
            .header("accept-language", "en-US,en;q=0.9,it;q=0.8")
            .body(Body::empty())
            .expect("request");
        let (_, body) = send(&app, request).await;
        assert_eq!(body["nav"]["contact"], "Contact");

        // Unknown locales resolve to Italian.
        let (_, body) = send(&app, get("/api/dictionary/fr")).await;
        assert_eq!(body["nav"]["contact"], "Contatti");
    }

    #[tokio::test]
    async fn test_dictionary_outage_serves_static() {
        let (store, app) = setup();
        store.set_unavailable(true);

        let response = app.clone().oneshot(get("/api/dictionary/en")).await.expect("infallible");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[CONTENT_SOURCE_HEADER], "static");

        let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body, static_dictionary(Locale::En).clone().into_value());
    }

    #[tokio::test]
    async fn test_admin_routes_require_admin() {
        let (_, app) = setup();

        let (status, body) = send(&app, get("/api/admin/sections")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["success"], false);

        let (status, _) = send(&app, admin_get("/api/admin/sections", "stranger")).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, body) = send(&app, admin_get("/api/admin/sections", "owner-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body[0]["section_key"], "home");
    }

    #[tokio::test]
    async fn test_section_listing_and_search() {
        let (_, app) = setup();

        let (status, body) = send(&app, admin_get("/api/admin/content/home", "editor-1")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total"], 2);
        assert_eq!(body["groups"][0]["prefix"], "_root");
        assert_eq!(body["groups"][1]["items"][0]["display_key"], "description");
        assert_eq!(body["groups"][1]["items"][0]["status"], "neutral");

        let (_, body) = send(&app, admin_get("/api/admin/content/home?q=VECCHIO", "editor-1")).await;
        assert_eq!(body["shown"], 1);

        let (_, body) = send(&app, admin_get("/api/admin/content/home?q=nothing", "editor-1")).await;
        assert_eq!(body["state"], "no_matches");

        let (status, _) = send(&app, admin_get("/api/admin/content/blog", "editor-1")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_save_updates_public_dictionary() {
        let (store, app) = setup();
        send(&app, get("/api/dictionary/en")).await;

        let (status, body) = send(
            &app,
            admin_json(
                "PUT",
                "/api/admin/content/1",
                "editor-1",
                json!({ "content_en": "new", "content_it": "vecchio" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["row"]["id"], "1");
        assert_eq!(body["row"]["content_en"], "new");
        assert_eq!(body["row"]["updated_by"], "editor-1");
        assert_eq!(body["row"]["display_key"], "description");
        assert_eq!(body["row"]["status"], "saved");
        assert_eq!(store.item("1").and_then(|i| i.updated_by), Some("editor-1".to_string()));

        let (_, body) = send(&app, get("/api/dictionary/en")).await;
        assert_eq!(body["hero"]["description"], "new");
        let (_, body) = send(&app, get("/api/dictionary/it")).await;
        assert_eq!(body["hero"]["description"], "vecchio");

        let (_, body) = send(&app, admin_get("/api/admin/content/home", "editor-1")).await;
        assert_eq!(body["groups"][1]["items"][0]["status"], "saved");
    }

    #[tokio::test]
    async fn test_save_errors_map_to_status() {
        let (store, app) = setup();

        let (status, body) = send(
            &app,
            admin_json("PUT", "/api/admin/content/1", "editor-1", json!({ "content_en": " ", "content_it": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["success"], false);
        assert!(body["error"].is_string());

        let stale = (Utc::now() - chrono::Duration::hours(1)).to_rfc3339();
        let (status, _) = send(
            &app,
            admin_json(
                "PUT",
                "/api/admin/content/1",
                "editor-1",
                json!({ "content_en": "a", "content_it": "b", "expected_updated_at": stale }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);

        store.set_reject_writes(true);
        let (status, _) = send(
            &app,
            admin_json("PUT", "/api/admin/content/1", "editor-1", json!({ "content_en": "a", "content_it": "b" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(store.item("1").map(|i| i.content_en), Some("old".to_string()));

        let (status, _) = send(
            &app,
            admin_json("PUT", "/api/admin/content/ghost", "editor-1", json!({ "content_en": "a", "content_it": "b" })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_batch_save() {
        let (store, app) = setup();

        let (status, body) = send(
            &app,
            admin_json(
                "POST",
                "/api/admin/content/batch",
                "editor-1",
                json!({ "updates": [
                    { "id": "1", "content_en": "One", "content_it": "Uno" },
                    { "id": "ghost", "content_en": "x", "content_it": "y" },
                ]}),
            ),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["failed_id"], "ghost");
        assert_eq!(store.item("1").map(|i| i.content_en), Some("One".to_string()));
    }
}
