//! LAXMI content service entry point.
//!
//! `laxmi-content` serves the HTTP API; `laxmi-content seed` fills the
//! content table from the bundled dictionaries and exits.

use std::env;
use std::sync::Arc;

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use laxmi_content::admin::{self, Revalidator};
use laxmi_content::cache::CacheRegistry;
use laxmi_content::config::{Config, ContentBackend};
use laxmi_content::database::{ContentStore, Database, MongoContentStore, SupabaseContentStore};
use laxmi_content::server::{self, AppState};
use laxmi_content::utils::format_duration;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file first (before anything else)
    dotenvy::dotenv().ok();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("laxmi_content=info,tower_http=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = Config::from_env()?;
    info!("Configuration loaded (backend: {:?})", config.backend);

    let store = connect_store(&config).await?;

    match env::args().nth(1).as_deref() {
        None | Some("serve") => {}
        Some("seed") => {
            let report = admin::seed(store.as_ref()).await;
            if report.skipped > 0 {
                warn!("{} keys were skipped, see errors above", report.skipped);
            }
            return Ok(());
        }
        Some(other) => bail!("unknown command '{other}' (expected 'serve' or 'seed')"),
    }

    let registry = CacheRegistry::new();
    info!("Dictionary cache TTL: {}", format_duration(config.dictionary_ttl));

    let revalidator = match &config.revalidate_url {
        Some(url) => {
            info!("Revalidation webhook: {}", url);
            Revalidator::new(url.clone(), config.revalidate_secret.clone())
        }
        None => {
            info!("No REVALIDATE_URL configured, skipping path revalidation");
            Revalidator::disabled()
        }
    };

    if config.owner_ids.is_empty() {
        info!("No owner IDs configured (ADMIN_OWNER_IDS is empty)");
    } else {
        info!("Admin owners: {:?}", config.owner_ids);
    }

    let state = AppState::new(
        store,
        &registry,
        config.dictionary_ttl,
        config.owner_ids.clone(),
        revalidator,
    );

    server::serve(config.bind_addr, state).await
}

async fn connect_store(config: &Config) -> anyhow::Result<Arc<dyn ContentStore>> {
    match config.backend {
        ContentBackend::Supabase => {
            let supabase = config.supabase.as_ref().context("Supabase configuration missing")?;
            info!("Using Supabase at {}", supabase.url);
            let store = SupabaseContentStore::new(supabase.url.as_str(), &supabase.service_role_key)?;
            Ok(Arc::new(store))
        }
        ContentBackend::Mongodb => {
            let mongo = config.mongodb.as_ref().context("MongoDB configuration missing")?;
            info!("Connecting to MongoDB...");
            let db = Database::connect(&mongo.uri, &mongo.database).await?;
            Ok(Arc::new(MongoContentStore::new(&db)))
        }
    }
}
