//! Configuration module for the content service.
//!
//! Loads configuration from environment variables.

use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context};
use url::Url;

use crate::content::DEFAULT_TTL;
use crate::utils::{parse_duration, parse_id_list};

/// Where site content is stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ContentBackend {
    /// Hosted Postgres through the PostgREST API.
    #[default]
    Supabase,
    Mongodb,
}

#[derive(Debug, Clone)]
pub struct SupabaseConfig {
    pub url: Url,
    pub service_role_key: String,
}

#[derive(Debug, Clone)]
pub struct MongoConfig {
    pub uri: String,
    pub database: String,
}

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub backend: ContentBackend,
    pub supabase: Option<SupabaseConfig>,
    pub mongodb: Option<MongoConfig>,

    pub bind_addr: SocketAddr,

    /// How long an assembled dictionary may be served without invalidation.
    pub dictionary_ttl: Duration,

    /// Dashboard user ids with full access, bypassing the admin table.
    pub owner_ids: Vec<String>,

    /// Frontend endpoint asked to rebuild pages after a save.
    pub revalidate_url: Option<Url>,
    pub revalidate_secret: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    /// Returns error if a required variable for the selected backend is
    /// missing or a value does not parse.
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| var(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let backend = match var("CONTENT_BACKEND").map(|v| v.to_lowercase()).as_deref() {
            None | Some("supabase") => ContentBackend::Supabase,
            Some("mongodb") | Some("mongo") => ContentBackend::Mongodb,
            Some(other) => bail!("unknown CONTENT_BACKEND '{other}' (expected supabase or mongodb)"),
        };

        let supabase = match backend {
            ContentBackend::Supabase => {
                let url = var("SUPABASE_URL").context("SUPABASE_URL must be set")?;
                Some(SupabaseConfig {
                    url: Url::parse(&url).context("invalid SUPABASE_URL")?,
                    service_role_key: var("SUPABASE_SERVICE_ROLE_KEY")
                        .context("SUPABASE_SERVICE_ROLE_KEY must be set")?,
                })
            }
            ContentBackend::Mongodb => None,
        };

        let mongodb = match backend {
            ContentBackend::Mongodb => Some(MongoConfig {
                uri: var("MONGODB_URI").context("MONGODB_URI must be set")?,
                database: var("MONGODB_DATABASE").unwrap_or_else(|| "laxmi".to_string()),
            }),
            ContentBackend::Supabase => None,
        };

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| "0.0.0.0:8080".to_string())
            .parse()
            .context("invalid BIND_ADDR")?;

        let dictionary_ttl = match var("DICTIONARY_CACHE_TTL") {
            Some(raw) => parse_duration(&raw)
                .with_context(|| format!("invalid DICTIONARY_CACHE_TTL '{raw}' (e.g. 1h, 30m, 90s)"))?,
            None => DEFAULT_TTL,
        };

        let revalidate_url = var("REVALIDATE_URL")
            .map(|raw| Url::parse(&raw))
            .transpose()
            .context("invalid REVALIDATE_URL")?;

        Ok(Self {
            backend,
            supabase,
            mongodb,
            bind_addr,
            dictionary_ttl,
            owner_ids: var("ADMIN_OWNER_IDS").map(|v| parse_id_list(&v)).unwrap_or_default(),
            revalidate_url,
            revalidate_secret: var("REVALIDATE_SECRET"),
        })
    }
}
