//! Process-wide dictionary cache with tag invalidation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::assembler::DictionaryAssembler;
use super::dictionary::Dictionary;
use crate::cache::{CacheConfig, CacheRegistry, TypedCache};
use crate::i18n::{static_dictionary, Locale};

/// Invalidation tag shared by every cache derived from site content.
pub const DICTIONARY_TAG: &str = "dictionary";

/// Registry name of the assembled dictionary cache.
const CACHE_NAME: &str = "dictionaries";

/// Default upper bound on staleness without explicit invalidation.
pub const DEFAULT_TTL: Duration = Duration::from_secs(3600);

/// Entries are keyed by invalidation generation so an assembly that started
/// before an invalidation can never be served after it.
type CacheKey = (Locale, u64);

/// Where a resolved dictionary came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DictionarySource {
    Cache,
    Database,
    Static,
}

impl DictionarySource {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Cache => "cache",
            Self::Database => "database",
            Self::Static => "static",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Resolved {
    pub dictionary: Arc<Dictionary>,
    pub source: DictionarySource,
}

/// Cache layer in front of the [`DictionaryAssembler`].
///
/// - `get` serves a cached dictionary or assembles a fresh one
/// - `invalidate` drops every cache registered under a tag
/// - `expire` drops every cached dictionary
///
/// When the content source is unavailable the static dictionary is served
/// and nothing is cached, so the next request retries the database.
#[derive(Clone)]
pub struct DictionaryCache {
    assembler: DictionaryAssembler,
    registry: CacheRegistry,
    cache: Option<TypedCache<CacheKey, Arc<Dictionary>>>,
    generation: Arc<AtomicU64>,
}

impl DictionaryCache {
    /// Create a cache with the given time-to-live, registered under
    /// [`DICTIONARY_TAG`].
    pub fn new(assembler: DictionaryAssembler, registry: &CacheRegistry, ttl: Duration) -> Self {
        let cache = registry.get_or_create_tagged(CACHE_NAME, DICTIONARY_TAG, CacheConfig::dictionary(ttl));
        info!("Dictionary cache ready (ttl: {:?})", ttl);

        Self {
            assembler,
            registry: registry.clone(),
            cache: Some(cache),
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Create a pass-through cache that assembles on every call.
    pub fn uncached(assembler: DictionaryAssembler, registry: &CacheRegistry) -> Self {
        Self {
            assembler,
            registry: registry.clone(),
            cache: None,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Dictionary for `locale`. Never fails; degrades to static content.
    pub async fn get(&self, locale: Locale) -> Arc<Dictionary> {
        self.resolve(locale).await.dictionary
    }

    /// Like [`get`](Self::get), also reporting where the value came from.
    pub async fn resolve(&self, locale: Locale) -> Resolved {
        let key = (locale, self.generation.load(Ordering::SeqCst));

        if let Some(cache) = &self.cache
            && let Some(dictionary) = cache.get(&key)
        {
            debug!("Dictionary cache hit for '{}'", locale);
            return Resolved {
                dictionary,
                source: DictionarySource::Cache,
            };
        }

        debug!("Dictionary cache miss for '{}'", locale);

        match self.assembler.assemble(locale).await {
            Ok(dictionary) => {
                let dictionary = Arc::new(dictionary);
                if let Some(cache) = &self.cache {
                    cache.insert(key, Arc::clone(&dictionary));
                }
                Resolved {
                    dictionary,
                    source: DictionarySource::Database,
                }
            }
            Err(e) => {
                warn!("Serving static '{}' dictionary: {}", locale, e);
                Resolved {
                    dictionary: Arc::new(static_dictionary(locale).clone()),
                    source: DictionarySource::Static,
                }
            }
        }
    }

    /// Drop every cache registered under `tag`.
    ///
    /// Any `get` that starts after this returns observes writes committed
    /// before it was called.
    pub fn invalidate(&self, tag: &str) {
        if tag == DICTIONARY_TAG {
            self.generation.fetch_add(1, Ordering::SeqCst);
        }
        let cleared = self.registry.invalidate_tag(tag);
        info!("Invalidated tag '{}' ({} caches)", tag, cleared);
    }

    /// Drop every cached dictionary regardless of tag.
    pub fn expire(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
        if let Some(cache) = &self.cache {
            cache.invalidate_all();
        }
    }
}
