//! Cache registry - Central management for all caches.

use std::any::{Any, TypeId};
use std::collections::{BTreeSet, HashMap};
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::{debug, info};

use super::{CacheConfig, TypedCache};

/// Type-erased view of a registered cache.
///
/// Lets the registry clear caches by tag without knowing their key and
/// value types.
trait ErasedCache: Send + Sync {
    fn as_any(&self) -> &dyn Any;
    fn clear(&self);
}

impl<K, V> ErasedCache for TypedCache<K, V>
where
    K: Hash + Eq + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn clear(&self) {
        self.invalidate_all();
    }
}

/// Central registry for managing multiple typed caches.
///
/// Caches are created by name and may be grouped under invalidation tags,
/// so that one call drops every cache derived from the same source data.
///
/// ## Example
///
/// ```rust,ignore
/// let registry = CacheRegistry::new();
///
/// let dictionaries: TypedCache<Locale, Arc<Dictionary>> =
///     registry.get_or_create_tagged("dictionaries", "dictionary", CacheConfig::default());
///
/// // After an edit:
/// registry.invalidate_tag("dictionary");
/// ```
#[derive(Clone)]
pub struct CacheRegistry {
    caches: Arc<RwLock<HashMap<String, CacheEntry>>>,
}

/// Internal cache entry storing type-erased cache.
struct CacheEntry {
    cache: Box<dyn ErasedCache>,
    type_id: TypeId,
    type_name: &'static str,
    tags: BTreeSet<String>,
}

impl CacheEntry {
    fn downcast<K, V>(&self, name: &str) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        match self.cache.as_any().downcast_ref::<TypedCache<K, V>>() {
            Some(cache) if self.type_id == TypeId::of::<TypedCache<K, V>>() => cache.clone(),
            _ => panic!(
                "Cache '{}' type mismatch: expected {}, got {}",
                name,
                std::any::type_name::<TypedCache<K, V>>(),
                self.type_name
            ),
        }
    }
}

impl CacheRegistry {
    /// Create a new empty cache registry.
    pub fn new() -> Self {
        info!("Cache registry initialized");
        Self {
            caches: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Get an existing cache by name.
    ///
    /// # Panics
    /// Panics if the cache exists but with different types.
    pub fn get<K, V>(&self, name: &str) -> Option<TypedCache<K, V>>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        self.caches.read().get(name).map(|entry| entry.downcast(name))
    }

    /// Get an existing cache or create a new one if it doesn't exist.
    ///
    /// # Panics
    /// Panics if a cache with the same name but different types already exists.
    pub fn get_or_create<K, V>(&self, name: &str, config: CacheConfig) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut caches = self.caches.write();

        if let Some(existing) = caches.get(name) {
            return existing.downcast(name);
        }

        debug!("Creating cache: {}", name);

        let cache = TypedCache::new(name, config);
        caches.insert(
            name.to_string(),
            CacheEntry {
                cache: Box::new(cache.clone()),
                type_id: TypeId::of::<TypedCache<K, V>>(),
                type_name: std::any::type_name::<TypedCache<K, V>>(),
                tags: BTreeSet::new(),
            },
        );

        cache
    }

    /// Get or create a cache and register it under an invalidation tag.
    pub fn get_or_create_tagged<K, V>(
        &self,
        name: &str,
        tag: &str,
        config: CacheConfig,
    ) -> TypedCache<K, V>
    where
        K: Hash + Eq + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let cache = self.get_or_create(name, config);
        self.tag(name, tag);
        cache
    }

    /// Associate an existing cache with a tag.
    ///
    /// Returns `false` if no cache with that name exists.
    pub fn tag(&self, name: &str, tag: &str) -> bool {
        match self.caches.write().get_mut(name) {
            Some(entry) => {
                entry.tags.insert(tag.to_string());
                true
            }
            None => false,
        }
    }

    /// Drop every entry of every cache registered under `tag`.
    ///
    /// Returns the number of caches cleared.
    pub fn invalidate_tag(&self, tag: &str) -> usize {
        let caches = self.caches.read();
        let mut cleared = 0;

        for (name, entry) in caches.iter() {
            if entry.tags.contains(tag) {
                entry.cache.clear();
                debug!("Cleared cache '{}' for tag '{}'", name, tag);
                cleared += 1;
            }
        }

        cleared
    }

    /// Drop every entry of every registered cache.
    pub fn invalidate_all(&self) {
        for entry in self.caches.read().values() {
            entry.cache.clear();
        }
    }

    /// Check if a cache with the given name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.caches.read().contains_key(name)
    }

    /// Get the number of registered caches.
    pub fn len(&self) -> usize {
        self.caches.read().len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.caches.read().is_empty()
    }
}

impl Default for CacheRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CacheRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let caches = self.caches.read();
        f.debug_struct("CacheRegistry")
            .field("cache_count", &caches.len())
            .field("cache_names", &caches.keys().collect::<Vec<_>>())
            .finish()
    }
}
