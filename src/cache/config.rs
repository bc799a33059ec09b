//! Cache configuration.

use std::time::Duration;

/// Configuration for a cache instance.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Maximum number of entries in the cache.
    pub max_capacity: u64,

    /// Time-to-live for cache entries.
    /// After this duration, entries are automatically evicted.
    pub ttl: Option<Duration>,

    /// Time-to-idle for cache entries.
    /// Entries are evicted if not accessed within this duration.
    pub tti: Option<Duration>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_capacity: 1_000,
            ttl: Some(Duration::from_secs(300)), // 5 minutes
            tti: None,
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with the given max capacity.
    pub fn with_capacity(max_capacity: u64) -> Self {
        Self {
            max_capacity,
            ..Default::default()
        }
    }

    /// Set max capacity for cache (builder pattern).
    #[must_use]
    pub fn max_capacity(mut self, max_capacity: u64) -> Self {
        self.max_capacity = max_capacity;
        self
    }

    /// Set time-to-live for cache entries.
    #[must_use]
    pub fn ttl(mut self, duration: Duration) -> Self {
        self.ttl = Some(duration);
        self
    }

    /// Set time-to-idle for cache entries.
    #[must_use]
    pub fn tti(mut self, duration: Duration) -> Self {
        self.tti = Some(duration);
        self
    }

    /// Config for assembled locale dictionaries.
    ///
    /// Two locales, each possibly held under a couple of invalidation
    /// generations until the old ones are evicted.
    pub fn dictionary(ttl: Duration) -> Self {
        Self {
            max_capacity: 16,
            ttl: Some(ttl),
            tti: None,
        }
    }

    /// Config for admin lookups by user id.
    /// Short TTL with idle timeout so revoked admins drop out quickly.
    pub fn admin_lookup() -> Self {
        Self {
            max_capacity: 1_000,
            ttl: Some(Duration::from_secs(300)), // 5 minutes
            tti: Some(Duration::from_secs(120)), // 2 minutes idle
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dictionary_preset_uses_given_ttl() {
        let config = CacheConfig::dictionary(Duration::from_secs(3600));
        assert_eq!(config.ttl, Some(Duration::from_secs(3600)));
        assert!(config.tti.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let config = CacheConfig::with_capacity(10)
            .ttl(Duration::from_secs(5))
            .tti(Duration::from_secs(2))
            .max_capacity(20);

        assert_eq!(config.max_capacity, 20);
        assert_eq!(config.ttl, Some(Duration::from_secs(5)));
        assert_eq!(config.tti, Some(Duration::from_secs(2)));
    }
}
