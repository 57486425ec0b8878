//! Core type definitions for the cache system

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cache key type
pub type CacheKey = String;

/// Statistics for cache behaviour monitoring
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Fresh hits under the requested key
    pub hits: u64,

    /// Lookups that found nothing usable
    pub misses: u64,

    /// Expired entries returned because the caller allowed staleness
    pub stale_hits: u64,

    /// Fresh hits served from the opposite auth-presence key
    pub alternate_hits: u64,

    /// Network round-trips performed by `cached_fetch`
    pub network_fetches: u64,

    /// Failed fetches recovered from a cached entry
    pub fallbacks: u64,

    /// Successful writes
    pub writes: u64,

    /// Storage-layer failures swallowed by the cache
    pub storage_errors: u64,

    /// Entries deleted on read because they had expired
    pub evictions_ttl: u64,
}

impl CacheStats {
    /// Cache hit rate as a percentage (fresh and alternate hits)
    pub fn hit_rate(&self) -> f64 {
        let hits = self.hits + self.alternate_hits;
        let total = hits + self.misses;
        if total == 0 {
            0.0
        } else {
            (hits as f64 / total as f64) * 100.0
        }
    }

    /// Miss rate as a percentage
    pub fn miss_rate(&self) -> f64 {
        100.0 - self.hit_rate()
    }
}

impl fmt::Display for CacheStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "CacheStats {{ hits: {}, misses: {}, hit_rate: {:.2}%, stale: {}, fetches: {}, fallbacks: {}, storage_errors: {} }}",
            self.hits,
            self.misses,
            self.hit_rate(),
            self.stale_hits,
            self.network_fetches,
            self.fallbacks,
            self.storage_errors
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_stats_hit_rate() {
        let stats = CacheStats {
            hits: 70,
            alternate_hits: 10,
            misses: 20,
            ..Default::default()
        };

        assert_eq!(stats.hit_rate(), 80.0);
        assert_eq!(stats.miss_rate(), 20.0);
    }

    #[test]
    fn test_cache_stats_zero_requests() {
        let stats = CacheStats::default();
        assert_eq!(stats.hit_rate(), 0.0);
        assert_eq!(stats.miss_rate(), 100.0);
    }

    #[test]
    fn test_cache_stats_display() {
        let stats = CacheStats {
            hits: 100,
            misses: 50,
            fallbacks: 3,
            ..Default::default()
        };

        let display = format!("{}", stats);
        assert!(display.contains("hits: 100"));
        assert!(display.contains("misses: 50"));
        assert!(display.contains("fallbacks: 3"));
    }
}
