//! Response cache over an injected key/value store
//!
//! Every storage failure is caught here, logged, and turned into a miss or a
//! skipped write. Callers only ever see "present" or "absent".

use crate::cache::{
    config::CacheConfig,
    entry::CacheEntry,
    storage::{KeyValueStore, MemoryStore},
    types::CacheStats,
};
use serde::{de::DeserializeOwned, de::IgnoredAny, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// How a read treats an expired entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ReadMode {
    /// Fresh only; expired entries are deleted
    Fresh,
    /// Fresh only; expired entries are left in place for later fallback
    Peek,
    /// Expired entries are returned as well
    AllowExpired,
}

/// TTL cache for API responses
#[derive(Clone)]
pub struct ResponseCache {
    /// Cache configuration
    pub(crate) config: CacheConfig,

    /// Backing key/value store
    storage: Arc<dyn KeyValueStore>,

    /// Running statistics
    stats: Arc<RwLock<CacheStats>>,
}

impl ResponseCache {
    /// Create a cache over the given storage backend
    pub fn new(config: CacheConfig, storage: Arc<dyn KeyValueStore>) -> Self {
        info!("Initializing response cache with config: {:?}", config);

        Self {
            config,
            storage,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// Create a cache backed by a fresh [`MemoryStore`]
    pub fn in_memory(config: CacheConfig) -> Self {
        Self::new(config, Arc::new(MemoryStore::new()))
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Configured default TTL, with jitter applied on every call
    pub fn default_ttl(&self) -> Duration {
        self.config.ttl_with_jitter()
    }

    /// Payload under `key` if present and fresh, or present at all when
    /// `allow_expired` is set. A present-but-expired entry read without
    /// `allow_expired` is deleted.
    pub async fn get<T: DeserializeOwned>(&self, key: &str, allow_expired: bool) -> Option<T> {
        let mode = if allow_expired {
            ReadMode::AllowExpired
        } else {
            ReadMode::Fresh
        };
        self.read::<T>(key, mode, true).await.map(|entry| entry.data)
    }

    /// Upsert `data` under `key`, stamped now. Failures are logged and dropped.
    pub async fn set<T: Serialize + ?Sized>(&self, key: &str, data: &T, ttl: Duration) {
        let entry = CacheEntry::new(data, ttl);
        let bytes = match serde_json::to_vec(&entry) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to serialize cache entry {}: {}", key, e);
                self.stats.write().await.storage_errors += 1;
                return;
            }
        };

        match self.storage.set(&self.storage_key(key), bytes, ttl).await {
            Ok(()) => {
                debug!("Cached {} (ttl {:?})", key, ttl);
                self.stats.write().await.writes += 1;
            }
            Err(e) => {
                warn!("Failed to write cache entry {}: {}", key, e);
                self.stats.write().await.storage_errors += 1;
            }
        }
    }


    /// Remove one entry
    pub async fn delete(&self, key: &str) {
        if let Err(e) = self.storage.delete(&self.storage_key(key)).await {
            warn!("Failed to delete cache entry {}: {}", key, e);
            self.stats.write().await.storage_errors += 1;
        }
    }

    /// Remove all entries
    pub async fn clear(&self) {
        match self.storage.clear().await {
            Ok(()) => info!("Cleared response cache"),
            Err(e) => {
                warn!("Failed to clear response cache: {}", e);
                self.stats.write().await.storage_errors += 1;
            }
        }
    }

    /// Whether a fresh entry exists under `key`
    pub async fn has(&self, key: &str) -> bool {
        self.read::<IgnoredAny>(key, ReadMode::Fresh, false)
            .await
            .is_some()
    }

    /// Remaining lifetime of the fresh entry under `key`
    pub async fn expires_in(&self, key: &str) -> Option<Duration> {
        self.read::<IgnoredAny>(key, ReadMode::Peek, false)
            .await
            .and_then(|entry| entry.time_until_expiration())
    }

    /// Snapshot of the cache statistics
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    pub(crate) async fn record<F: FnOnce(&mut CacheStats)>(&self, update: F) {
        update(&mut *self.stats.write().await);
    }

    pub(crate) async fn read<T: DeserializeOwned>(
        &self,
        key: &str,
        mode: ReadMode,
        track: bool,
    ) -> Option<CacheEntry<T>> {
        let storage_key = self.storage_key(key);

        let bytes = match self.storage.get(&storage_key).await {
            Ok(Some(bytes)) => bytes,
            Ok(None) => {
                debug!("Cache miss: {}", key);
                if track {
                    self.record(|s| s.misses += 1).await;
                }
                return None;
            }
            Err(e) => {
                warn!("Cache read failed for {}: {}", key, e);
                self.record(|s| {
                    s.storage_errors += 1;
                    if track {
                        s.misses += 1;
                    }
                })
                .await;
                return None;
            }
        };

        let entry: CacheEntry<T> = match serde_json::from_slice(&bytes) {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Discarding unreadable cache entry {}: {}", key, e);
                self.record(|s| {
                    s.storage_errors += 1;
                    if track {
                        s.misses += 1;
                    }
                })
                .await;
                return None;
            }
        };

        if entry.is_fresh() {
            debug!("Cache hit: {}", key);
            if track {
                self.record(|s| s.hits += 1).await;
            }
            return Some(entry);
        }

        match mode {
            ReadMode::AllowExpired => {
                debug!("Serving expired cache entry: {}", key);
                if track {
                    self.record(|s| s.stale_hits += 1).await;
                }
                Some(entry)
            }
            ReadMode::Peek => {
                if track {
                    self.record(|s| s.misses += 1).await;
                }
                None
            }
            ReadMode::Fresh => {
                debug!("Cache entry expired: {}", key);
                if let Err(e) = self.storage.delete(&storage_key).await {
                    warn!("Failed to delete expired cache entry {}: {}", key, e);
                    self.record(|s| s.storage_errors += 1).await;
                }
                self.record(|s| {
                    s.evictions_ttl += 1;
                    if track {
                        s.misses += 1;
                    }
                })
                .await;
                None
            }
        }
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.config.key_prefix, key)
    }
}
