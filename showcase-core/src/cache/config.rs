//! Configuration for the response cache

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for the response cache
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// TTL used when a caller does not pass one
    pub default_ttl: Duration,

    /// TTL jitter factor (0.0 - 1.0), applied to the default TTL only
    pub ttl_jitter: f64,

    /// Prefix prepended to every storage key
    pub key_prefix: String,

    /// Hex characters of the body digest kept in request keys
    pub body_digest_len: usize,

    /// Probe the opposite auth-presence key on a miss
    pub enable_alternate_auth: bool,

    /// Serve expired entries when the network call fails
    pub enable_stale_fallback: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            default_ttl: Duration::from_secs(3600),
            ttl_jitter: 0.0,
            key_prefix: "showcase:".to_string(),
            body_digest_len: 16,
            enable_alternate_auth: true,
            enable_stale_fallback: true,
        }
    }
}

impl CacheConfig {
    /// Create a new builder for cache configuration
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.default_ttl.is_zero() {
            return Err("default_ttl must be greater than 0".to_string());
        }

        if !(0.0..=1.0).contains(&self.ttl_jitter) {
            return Err("ttl_jitter must be between 0.0 and 1.0".to_string());
        }

        if self.body_digest_len == 0 || self.body_digest_len > 64 {
            return Err("body_digest_len must be between 1 and 64".to_string());
        }

        Ok(())
    }

    /// Default TTL with jitter applied
    pub fn ttl_with_jitter(&self) -> Duration {
        if self.ttl_jitter == 0.0 {
            return self.default_ttl;
        }

        let base_secs = self.default_ttl.as_secs_f64();
        let jitter_range = base_secs * self.ttl_jitter;
        let jitter = (rand::random::<f64>() * 2.0 - 1.0) * jitter_range;
        let final_secs = (base_secs + jitter).max(1.0);

        Duration::from_secs_f64(final_secs)
    }
}

/// Builder for cache configuration
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    default_ttl: Option<Duration>,
    ttl_jitter: Option<f64>,
    key_prefix: Option<String>,
    body_digest_len: Option<usize>,
    enable_alternate_auth: Option<bool>,
    enable_stale_fallback: Option<bool>,
}

impl CacheConfigBuilder {
    /// Set the default TTL
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.default_ttl = Some(ttl);
        self
    }

    /// Set TTL jitter factor (0.0 - 1.0)
    pub fn ttl_jitter(mut self, jitter: f64) -> Self {
        self.ttl_jitter = Some(jitter);
        self
    }

    /// Set the storage key prefix
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = Some(prefix.into());
        self
    }

    /// Set how many digest characters identify a request body
    pub fn body_digest_len(mut self, len: usize) -> Self {
        self.body_digest_len = Some(len);
        self
    }

    /// Enable or disable the alternate-auth probe
    pub fn enable_alternate_auth(mut self, enable: bool) -> Self {
        self.enable_alternate_auth = Some(enable);
        self
    }

    /// Enable or disable stale fallback on fetch failure
    pub fn enable_stale_fallback(mut self, enable: bool) -> Self {
        self.enable_stale_fallback = Some(enable);
        self
    }

    /// Build the cache configuration
    pub fn build(self) -> CacheConfig {
        let defaults = CacheConfig::default();

        CacheConfig {
            default_ttl: self.default_ttl.unwrap_or(defaults.default_ttl),
            ttl_jitter: self.ttl_jitter.unwrap_or(defaults.ttl_jitter),
            key_prefix: self.key_prefix.unwrap_or(defaults.key_prefix),
            body_digest_len: self.body_digest_len.unwrap_or(defaults.body_digest_len),
            enable_alternate_auth: self
                .enable_alternate_auth
                .unwrap_or(defaults.enable_alternate_auth),
            enable_stale_fallback: self
                .enable_stale_fallback
                .unwrap_or(defaults.enable_stale_fallback),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CacheConfig::default();
        assert_eq!(config.default_ttl, Duration::from_secs(3600));
        assert!(config.enable_alternate_auth);
        assert!(config.enable_stale_fallback);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut invalid_config = CacheConfig::default();
        invalid_config.default_ttl = Duration::ZERO;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = CacheConfig::default();
        invalid_config.ttl_jitter = 1.5;
        assert!(invalid_config.validate().is_err());

        let mut invalid_config = CacheConfig::default();
        invalid_config.body_digest_len = 0;
        assert!(invalid_config.validate().is_err());
    }

    #[test]
    fn test_config_builder() {
        let config = CacheConfig::builder()
            .default_ttl(Duration::from_secs(600))
            .key_prefix("test:")
            .enable_alternate_auth(false)
            .build();

        assert_eq!(config.default_ttl, Duration::from_secs(600));
        assert_eq!(config.key_prefix, "test:");
        assert!(!config.enable_alternate_auth);
        assert!(config.enable_stale_fallback);
    }

    #[test]
    fn test_ttl_with_jitter() {
        let config = CacheConfig {
            default_ttl: Duration::from_secs(3600),
            ttl_jitter: 0.1,
            ..Default::default()
        };

        let ttl = config.ttl_with_jitter();
        assert!(ttl.as_secs_f64() >= 3600.0 - 360.0);
        assert!(ttl.as_secs_f64() <= 3600.0 + 360.0);

        let exact = CacheConfig::default();
        assert_eq!(exact.ttl_with_jitter(), Duration::from_secs(3600));
    }
}
