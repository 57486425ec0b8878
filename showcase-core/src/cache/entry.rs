//! Cache entry with TTL-based freshness

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A stored payload together with the instant it was written and its TTL.
///
/// An entry is fresh while `now - timestamp <= ttl`. Expiry is only checked
/// lazily, on read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheEntry<T> {
    /// The cached payload
    pub data: T,

    /// When the entry was written
    pub timestamp: DateTime<Utc>,

    /// Time-to-live
    #[serde(with = "duration_millis")]
    pub ttl: Duration,
}

impl<T> CacheEntry<T> {
    /// Create a new entry stamped with the current time
    pub fn new(data: T, ttl: Duration) -> Self {
        Self::with_timestamp(data, Utc::now(), ttl)
    }

    /// Create an entry with an explicit write time
    pub fn with_timestamp(data: T, timestamp: DateTime<Utc>, ttl: Duration) -> Self {
        Self { data, timestamp, ttl }
    }

    /// Instant after which the entry is expired, `None` if it never expires
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        let ttl = chrono::Duration::from_std(self.ttl).ok()?;
        self.timestamp.checked_add_signed(ttl)
    }

    /// Freshness at a given instant
    pub fn is_fresh_at(&self, now: DateTime<Utc>) -> bool {
        match self.expires_at() {
            Some(expires_at) => now <= expires_at,
            None => true,
        }
    }

    pub fn is_fresh(&self) -> bool {
        self.is_fresh_at(Utc::now())
    }

    pub fn is_expired(&self) -> bool {
        !self.is_fresh()
    }

    /// Age of the entry
    pub fn age(&self) -> Duration {
        (Utc::now() - self.timestamp)
            .to_std()
            .unwrap_or(Duration::from_secs(0))
    }

    /// Time until expiration, `None` once expired
    pub fn time_until_expiration(&self) -> Option<Duration> {
        let now = Utc::now();
        match self.expires_at() {
            Some(expires_at) if now <= expires_at => (expires_at - now).to_std().ok(),
            Some(_) => None,
            None => Some(Duration::MAX),
        }
    }
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(ttl: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_entry_creation() {
        let entry = CacheEntry::new("payload".to_string(), Duration::from_secs(3600));

        assert_eq!(entry.data, "payload");
        assert!(entry.is_fresh());
        assert!(!entry.is_expired());
        assert!(entry.time_until_expiration().is_some());
    }

    #[test]
    fn test_freshness_boundary() {
        let written = Utc::now();
        let entry = CacheEntry::with_timestamp(1u32, written, Duration::from_secs(60));

        assert!(entry.is_fresh_at(written));
        assert!(entry.is_fresh_at(written + chrono::Duration::seconds(60)));
        assert!(!entry.is_fresh_at(written + chrono::Duration::seconds(61)));
    }

    #[test]
    fn test_expired_entry() {
        let written = Utc::now() - chrono::Duration::seconds(120);
        let entry = CacheEntry::with_timestamp(1u32, written, Duration::from_secs(60));

        assert!(entry.is_expired());
        assert!(entry.time_until_expiration().is_none());
        assert!(entry.age() >= Duration::from_secs(120));
    }

    #[test]
    fn test_entry_serialization() {
        let entry = CacheEntry::new(vec![1, 2, 3], Duration::from_millis(1500));

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("\"ttl\":1500"));

        let restored: CacheEntry<Vec<i32>> = serde_json::from_str(&json).unwrap();
        assert_eq!(restored, entry);
    }
}
