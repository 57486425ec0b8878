//! # Response Cache
//!
//! A TTL cache in front of the repository-hosting API.
//!
//! ## Features
//!
//! - **Lazy TTL expiry**: freshness is checked on read; no background eviction
//! - **Stale fallback**: expired entries can be read on request, and are used
//!   when a fetch fails
//! - **Alternate-auth reuse**: a response cached anonymously serves an
//!   authenticated request for the same URL, and vice versa
//! - **Best-effort storage**: backend failures are logged and become misses
//!
//! ## Example
//!
//! ```rust
//! use showcase_core::cache::{CacheConfig, ResponseCache};
//! use std::time::Duration;
//!
//! # async fn example() {
//! let cache = ResponseCache::in_memory(CacheConfig::default());
//!
//! cache.set("user:octocat", &"The Octocat", Duration::from_secs(3600)).await;
//!
//! if let Some(name) = cache.get::<String>("user:octocat", false).await {
//!     println!("Cache hit: {}", name);
//! }
//! # }
//! ```

pub mod config;
pub mod entry;
pub mod fetch;
pub mod keys;
pub mod storage;
pub mod store;
pub mod types;

pub use config::{CacheConfig, CacheConfigBuilder};
pub use entry::CacheEntry;
pub use fetch::{HttpClient, HttpResponse, ReqwestClient};
pub use keys::{Method, RequestKey, RequestOptions};
pub use storage::{FileStore, KeyValueStore, MemoryStore};
pub use store::ResponseCache;
pub use types::{CacheKey, CacheStats};
