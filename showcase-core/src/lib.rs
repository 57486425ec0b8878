//! # Showcase Core (showcase-core)
//!
//! Engines behind the portfolio showcase: a response cache for remote API
//! calls, a filter/sort controller with URL persistence, the project domain
//! built on top of it, and the card layout solver.
//!
//! ## Features
//!
//! - TTL response cache with stale fallback and cross-auth reuse
//! - Pluggable key/value storage (in-memory, file-backed)
//! - Generic filter/sort controller with a bounded sort recency stack
//! - Deferred, coalesced URL writes
//! - Adaptive column/width/gap layout solving
//!
//! ## Cached fetch
//!
//! ```no_run
//! use showcase_core::cache::{CacheConfig, RequestOptions, ReqwestClient, ResponseCache};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let cache = ResponseCache::in_memory(CacheConfig::default());
//!     let client = ReqwestClient::new(Duration::from_secs(10))?;
//!
//!     let user: serde_json::Value = cache
//!         .cached_fetch(
//!             &client,
//!             "https://api.github.com/users/octocat",
//!             &RequestOptions::get(),
//!             Duration::from_secs(3600),
//!         )
//!         .await?;
//!     println!("{}", user["login"]);
//!     Ok(())
//! }
//! ```
//!
//! ## Projects
//!
//! ```rust
//! use showcase_core::controller::QueryParams;
//! use showcase_core::portfolio::{Project, ProjectController};
//!
//! let projects = vec![Project {
//!     name: "widget".into(),
//!     full_name: "octo/widget".into(),
//!     stars: 3,
//!     pinned: true,
//!     ..Default::default()
//! }];
//!
//! let controller = ProjectController::builder(projects)
//!     .initial_query(QueryParams::parse("?filter=pinned&sort=mostStars&sortDir=asc"))
//!     .build();
//!
//! assert_eq!(controller.active_filter_ids(), ["pinned"]);
//! assert_eq!(controller.items().len(), 1);
//! ```

pub mod cache;
pub mod controller;
pub mod error;
pub mod layout;
pub mod portfolio;

// Re-export main types for convenience
pub use cache::{
    CacheConfig, CacheConfigBuilder, CacheEntry, CacheKey, CacheStats, FileStore, HttpClient,
    HttpResponse, KeyValueStore, MemoryStore, Method, RequestOptions, ReqwestClient,
    ResponseCache,
};
pub use controller::{
    Catalogue, ControllerConfig, FilterOption, FilterSortController, QueryParams, SortDirection,
    SortOption,
};
pub use error::{ErrorKind, Result, ShowcaseError, StorageError};
pub use layout::{solve, LayoutConstraints, LayoutResult};
pub use portfolio::{PortfolioStats, Project, ProjectController};
