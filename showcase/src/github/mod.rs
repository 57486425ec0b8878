//! GitHub as the project source

pub mod client;
pub mod transform;
pub mod types;

pub use client::GithubClient;
pub use types::{GithubRepo, GithubUser};

use crate::config::AppConfig;
use anyhow::Result;
use showcase_core::cache::{FileStore, ReqwestClient, ResponseCache};
use std::sync::Arc;

/// Client backed by the on-disk cache and a real HTTP client
pub fn client_from_config(config: &AppConfig) -> Result<GithubClient> {
    let cache = ResponseCache::new(config.cache_config(), Arc::new(FileStore::new(&config.cache.dir)));
    let http = ReqwestClient::new(config.request_timeout())?;
    Ok(GithubClient::new(cache, Arc::new(http), &config.github.api_url)
        .with_token(config.github.token.clone()))
}
