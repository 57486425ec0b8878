//! Cache-first HTTP fetching with stale fallback
//!
//! The upstream API has a low anonymous rate limit. A response cached under
//! either auth mode, fresh or expired, is preferred over a visible failure.

use crate::cache::{
    keys::{Method, RequestKey, RequestOptions},
    store::{ReadMode, ResponseCache},
};
use crate::error::{Result, ShowcaseError};
use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Raw response from the HTTP collaborator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parse the body as JSON
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        Ok(serde_json::from_slice(&self.body)?)
    }
}

/// Outbound HTTP capability. Implementations must not retry or cache.
#[async_trait]
pub trait HttpClient: Send + Sync {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse>;
}

/// [`HttpClient`] backed by reqwest
#[derive(Debug, Clone)]
pub struct ReqwestClient {
    client: reqwest::Client,
}

impl ReqwestClient {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("showcase/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| ShowcaseError::Config(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl HttpClient for ReqwestClient {
    async fn send(&self, url: &str, options: &RequestOptions) -> Result<HttpResponse> {
        let method = match options.method {
            Method::Get => reqwest::Method::GET,
            Method::Head => reqwest::Method::HEAD,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Patch => reqwest::Method::PATCH,
            Method::Delete => reqwest::Method::DELETE,
        };

        let mut request = self.client.request(method, url);
        for (name, value) in &options.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &options.body {
            request = request.body(body.clone());
        }

        let response = request
            .send()
            .await
            .map_err(|e| ShowcaseError::Transport(e.to_string()))?;
        let status = response.status().as_u16();
        let body = response
            .bytes()
            .await
            .map_err(|e| ShowcaseError::Transport(e.to_string()))?;

        Ok(HttpResponse::new(status, body.to_vec()))
    }
}

impl ResponseCache {
    /// Fetch `url` through the cache.
    ///
    /// Order: fresh entry under the request key; fresh entry under the
    /// opposite auth-presence key (bodiless or GET requests only); network.
    /// A failed or non-2xx fetch falls back to the opposite-auth entry and
    /// then the request's own entry, expired ones included. Only when none
    /// exist does the error propagate.
    pub async fn cached_fetch<T, C>(
        &self,
        client: &C,
        url: &str,
        options: &RequestOptions,
        ttl: Duration,
    ) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        C: HttpClient + ?Sized,
    {
        let request_key = RequestKey::from_request(url, options, self.config.body_digest_len);
        let key = request_key.render("");
        let alternate_key = request_key.alternate().render("");

        // Probes leave expired entries in place; they are the fallback
        if let Some(entry) = self.read::<T>(&key, ReadMode::Peek, true).await {
            return Ok(entry.data);
        }

        if self.config.enable_alternate_auth && options.allows_alternate_auth() {
            if let Some(entry) = self.read::<T>(&alternate_key, ReadMode::Peek, false).await {
                debug!("Serving {} from alternate-auth cache entry", url);
                self.record(|s| s.alternate_hits += 1).await;
                return Ok(entry.data);
            }
        }

        self.record(|s| s.network_fetches += 1).await;
        let error = match client.send(url, options).await {
            Ok(response) if response.is_success() => match response.json::<T>() {
                Ok(data) => {
                    self.set(&key, &data, ttl).await;
                    return Ok(data);
                }
                Err(e) => e,
            },
            Ok(response) => ShowcaseError::Http {
                status: response.status,
                url: url.to_string(),
            },
            Err(e) => e,
        };

        if self.config.enable_stale_fallback {
            for fallback in [&alternate_key, &key] {
                if let Some(entry) = self.read::<T>(fallback, ReadMode::AllowExpired, false).await {
                    warn!(
                        "Fetching {} failed ({}); serving cached response {}s old",
                        url,
                        error,
                        entry.age().as_secs()
                    );
                    self.record(|s| s.fallbacks += 1).await;
                    return Ok(entry.data);
                }
            }
        }

        warn!("Fetching {} failed with no cached fallback: {}", url, error);
        Err(error)
    }
}
