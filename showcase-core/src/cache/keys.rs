//! Request descriptions and the cache keys derived from them

use crate::cache::types::CacheKey;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// HTTP method of an outbound request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    Get,
    Head,
    Post,
    Put,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Head => "HEAD",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }

    /// Verbs whose body identifies the resource being requested
    pub fn is_mutating(&self) -> bool {
        matches!(self, Method::Post | Method::Put | Method::Patch | Method::Delete)
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Options of an outbound request
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestOptions {
    pub method: Method,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl RequestOptions {
    /// Plain GET
    pub fn get() -> Self {
        Self::default()
    }

    /// POST with a JSON body
    pub fn post_json(body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: Some(body.into()),
        }
    }

    /// Add a header
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Add an `Authorization: Bearer` header
    pub fn bearer(self, token: &str) -> Self {
        self.header("Authorization", format!("Bearer {}", token))
    }

    /// Whether an `Authorization` header is present (its value is never inspected)
    pub fn has_auth(&self) -> bool {
        self.headers
            .iter()
            .any(|(name, _)| name.eq_ignore_ascii_case("authorization"))
    }

    /// Requests that may share a cached response with their alternate-auth twin
    pub fn allows_alternate_auth(&self) -> bool {
        self.method == Method::Get || self.body.is_none()
    }
}

/// Normalized identity of a request for caching purposes
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    pub method: Method,
    pub url: String,
    pub authenticated: bool,
    pub body_digest: Option<String>,
}

impl RequestKey {
    /// Derive the key of a request. Only the presence of auth is recorded.
    pub fn from_request(url: &str, options: &RequestOptions, digest_len: usize) -> Self {
        let body_digest = match (&options.body, options.method.is_mutating()) {
            (Some(body), true) => {
                let digest = hex::encode(Sha256::digest(body.as_bytes()));
                Some(digest[..digest_len.min(digest.len())].to_string())
            }
            _ => None,
        };

        Self {
            method: options.method,
            url: url.to_string(),
            authenticated: options.has_auth(),
            body_digest,
        }
    }

    /// Same request with the opposite auth presence
    pub fn alternate(&self) -> Self {
        Self {
            authenticated: !self.authenticated,
            ..self.clone()
        }
    }

    /// Storage key with the given prefix
    pub fn render(&self, prefix: &str) -> CacheKey {
        let auth = if self.authenticated { "auth" } else { "anon" };
        let mut key = format!("{}{} {} [{}]", prefix, self.method, self.url, auth);
        if let Some(digest) = &self.body_digest {
            key.push('#');
            key.push_str(digest);
        }
        key
    }
}
