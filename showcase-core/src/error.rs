//! Error types for showcase operations
//!
//! Only the absence of any usable data surfaces as an error. Storage faults
//! are reported through [`StorageError`] and stay inside the cache.

use thiserror::Error;

/// Main error type for showcase operations
#[derive(Error, Debug)]
pub enum ShowcaseError {
    /// Upstream answered with a non-2xx status and no fallback was cached
    #[error("HTTP {status} from {url}")]
    Http { status: u16, url: String },

    /// Network/transport failure before a status was received
    #[error("Transport error: {0}")]
    Transport(String),

    /// Serialization/Deserialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Storage backend error (only surfaced by storage adapters themselves)
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

/// Coarse classification used by the presentation layer to pick a remediation
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// 401/403/429: a token would help
    AuthOrRateLimit,
    /// 404
    NotFound,
    Other,
}

impl ShowcaseError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            ShowcaseError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self.status() {
            Some(401) | Some(403) | Some(429) => ErrorKind::AuthOrRateLimit,
            Some(404) => ErrorKind::NotFound,
            _ => ErrorKind::Other,
        }
    }

    pub fn is_auth_or_rate_limit(&self) -> bool {
        self.kind() == ErrorKind::AuthOrRateLimit
    }
}

/// Failure inside a key/value storage backend
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("corrupt entry for key `{key}`: {reason}")]
    Corrupt { key: String, reason: String },
}

/// Result type alias for showcase operations
pub type Result<T> = std::result::Result<T, ShowcaseError>;

impl From<String> for ShowcaseError {
    fn from(s: String) -> Self {
        ShowcaseError::Other(s)
    }
}

impl From<&str> for ShowcaseError {
    fn from(s: &str) -> Self {
        ShowcaseError::Other(s.to_string())
    }
}

impl From<serde_json::Error> for ShowcaseError {
    fn from(e: serde_json::Error) -> Self {
        ShowcaseError::Serialization(e.to_string())
    }
}
