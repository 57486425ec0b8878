//! Mapping of failures onto HTTP responses

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use showcase_core::error::{ErrorKind, ShowcaseError};
use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("no GitHub user given; pass ?user= or set GITHUB_USER")]
    MissingUser,

    #[error("invalid parameter `{name}`: {reason}")]
    InvalidParam { name: &'static str, reason: String },

    #[error(transparent)]
    Upstream(#[from] ShowcaseError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MissingUser | ApiError::InvalidParam { .. } => StatusCode::BAD_REQUEST,
            ApiError::Upstream(e) => match (e.kind(), e.status()) {
                (ErrorKind::AuthOrRateLimit, Some(429)) => StatusCode::TOO_MANY_REQUESTS,
                (ErrorKind::AuthOrRateLimit, _) => StatusCode::UNAUTHORIZED,
                (ErrorKind::NotFound, _) => StatusCode::NOT_FOUND,
                (ErrorKind::Other, _) => StatusCode::BAD_GATEWAY,
            },
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ApiError::MissingUser | ApiError::InvalidParam { .. } => "bad_request",
            ApiError::Upstream(e) => match e.kind() {
                ErrorKind::AuthOrRateLimit => "auth_or_rate_limit",
                ErrorKind::NotFound => "not_found",
                ErrorKind::Other => "other",
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            warn!("Request failed: {}", self);
        }
        let body = json!({ "error": self.to_string(), "kind": self.kind() });
        (status, Json(body)).into_response()
    }
}
