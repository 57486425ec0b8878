//! Token pass-through middleware for Axum

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

/// Caller-supplied GitHub token, forwarded upstream unchanged
#[derive(Debug, Clone, Default)]
pub struct ForwardedToken(pub Option<String>);

/// Token from an `Authorization: Bearer <token>` header
pub fn extract_bearer_token(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return None;
    }
    Some(token.to_string())
}

/// Store the caller's bearer token (if any) in the request extensions.
/// The token is never validated here.
pub async fn forward_token(mut request: Request, next: Next) -> Response {
    let token = extract_bearer_token(request.headers());
    request.extensions_mut().insert(ForwardedToken(token));
    next.run(request).await
}
