//! Admin bearer-token check.

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::Response,
};

use crate::http::error::AppError;
use crate::http::server::AppState;
use crate::observability::metrics;

/// Reject the request unless `Authorization` is exactly `Bearer <admin_token>`.
pub async fn admin_auth_middleware(
    State(state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, AppError> {
    let auth_header = request
        .headers()
        .get(header::AUTHORIZATION)
        .map(|h| h.as_bytes())
        .unwrap_or_default();

    let expected = format!("Bearer {}", state.config.admin_token);
    if constant_time_eq(auth_header, expected.as_bytes()) {
        return Ok(next.run(request).await);
    }

    tracing::warn!(
        path = %request.uri().path(),
        header_present = !auth_header.is_empty(),
        "Rejected admin request"
    );
    metrics::record_admin_unauthorized();
    Err(AppError::Unauthorized)
}

/// Compare without short-circuiting on the first differing byte.
/// Only the length is revealed by timing.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
