//! Request identification and tracing spans.
//!
//! # Responsibilities
//! - Assign a UUID v4 `x-request-id` to every request lacking one
//! - Echo the id on the response
//! - Open one tracing span per request carrying method, path and id
//! - Decode JSON object bodies leniently
//!
//! # Design Decisions
//! - Request ID added as the outermost layer so every later log line sees it

use axum::{
    body::Body,
    http::{header, HeaderMap, Request},
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tracing::Span;

pub const X_REQUEST_ID: &str = "x-request-id";

pub fn set_request_id_layer() -> SetRequestIdLayer<MakeRequestUuid> {
    SetRequestIdLayer::x_request_id(MakeRequestUuid)
}

pub fn propagate_request_id_layer() -> PropagateRequestIdLayer {
    PropagateRequestIdLayer::x_request_id()
}

/// Span factory for `TraceLayer`.
pub fn request_span(request: &Request<Body>) -> Span {
    let request_id = request
        .headers()
        .get(X_REQUEST_ID)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "request",
        method = %request.method(),
        path = %request.uri().path(),
        request_id = %request_id,
    )
}

/// Whether the request declares a JSON body. Parameters such as `charset`
/// are ignored.
pub fn is_json_content_type(headers: &HeaderMap) -> bool {
    headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .is_some_and(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
}

/// Decode a JSON object body into `T`.
///
/// Bodies that are not `application/json`, do not parse, or are not an
/// object (arrays included) decode as `T::default()`.
pub fn json_object<T: DeserializeOwned + Default>(headers: &HeaderMap, body: &[u8]) -> T {
    if !is_json_content_type(headers) {
        return T::default();
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_default(),
        _ => T::default(),
    }
}
