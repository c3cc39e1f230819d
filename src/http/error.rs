//! HTTP-facing error type.
//!
//! Every error renders as `{"error": "..."}`. Storage failures are logged
//! with detail and answered with a generic message.

use axum::{
    extract::rejection::BytesRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::comments::{StoreError, ValidationError};

pub const SERVER_ERROR_MESSAGE: &str = "Server error";
pub const RATE_LIMITED_MESSAGE: &str = "Too many requests, please try again later.";
pub const TIMEOUT_MESSAGE: &str = "Request timeout";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("unauthorized")]
    Unauthorized,

    #[error("rate limited, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("request timed out")]
    Timeout,

    /// The request body could not be read, e.g. it exceeds the size limit.
    #[error("{message}")]
    Body { status: StatusCode, message: String },
}

impl From<BytesRejection> for AppError {
    fn from(rejection: BytesRejection) -> Self {
        AppError::Body {
            status: rejection.status(),
            message: rejection.body_text(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(err) => {
                (StatusCode::BAD_REQUEST, Json(json!({ "error": err.to_string() }))).into_response()
            }
            AppError::Unauthorized => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "error": "unauthorized" }))).into_response()
            }
            AppError::RateLimited { retry_after_secs } => {
                let mut response = (
                    StatusCode::TOO_MANY_REQUESTS,
                    Json(json!({ "error": RATE_LIMITED_MESSAGE })),
                )
                    .into_response();
                response
                    .headers_mut()
                    .insert(header::RETRY_AFTER, HeaderValue::from(retry_after_secs));
                response
            }
            AppError::Store(err) => {
                tracing::error!(error = %err, "Storage failure");
                server_error()
            }
            AppError::Timeout => (
                StatusCode::REQUEST_TIMEOUT,
                Json(json!({ "error": TIMEOUT_MESSAGE })),
            )
                .into_response(),
            AppError::Body { status, message } => {
                tracing::debug!(%status, error = %message, "Unreadable request body");
                (status, Json(json!({ "error": message }))).into_response()
            }
        }
    }
}

/// The generic 500 body shared by every unhandled failure.
pub fn server_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "error": SERVER_ERROR_MESSAGE })),
    )
        .into_response()
}
