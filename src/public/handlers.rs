use std::net::SocketAddr;

use axum::{
    body::Bytes,
    extract::{
        rejection::{BytesRejection, QueryRejection},
        ConnectInfo, Query, State,
    },
    http::{HeaderMap, StatusCode},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::comments::sanitize::escape;
use crate::comments::store::DEFAULT_PAGE_SIZE;
use crate::comments::validation::normalize_post;
use crate::comments::{validate_submission, CommentPage, NewComment, Submission};
use crate::http::error::AppError;
use crate::http::request::json_object;
use crate::http::server::AppState;
use crate::observability::metrics;
use crate::security::headers::{client_ip, user_agent};

/// Raw query string for the listing endpoint. Numbers are parsed leniently.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub post: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitResponse {
    pub ok: bool,
    pub approved: bool,
}

pub async fn list_comments(
    State(state): State<AppState>,
    params: Result<Query<ListParams>, QueryRejection>,
) -> Result<Json<CommentPage>, AppError> {
    // A query string that does not decode lists with the defaults.
    let params = params
        .map(|Query(params)| params)
        .inspect_err(|err| tracing::debug!(error = %err, "Ignoring malformed query string"))
        .unwrap_or_default();

    let post = normalize_post(params.post.as_deref().unwrap_or_default());
    let page = params.page.as_deref().and_then(parse_int_prefix).unwrap_or(1);
    let limit = params
        .limit
        .as_deref()
        .and_then(parse_int_prefix)
        .unwrap_or(DEFAULT_PAGE_SIZE);

    let page = state.store.query_approved(&post, page, limit).await?;
    Ok(Json(page))
}

pub async fn submit_comment(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<SubmitResponse>), AppError> {
    let body = body?;
    // Anything but a JSON object is treated as an empty submission.
    let submission: Submission = json_object(&headers, &body);

    let fields = validate_submission(&submission).inspect_err(|err| {
        tracing::debug!(reason = %err, "Rejected comment");
        metrics::record_rejected(err.reason());
    })?;

    let approved = state.config.auto_approve();
    let comment = NewComment {
        post: fields.post,
        name: escape(&fields.name),
        website: fields.website,
        message: escape(&fields.message),
        ip: client_ip(&headers, Some(addr)),
        user_agent: user_agent(&headers),
        approved,
    };

    let id = state.store.insert(&comment).await?;
    tracing::info!(id, post = %comment.post, approved, "Comment created");
    metrics::record_submitted(approved);

    Ok((StatusCode::CREATED, Json(SubmitResponse { ok: true, approved })))
}

/// Leading-integer parse: optional sign then digits, trailing text ignored.
/// Values too large for `i64` saturate.
pub(crate) fn parse_int_prefix(raw: &str) -> Option<i64> {
    let s = raw.trim_start();
    let (negative, rest) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };

    let digits_len = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits_len == 0 {
        return None;
    }

    let value = rest[..digits_len].parse::<i64>().unwrap_or(i64::MAX);
    Some(if negative { -value } else { value })
}
