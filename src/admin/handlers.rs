use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, State},
    http::HeaderMap,
    Json,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::comments::store::ADMIN_LIST_LIMIT;
use crate::comments::Comment;
use crate::http::error::AppError;
use crate::http::request::json_object;
use crate::http::server::AppState;
use crate::observability::metrics;

#[derive(Serialize, Deserialize)]
pub struct CommentList {
    pub items: Vec<Comment>,
}

#[derive(Serialize, Deserialize)]
pub struct Ack {
    pub ok: bool,
}

#[derive(Default, Deserialize)]
struct IdBody {
    #[serde(default)]
    id: Option<Value>,
}

pub async fn list_all(State(state): State<AppState>) -> Result<Json<CommentList>, AppError> {
    let items = state.store.list_all(ADMIN_LIST_LIMIT).await?;
    metrics::record_admin_action("list");
    Ok(Json(CommentList { items }))
}

pub async fn approve(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Ack>, AppError> {
    if let Some(id) = body_id(&headers, &body?) {
        let changed = state.store.approve(id).await?;
        tracing::info!(id, changed, "Comment approved");
    }
    metrics::record_admin_action("approve");
    Ok(Json(Ack { ok: true }))
}

pub async fn delete(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<Ack>, AppError> {
    if let Some(id) = body_id(&headers, &body?) {
        let changed = state.store.delete(id).await?;
        tracing::info!(id, changed, "Comment deleted");
    }
    metrics::record_admin_action("delete");
    Ok(Json(Ack { ok: true }))
}

/// The `id` from a JSON object body, as an integer or a numeric string.
/// Anything else matches no row, so the operation becomes a no-op.
fn body_id(headers: &HeaderMap, body: &[u8]) -> Option<i64> {
    let parsed: IdBody = json_object(headers, body);
    match parsed.id? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
