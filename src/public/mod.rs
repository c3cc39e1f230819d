//! Public comment API: listing approved comments and submitting new ones.

pub mod handlers;

use axum::{middleware, routing::post, Router};

use self::handlers::*;
use crate::http::server::AppState;
use crate::security::rate_limit::rate_limit_middleware;

pub fn setup_public_router(state: AppState) -> Router {
    // route_layer only wraps methods registered before it, so reads stay unmetered.
    let comments = post(submit_comment)
        .route_layer(middleware::from_fn_with_state(
            state.limiter.clone(),
            rate_limit_middleware,
        ))
        .get(list_comments);

    Router::new()
        .route("/api/comments", comments)
        .with_state(state)
}
