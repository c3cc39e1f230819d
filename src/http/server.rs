//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router from the public and admin sub-routers
//! - Wire up middleware (request ID, tracing, panics, CORS, body limit, timeout)
//! - Serve on a bound listener until shutdown is signalled

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    error_handling::HandleErrorLayer,
    extract::DefaultBodyLimit,
    http::{header, HeaderValue, Method},
    response::{IntoResponse, Response},
    BoxError, Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::{
    timeout::{error::Elapsed, TimeoutLayer},
    ServiceBuilder,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, Any as AnyOrigin, CorsLayer},
    trace::TraceLayer,
};

use crate::admin::setup_admin_router;
use crate::comments::CommentStore;
use crate::config::ServerConfig;
use crate::http::error::{server_error, AppError};
use crate::http::request::{propagate_request_id_layer, request_span, set_request_id_layer};
use crate::public::setup_public_router;
use crate::security::RateLimiter;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: CommentStore,
    pub limiter: Arc<RateLimiter>,
    pub config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig, store: CommentStore) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::new(&config.rate_limit)),
            store,
            config: Arc::new(config),
        }
    }
}

/// HTTP server for the comment API.
pub struct HttpServer {
    router: Router,
    state: AppState,
}

impl HttpServer {
    /// Create a server around an initialized store.
    pub fn new(config: ServerConfig, store: CommentStore) -> Self {
        let state = AppState::new(config, store);
        let router = build_router(state.clone());
        Self { router, state }
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Run the server until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// Build the Axum router with all middleware layers.
///
/// The body limit is enforced by the body extractors, which turn an oversized
/// body into a JSON error like every other failure.
pub fn build_router(state: AppState) -> Router {
    let config = state.config.clone();

    Router::new()
        .merge(setup_public_router(state.clone()))
        .merge(setup_admin_router(state))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(
            ServiceBuilder::new()
                .layer(set_request_id_layer())
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(propagate_request_id_layer())
                .layer(CatchPanicLayer::custom(handle_panic))
                .layer(cors_layer(&config.origin))
                .layer(HandleErrorLayer::new(handle_layer_error))
                .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs))),
        )
}

fn cors_layer(origin: &str) -> CorsLayer {
    let allow_origin = if origin == "*" {
        AllowOrigin::from(AnyOrigin)
    } else {
        match HeaderValue::from_str(origin) {
            Ok(value) => AllowOrigin::exact(value),
            Err(_) => {
                tracing::error!(origin = %origin, "Invalid CORS origin, cross-origin requests disabled");
                AllowOrigin::list(Vec::<HeaderValue>::new())
            }
        }
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
}

async fn handle_layer_error(err: BoxError) -> Response {
    if err.is::<Elapsed>() {
        tracing::warn!("Request timed out");
        AppError::Timeout.into_response()
    } else {
        tracing::error!(error = %err, "Unhandled middleware error");
        server_error()
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = %detail, "Handler panicked");
    server_error()
}
