//! Startup orchestration.
//!
//! Order: store (schema created) → metrics exporter → listener. The socket is
//! only bound once the `comments` table exists, so no request can arrive
//! before storage is ready. Any failure is fatal.

use std::net::SocketAddr;

use thiserror::Error;
use tokio::net::TcpListener;

use crate::comments::{CommentStore, StoreError};
use crate::config::validation::uses_placeholder_token;
use crate::config::ServerConfig;
use crate::http::HttpServer;
use crate::observability::metrics;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("storage initialization failed: {0}")]
    Store(#[from] StoreError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
}

/// Open storage and bind the listener. Returns the server ready to run.
pub async fn start(config: ServerConfig) -> Result<(HttpServer, TcpListener), StartupError> {
    if uses_placeholder_token(&config) {
        tracing::warn!("ADMIN_TOKEN is the placeholder value; set it before deploying");
    }

    let store = CommentStore::connect(&config.database_url).await?;
    tracing::info!(database_url = %config.database_url, "Comment store ready");

    if let Some(addr) = config.metrics_address.as_deref() {
        match addr.parse::<SocketAddr>() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let address = config.bind_address();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address: address.clone(), source })?;

    Ok((HttpServer::new(config, store), listener))
}
