//! Comment server.
//!
//! A small comment-hosting backend built with Tokio, Axum and SQLite.
//!
//! # Architecture Overview
//!
//! ```text
//!   GET  /api/comments ──────────────────────────────▶ store.query_approved
//!   POST /api/comments ─▶ rate limit ─▶ validate ─▶ escape ─▶ store.insert
//!   /api/admin/*       ─▶ bearer token ─────────────▶ store.list_all / approve / delete
//! ```
//!
//! Configuration comes from an optional TOML file (`--config` or
//! `COMMENTS_CONFIG`) overlaid with `PORT`, `ORIGIN`, `ADMIN_TOKEN`,
//! `MODERATION_ENABLED`, `DATABASE_URL` and `METRICS_ADDRESS`.

use std::path::PathBuf;

use clap::Parser;

use comment_server::config::{load_config, loader::CONFIG_PATH_ENV};
use comment_server::lifecycle::{start, Shutdown};
use comment_server::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "comment-server", version, about = "Comment hosting backend")]
struct Args {
    /// Optional TOML configuration file.
    #[arg(short, long, env = CONFIG_PATH_ENV)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging();
    let args = Args::parse();

    tracing::info!("comment-server v{} starting", env!("CARGO_PKG_VERSION"));

    let config = load_config(args.config.as_deref())?;
    tracing::info!(
        bind_address = %config.bind_address(),
        origin = %config.origin,
        moderation_enabled = config.moderation_enabled,
        "Configuration loaded"
    );

    let (server, listener) = start(config).await?;
    tracing::info!(address = %listener.local_addr()?, "API listening");

    let shutdown = Shutdown::new();
    shutdown.trigger_on_signal();

    let store = server.state().store.clone();
    server.run(listener, shutdown.subscribe()).await?;
    store.close().await;

    tracing::info!("Shutdown complete");
    Ok(())
}
