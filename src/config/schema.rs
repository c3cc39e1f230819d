//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML, and every
//! field has a default so an empty file (or no file) is a valid config.

use serde::{Deserialize, Serialize};

/// Placeholder admin token. Accepted, but startup warns about it.
pub const PLACEHOLDER_ADMIN_TOKEN: &str = "change-me";

/// Root configuration for the comment server.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind.
    pub bind_host: String,

    /// TCP port (`PORT`).
    pub port: u16,

    /// CORS allowed origin; `*` allows any (`ORIGIN`).
    pub origin: String,

    /// Shared secret for the admin API (`ADMIN_TOKEN`).
    pub admin_token: String,

    /// When set, new comments start pending (`MODERATION_ENABLED`).
    pub moderation_enabled: bool,

    /// SQLite connection URL (`DATABASE_URL`).
    pub database_url: String,

    /// Maximum accepted request body size.
    pub max_body_bytes: usize,

    /// Per-request timeout.
    pub request_timeout_secs: u64,

    /// Submission rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Optional Prometheus listener, e.g. "127.0.0.1:9000" (`METRICS_ADDRESS`).
    pub metrics_address: Option<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_host: "0.0.0.0".to_string(),
            port: 3000,
            origin: "*".to_string(),
            admin_token: PLACEHOLDER_ADMIN_TOKEN.to_string(),
            moderation_enabled: false,
            database_url: "sqlite://comments.db".to_string(),
            max_body_bytes: 32 * 1024,
            request_timeout_secs: 30,
            rate_limit: RateLimitConfig::default(),
            metrics_address: None,
        }
    }
}

impl ServerConfig {
    /// `host:port` for the listener.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.bind_host, self.port)
    }

    /// Whether a new comment is visible without moderation.
    pub fn auto_approve(&self) -> bool {
        !self.moderation_enabled
    }
}

/// Rate limiting configuration for the submit path.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Window length in seconds.
    pub window_secs: u64,

    /// Requests allowed per client per window.
    pub max_requests: u32,

    /// Tracked clients before stale windows are purged.
    pub max_tracked_clients: usize,

    /// Key clients by the first `X-Forwarded-For` hop instead of the peer
    /// address. Only enable behind a proxy that overwrites the header.
    pub trust_forwarded_for: bool,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            window_secs: 60,
            max_requests: 10,
            max_tracked_clients: 10_000,
            trust_forwarded_for: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ServerConfig = toml::from_str(
            r#"
            port = 8080
            moderation_enabled = true

            [rate_limit]
            max_requests = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.port, 8080);
        assert!(config.moderation_enabled);
        assert!(!config.auto_approve());
        assert_eq!(config.rate_limit.max_requests, 3);
        assert_eq!(config.rate_limit.window_secs, 60);
        assert!(!config.rate_limit.trust_forwarded_for);
        assert_eq!(config.origin, "*");
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }
}
