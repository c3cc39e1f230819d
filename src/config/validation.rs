//! Configuration validation.
//!
//! Semantic checks that serde cannot express. All errors are collected
//! rather than stopping at the first one.

use std::fmt;

use crate::config::schema::{ServerConfig, PLACEHOLDER_ADMIN_TOKEN};

/// A single semantic problem with the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();
    let mut fail = |field, message: &str| {
        errors.push(ValidationError {
            field,
            message: message.to_string(),
        })
    };

    if config.port == 0 {
        fail("port", "must be non-zero");
    }
    if config.admin_token.is_empty() {
        fail("admin_token", "must not be empty");
    }
    if config.database_url.trim().is_empty() {
        fail("database_url", "must not be empty");
    }
    if config.origin.trim().is_empty() {
        fail("origin", "must not be empty");
    }
    if config.max_body_bytes == 0 {
        fail("max_body_bytes", "must be greater than zero");
    }
    if config.request_timeout_secs == 0 {
        fail("request_timeout_secs", "must be greater than zero");
    }
    if config.rate_limit.window_secs == 0 {
        fail("rate_limit.window_secs", "must be greater than zero");
    }
    if config.rate_limit.max_requests == 0 {
        fail("rate_limit.max_requests", "must be greater than zero");
    }
    if config.rate_limit.max_tracked_clients == 0 {
        fail("rate_limit.max_tracked_clients", "must be greater than zero");
    }
    if let Some(addr) = &config.metrics_address {
        if addr.parse::<std::net::SocketAddr>().is_err() {
            fail("metrics_address", "must be a socket address");
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// True when the admin token is still the shipped placeholder.
pub fn uses_placeholder_token(config: &ServerConfig) -> bool {
    config.admin_token == PLACEHOLDER_ADMIN_TOKEN
}
