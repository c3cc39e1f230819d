//! Metrics collection and exposition.
//!
//! # Metrics
//! - `comments_submitted_total` (counter): stored comments, by `approved`
//! - `comments_rejected_total` (counter): failed validation, by `reason`
//! - `comments_rate_limited_total` (counter): submissions refused by the limiter
//! - `comments_admin_actions_total` (counter): admin calls, by `action`
//! - `comments_admin_unauthorized_total` (counter): bad or missing admin credentials
//!
//! Without an installed recorder every call is a no-op.

use std::net::SocketAddr;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape listener on `addr`.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Prometheus metrics exporter listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install Prometheus exporter"),
    }
}

pub fn record_submitted(approved: bool) {
    ::metrics::counter!("comments_submitted_total", "approved" => approved.to_string()).increment(1);
}

pub fn record_rejected(reason: &'static str) {
    ::metrics::counter!("comments_rejected_total", "reason" => reason).increment(1);
}

pub fn record_rate_limited() {
    ::metrics::counter!("comments_rate_limited_total").increment(1);
}

pub fn record_admin_action(action: &'static str) {
    ::metrics::counter!("comments_admin_actions_total", "action" => action).increment(1);
}

pub fn record_admin_unauthorized() {
    ::metrics::counter!("comments_admin_unauthorized_total").increment(1);
}
