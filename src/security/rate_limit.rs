//! Fixed-window rate limiting for comment submissions.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderMap, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use dashmap::DashMap;

use crate::config::RateLimitConfig;
use crate::http::error::AppError;
use crate::observability::metrics;
use crate::security::headers::client_ip;

/// Request count for one client within the current window.
#[derive(Debug, Clone, Copy)]
struct Window {
    started: Instant,
    count: u32,
}

impl Window {
    fn new(now: Instant) -> Self {
        Self { started: now, count: 0 }
    }

    fn is_expired(&self, now: Instant, length: Duration) -> bool {
        now.duration_since(self.started) >= length
    }
}

/// Outcome of a rate limit check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allowed { remaining: u32 },
    Limited { retry_after: Duration },
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allowed { .. })
    }
}

/// Per-client fixed-window counter.
///
/// Every call counts, including rejected ones. State lives in memory only.
pub struct RateLimiter {
    windows: DashMap<String, Window>,
    window: Duration,
    max_requests: u32,
    max_tracked_clients: usize,
    trust_forwarded_for: bool,
}

impl RateLimiter {
    pub fn new(config: &RateLimitConfig) -> Self {
        Self {
            windows: DashMap::new(),
            window: Duration::from_secs(config.window_secs),
            max_requests: config.max_requests,
            max_tracked_clients: config.max_tracked_clients,
            trust_forwarded_for: config.trust_forwarded_for,
        }
    }

    /// The key a request is metered under: the peer IP, or the forwarded
    /// client address when `trust_forwarded_for` is set.
    pub fn client_key(&self, headers: &HeaderMap, peer: SocketAddr) -> String {
        if self.trust_forwarded_for {
            client_ip(headers, Some(peer))
        } else {
            peer.ip().to_string()
        }
    }

    /// Count a request from `key` and report whether it may proceed.
    pub fn admit(&self, key: &str) -> bool {
        self.check_at(key, Instant::now()).is_allowed()
    }

    /// Count a request from `key` and return the full decision, including
    /// how long until the window resets when limited.
    pub fn check(&self, key: &str) -> Decision {
        self.check_at(key, Instant::now())
    }

    pub fn check_at(&self, key: &str, now: Instant) -> Decision {
        if !self.windows.contains_key(key) && self.windows.len() >= self.max_tracked_clients {
            self.purge_expired_at(now);
        }

        // The entry guard holds the shard lock, so increment-and-compare is atomic per key.
        let mut entry = self
            .windows
            .entry(key.to_string())
            .or_insert_with(|| Window::new(now));

        if entry.is_expired(now, self.window) {
            *entry = Window::new(now);
        }
        entry.count = entry.count.saturating_add(1);

        if entry.count <= self.max_requests {
            Decision::Allowed {
                remaining: self.max_requests - entry.count,
            }
        } else {
            let reset_at = entry.started + self.window;
            Decision::Limited {
                retry_after: reset_at.saturating_duration_since(now),
            }
        }
    }

    /// Drop windows that have elapsed.
    pub fn purge_expired(&self) {
        self.purge_expired_at(Instant::now());
    }

    fn purge_expired_at(&self, now: Instant) {
        let before = self.windows.len();
        self.windows.retain(|_, w| !w.is_expired(now, self.window));
        let purged = before.saturating_sub(self.windows.len());
        if purged > 0 {
            tracing::debug!(purged, remaining = self.windows.len(), "Purged expired rate limit windows");
        }
    }

    /// Number of clients currently tracked.
    pub fn tracked_clients(&self) -> usize {
        self.windows.len()
    }
}

/// Middleware that meters requests per client address.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let key = limiter.client_key(request.headers(), addr);

    match limiter.check(&key) {
        Decision::Allowed { .. } => next.run(request).await,
        Decision::Limited { retry_after } => {
            tracing::warn!(client = %key, retry_after_secs = retry_after.as_secs(), "Rate limit exceeded");
            metrics::record_rate_limited();
            AppError::RateLimited {
                retry_after_secs: retry_after.as_secs().max(1),
            }
            .into_response()
        }
    }
}
