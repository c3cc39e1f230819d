//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! POST /api/comments:
//!     → rate_limit.rs (fixed window per client address)
//!     → handler
//! ```
//!
//! headers.rs resolves the client address used both as the rate limit key
//! and as the stored `ip` column.

pub mod headers;
pub mod rate_limit;

pub use rate_limit::{Decision, RateLimiter};
