//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! optional TOML file (--config / COMMENTS_CONFIG)
//!     → loader.rs (parse & deserialize)
//!     → loader.rs (PORT, ORIGIN, ADMIN_TOKEN, MODERATION_ENABLED, ... overrides)
//!     → validation.rs (semantic checks)
//!     → ServerConfig (validated, immutable)
//!     → shared via Arc with handlers
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; changes require a restart
//! - All fields have defaults to allow running with no file at all
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{RateLimitConfig, ServerConfig};
