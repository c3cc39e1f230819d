//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, shared layers)
//!     → request.rs (request ID, tracing span)
//!     → public / admin routers
//!     → error.rs (AppError → JSON error body)
//!     → Send to client
//! ```

pub mod error;
pub mod request;
pub mod server;

pub use error::AppError;
pub use request::X_REQUEST_ID;
pub use server::{build_router, AppState, HttpServer};
