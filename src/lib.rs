//! Comment hosting backend library.

pub mod admin;
pub mod comments;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod public;
pub mod security;

pub use comments::CommentStore;
pub use config::ServerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
