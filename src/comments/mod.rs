//! Comment domain: records, validation, escaping and persistence.
//!
//! # Data Flow
//! ```text
//! Submission (raw JSON fields)
//!     → validation.rs (honeypot, required, lengths, website scheme)
//!     → sanitize.rs (escape name and message)
//!     → store.rs (insert with approval policy)
//!
//! Listing:
//!     store.rs query_approved (post, page, limit) → PublicComment page
//! ```

pub mod model;
pub mod sanitize;
pub mod store;
pub mod validation;

pub use model::{Comment, CommentPage, NewComment, PublicComment};
pub use store::{CommentStore, StoreError};
pub use validation::{validate_submission, NormalizedSubmission, Submission, ValidationError};
