//! Comment records and their public projections.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A stored comment with every column, as returned to moderators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: i64,
    pub post: String,
    pub name: String,
    pub website: Option<String>,
    pub message: String,
    pub created_at: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub approved: bool,
}

/// The fields visitors may see. Client metadata and moderation state are omitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct PublicComment {
    pub id: i64,
    pub post: String,
    pub name: String,
    pub website: Option<String>,
    pub message: String,
    pub created_at: String,
}

/// A comment ready for insertion. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone)]
pub struct NewComment {
    pub post: String,
    pub name: String,
    pub website: Option<String>,
    pub message: String,
    pub ip: String,
    pub user_agent: String,
    pub approved: bool,
}

/// One page of approved comments for a post.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommentPage {
    pub items: Vec<PublicComment>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
}

/// Row shape of the `comments` table; `approved` is stored as 0/1.
#[derive(FromRow)]
pub(crate) struct SqlComment {
    pub id: i64,
    pub post: String,
    pub name: String,
    pub website: Option<String>,
    pub message: String,
    pub created_at: String,
    pub ip: Option<String>,
    pub user_agent: Option<String>,
    pub approved: i64,
}

impl From<SqlComment> for Comment {
    fn from(sql: SqlComment) -> Self {
        Comment {
            id: sql.id,
            post: sql.post,
            name: sql.name,
            website: sql.website,
            message: sql.message,
            created_at: sql.created_at,
            ip: sql.ip,
            user_agent: sql.user_agent,
            approved: sql.approved != 0,
        }
    }
}
