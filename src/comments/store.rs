//! SQLite-backed comment store.
//!
//! The schema is created by [`CommentStore::init`], which runs before the
//! server binds. Ids come from `AUTOINCREMENT`, so they strictly increase and
//! are never reused, even after deletes.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use thiserror::Error;

use crate::comments::model::{Comment, CommentPage, NewComment, PublicComment, SqlComment};

pub const MAX_PAGE_SIZE: i64 = 50;
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const ADMIN_LIST_LIMIT: i64 = 500;

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS comments (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    post TEXT NOT NULL,
    name TEXT NOT NULL,
    website TEXT,
    message TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now')),
    ip TEXT,
    user_agent TEXT,
    approved INTEGER NOT NULL DEFAULT 1
)";

const CREATE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS comments_post_approved ON comments (post, approved, id)";

/// Errors raised by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Handle to the `comments` table. Cheap to clone; clones share the pool.
#[derive(Clone)]
pub struct CommentStore {
    pool: SqlitePool,
}

impl CommentStore {
    /// Open (creating if needed) the database at `url` and ensure the schema exists.
    pub async fn connect(url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// A private in-memory database, used by tests.
    ///
    /// Pinned to one connection that is never recycled, since each SQLite
    /// in-memory connection is its own database.
    pub async fn connect_in_memory() -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str("sqlite::memory:")?;
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(options)
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    /// Create the table and index if they are missing. Never drops data.
    pub async fn init(&self) -> Result<(), StoreError> {
        sqlx::query(CREATE_TABLE).execute(&self.pool).await?;
        sqlx::query(CREATE_INDEX).execute(&self.pool).await?;
        Ok(())
    }

    /// Insert a comment and return its new id.
    pub async fn insert(&self, comment: &NewComment) -> Result<i64, StoreError> {
        let result = sqlx::query(
            "INSERT INTO comments (post, name, website, message, ip, user_agent, approved)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&comment.post)
        .bind(&comment.name)
        .bind(&comment.website)
        .bind(&comment.message)
        .bind(&comment.ip)
        .bind(&comment.user_agent)
        .bind(comment.approved as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.last_insert_rowid())
    }

    /// Approved comments for `post`, newest first.
    ///
    /// `page` is clamped to at least 1 and `limit` to `1..=50`. `total` counts
    /// every approved comment for the post regardless of the page requested.
    pub async fn query_approved(
        &self,
        post: &str,
        page: i64,
        limit: i64,
    ) -> Result<CommentPage, StoreError> {
        let page = page.max(1);
        let limit = limit.clamp(1, MAX_PAGE_SIZE);
        let offset = (page - 1).saturating_mul(limit);

        // Count and slice from the same snapshot.
        let mut tx = self.pool.begin().await?;

        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post = ? AND approved = 1")
                .bind(post)
                .fetch_one(&mut *tx)
                .await?;

        let items = sqlx::query_as::<_, PublicComment>(
            "SELECT id, post, name, website, message, created_at FROM comments
             WHERE post = ? AND approved = 1 ORDER BY id DESC LIMIT ? OFFSET ?",
        )
        .bind(post)
        .bind(limit)
        .bind(offset)
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(CommentPage {
            items,
            total,
            page,
            limit,
        })
    }

    /// The most recent comments of any state, newest first.
    pub async fn list_all(&self, limit: i64) -> Result<Vec<Comment>, StoreError> {
        let rows = sqlx::query_as::<_, SqlComment>(
            "SELECT id, post, name, website, message, created_at, ip, user_agent, approved
             FROM comments ORDER BY id DESC LIMIT ?",
        )
        .bind(limit.max(0))
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Comment::from).collect())
    }

    /// A single comment by id, pending or approved.
    pub async fn get(&self, id: i64) -> Result<Option<Comment>, StoreError> {
        let row = sqlx::query_as::<_, SqlComment>(
            "SELECT id, post, name, website, message, created_at, ip, user_agent, approved
             FROM comments WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Comment::from))
    }

    /// Mark a comment approved. Returns whether a row matched; a missing id is not an error.
    pub async fn approve(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE comments SET approved = 1 WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Remove a comment. Returns whether a row was deleted; a missing id is not an error.
    pub async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM comments WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Close the pool and wait for connections to finish. Later queries fail.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_comment(post: &str, name: &str, approved: bool) -> NewComment {
        NewComment {
            post: post.to_string(),
            name: name.to_string(),
            website: None,
            message: format!("hello from {}", name),
            ip: "127.0.0.1".to_string(),
            user_agent: "test-agent".to_string(),
            approved,
        }
    }

    #[tokio::test]
    async fn test_insert_assigns_increasing_ids() {
        let store = CommentStore::connect_in_memory().await.unwrap();

        let mut last = 0;
        for i in 0..5 {
            let id = store.insert(&new_comment("/a", &format!("u{}", i), true)).await.unwrap();
            assert!(id > last);
            last = id;
        }

        let row = store.get(last).await.unwrap().unwrap();
        assert_eq!(row.name, "u4");
        assert_eq!(row.ip.as_deref(), Some("127.0.0.1"));
        assert_eq!(row.user_agent.as_deref(), Some("test-agent"));
        assert!(!row.created_at.is_empty());
    }

    #[tokio::test]
    async fn test_concurrent_inserts_get_unique_increasing_ids() {
        let path = std::env::temp_dir().join(format!("comments-{}.db", uuid::Uuid::new_v4()));
        let store = CommentStore::connect(&format!("sqlite://{}", path.display()))
            .await
            .unwrap();

        let mut tasks = tokio::task::JoinSet::new();
        for i in 0..20 {
            let store = store.clone();
            tasks.spawn(async move { store.insert(&new_comment("/race", &format!("u{}", i), true)).await });
        }

        let mut ids = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            ids.push(joined.unwrap().unwrap());
        }
        ids.sort_unstable();
        assert_eq!(ids.len(), 20);
        assert!(ids.windows(2).all(|w| w[0] < w[1]), "duplicate ids: {:?}", ids);

        // Newest first, in strict id order.
        let listed: Vec<i64> = store.list_all(100).await.unwrap().iter().map(|c| c.id).collect();
        assert_eq!(listed.len(), 20);
        assert!(listed.windows(2).all(|w| w[0] > w[1]));
        assert_eq!(listed[0], *ids.last().unwrap());

        store.close().await;
        for suffix in ["", "-wal", "-shm"] {
            let _ = std::fs::remove_file(format!("{}{}", path.display(), suffix));
        }
    }

    #[tokio::test]
    async fn test_ids_not_reused_after_delete() {
        let store = CommentStore::connect_in_memory().await.unwrap();
        let a = store.insert(&new_comment("/", "a", true)).await.unwrap();
        store.delete(a).await.unwrap();
        let b = store.insert(&new_comment("/", "b", true)).await.unwrap();
        assert!(b > a);
    }

    #[tokio::test]
    async fn test_query_approved_filters_and_orders() {
        let store = CommentStore::connect_in_memory().await.unwrap();
        let first = store.insert(&new_comment("/p", "first", true)).await.unwrap();
        store.insert(&new_comment("/p", "pending", false)).await.unwrap();
        store.insert(&new_comment("/other", "elsewhere", true)).await.unwrap();
        let second = store.insert(&new_comment("/p", "second", true)).await.unwrap();

        let page = store.query_approved("/p", 1, 10).await.unwrap();
        assert_eq!(page.total, 2);
        let ids: Vec<i64> = page.items.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![second, first]);
    }

    #[tokio::test]
    async fn test_query_approved_pagination() {
        let store = CommentStore::connect_in_memory().await.unwrap();
        for i in 0..23 {
            store.insert(&new_comment("/p", &format!("u{}", i), true)).await.unwrap();
        }

        let page = store.query_approved("/p", 3, 10).await.unwrap();
        assert_eq!(page.items.len(), 3);
        assert_eq!(page.total, 23);

        // ceil(23 / 10) + 1
        let page = store.query_approved("/p", 4, 10).await.unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 23);
    }

    #[tokio::test]
    async fn test_query_approved_clamps_parameters() {
        let store = CommentStore::connect_in_memory().await.unwrap();
        for i in 0..60 {
            store.insert(&new_comment("/p", &format!("u{}", i), true)).await.unwrap();
        }

        let page = store.query_approved("/p", -3, 500).await.unwrap();
        assert_eq!(page.page, 1);
        assert_eq!(page.limit, 50);
        assert_eq!(page.items.len(), 50);

        let page = store.query_approved("/p", 1, 0).await.unwrap();
        assert_eq!(page.limit, 1);
        assert_eq!(page.items.len(), 1);
    }

    #[tokio::test]
    async fn test_approve_makes_comment_visible() {
        let store = CommentStore::connect_in_memory().await.unwrap();
        let id = store.insert(&new_comment("/p", "pending", false)).await.unwrap();

        assert_eq!(store.query_approved("/p", 1, 10).await.unwrap().total, 0);
        assert!(store.approve(id).await.unwrap());

        let page = store.query_approved("/p", 1, 10).await.unwrap();
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.items[0].id, id);

        assert!(!store.approve(9999).await.unwrap());
    }

    #[tokio::test]
    async fn test_delete_is_idempotent() {
        let store = CommentStore::connect_in_memory().await.unwrap();
        let id = store.insert(&new_comment("/p", "gone", true)).await.unwrap();

        assert!(store.delete(id).await.unwrap());
        assert!(!store.delete(id).await.unwrap());
        assert!(store.list_all(ADMIN_LIST_LIMIT).await.unwrap().iter().all(|c| c.id != id));
    }

    #[tokio::test]
    async fn test_list_all_includes_pending_and_respects_limit() {
        let store = CommentStore::connect_in_memory().await.unwrap();
        store.insert(&new_comment("/a", "one", true)).await.unwrap();
        let pending = store.insert(&new_comment("/b", "two", false)).await.unwrap();

        let all = store.list_all(ADMIN_LIST_LIMIT).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].id, pending);
        assert!(!all[0].approved);

        assert_eq!(store.list_all(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_init_is_idempotent() {
        let store = CommentStore::connect_in_memory().await.unwrap();
        let id = store.insert(&new_comment("/", "keep", true)).await.unwrap();
        store.init().await.unwrap();
        assert!(store.get(id).await.unwrap().is_some());
    }
}
