//! SQLite persistence layer for the valentine relay bot.
//!
//! This crate provides async database operations for users, valentine pairs
//! and relayed messages using SQLx with SQLite.
//!
//! # Example
//!
//! ```no_run
//! use database::{Database, NewPair, pair};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // Connect and run migrations
//!     let db = Database::connect("sqlite:valentine.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     // Store a valentine for @bob
//!     let new_pair = NewPair {
//!         sender_id: 42,
//!         sender_username: "alice".to_string(),
//!         receiver_username: "bob".to_string(),
//!         initial_message: "Roses are red".to_string(),
//!     };
//!     pair::create_pair(db.pool(), &new_pair).await?;
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod message;
pub mod models;
pub mod pair;
pub mod user;

pub use error::{DatabaseError, Result};
pub use models::{Message, NewPair, Pair, User, UserInteraction};

use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

/// Database connection wrapper.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Default pool size for database connections.
    const DEFAULT_POOL_SIZE: u32 = 5;

    /// Connect to a SQLite database.
    ///
    /// The URL should be in the format `sqlite:path/to/db.sqlite?mode=rwc`.
    /// Use `?mode=rwc` to create the database file if it doesn't exist.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # async fn example() -> database::Result<()> {
    /// // File database
    /// let db = database::Database::connect("sqlite:data/valentine.db?mode=rwc").await?;
    ///
    /// // In-memory database (for testing)
    /// let db = database::Database::connect("sqlite::memory:").await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn connect(url: &str) -> Result<Self> {
        Self::connect_with_pool_size(url, Self::DEFAULT_POOL_SIZE).await
    }

    /// Connect to a SQLite database with a custom pool size.
    pub async fn connect_with_pool_size(url: &str, pool_size: u32) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(url)?
            .create_if_missing(true)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(pool_size)
            .acquire_timeout(std::time::Duration::from_secs(30))
            .connect_with(options)
            .await?;

        tracing::info!(
            "Connected to database: {} (pool size: {})",
            url,
            pool_size
        );

        Ok(Self { pool })
    }

    /// Run database migrations.
    ///
    /// Safe to call on every start; applied migrations are skipped.
    pub async fn migrate(&self) -> Result<()> {
        tracing::info!("Running database migrations...");

        sqlx::migrate!("./migrations").run(&self.pool).await?;

        tracing::info!("Migrations complete");
        Ok(())
    }

    /// Get a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Close the database connection pool.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_db() -> Database {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        db.migrate().await.unwrap();
        db
    }

    fn interaction(user_id: i64, username: Option<&str>) -> UserInteraction {
        UserInteraction {
            user_id,
            username: username.map(str::to_string),
            first_name: Some("Test".to_string()),
            last_name: None,
            bot_name: Some("valentine_bot".to_string()),
        }
    }

    fn new_pair(sender_id: i64, sender: &str, receiver: &str, text: &str) -> NewPair {
        NewPair {
            sender_id,
            sender_username: sender.to_string(),
            receiver_username: receiver.to_string(),
            initial_message: text.to_string(),
        }
    }

    #[tokio::test]
    async fn test_migrate_is_idempotent() {
        let db = test_db().await;
        db.migrate().await.unwrap();
        assert_eq!(user::count_users(db.pool()).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_upsert_user_refreshes_fields() {
        let db = test_db().await;

        user::upsert_user(db.pool(), &interaction(1, None)).await.unwrap();
        let fetched = user::get_user(db.pool(), 1).await.unwrap();
        assert_eq!(fetched.username, None);

        user::upsert_user(db.pool(), &interaction(1, Some("alice"))).await.unwrap();
        let fetched = user::get_user(db.pool(), 1).await.unwrap();
        assert_eq!(fetched.username.as_deref(), Some("alice"));
        assert_eq!(fetched.bot_name.as_deref(), Some("valentine_bot"));
        assert_eq!(user::count_users(db.pool()).await.unwrap(), 1);

        let missing = user::get_user(db.pool(), 2).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_count_active_users_ignores_stale() {
        let db = test_db().await;
        user::upsert_user(db.pool(), &interaction(1, Some("alice"))).await.unwrap();
        user::upsert_user(db.pool(), &interaction(2, Some("bob"))).await.unwrap();

        sqlx::query("UPDATE users SET last_interaction = datetime('now', '-3 days') WHERE user_id = 2")
            .execute(db.pool())
            .await
            .unwrap();

        assert_eq!(user::count_users(db.pool()).await.unwrap(), 2);
        assert_eq!(user::count_active_users(db.pool()).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_pair_lifecycle() {
        let db = test_db().await;

        let id = pair::create_pair(db.pool(), &new_pair(1, "alice", "bob", "hi"))
            .await
            .unwrap();
        let pending = pair::find_pending_for_handle(db.pool(), "bob")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(pending.id, id);
        assert!(!pending.is_resolved());
        assert!(pair::latest_active_for_user(db.pool(), 1).await.unwrap().is_none());

        pair::resolve_pair(db.pool(), id, 2).await.unwrap();
        assert!(pair::find_pending_for_handle(db.pool(), "bob")
            .await
            .unwrap()
            .is_none());

        let active = pair::latest_active_for_user(db.pool(), 2).await.unwrap().unwrap();
        assert_eq!(active.id, id);
        assert_eq!(active.counterpart(2), Some(1));

        assert_eq!(pair::count_pairs(db.pool()).await.unwrap(), 1);
        assert_eq!(pair::count_resolved_pairs(db.pool()).await.unwrap(), 1);

        let missing = pair::resolve_pair(db.pool(), 999, 2).await;
        assert!(matches!(missing, Err(DatabaseError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_pending_pairs_resolve_oldest_first() {
        let db = test_db().await;
        let first = pair::create_pair(db.pool(), &new_pair(1, "alice", "bob", "first"))
            .await
            .unwrap();
        let second = pair::create_pair(db.pool(), &new_pair(3, "carol", "bob", "second"))
            .await
            .unwrap();

        let pending = pair::find_pending_for_handle(db.pool(), "bob").await.unwrap().unwrap();
        assert_eq!(pending.id, first);

        pair::resolve_pair(db.pool(), first, 2).await.unwrap();
        let pending = pair::find_pending_for_handle(db.pool(), "bob").await.unwrap().unwrap();
        assert_eq!(pending.id, second);
    }

    #[tokio::test]
    async fn test_latest_active_prefers_newest() {
        let db = test_db().await;
        let older = pair::create_pair(db.pool(), &new_pair(1, "alice", "bob", "a"))
            .await
            .unwrap();
        let newer = pair::create_pair(db.pool(), &new_pair(3, "carol", "alice", "b"))
            .await
            .unwrap();
        pair::resolve_pair(db.pool(), older, 2).await.unwrap();
        pair::resolve_pair(db.pool(), newer, 1).await.unwrap();

        let active = pair::latest_active_for_user(db.pool(), 1).await.unwrap().unwrap();
        assert_eq!(active.id, newer);
        assert_eq!(active.counterpart(1), Some(3));
    }

    #[tokio::test]
    async fn test_messages_and_recipients() {
        let db = test_db().await;
        user::upsert_user(db.pool(), &interaction(1, Some("alice"))).await.unwrap();
        user::upsert_user(db.pool(), &interaction(2, Some("bob"))).await.unwrap();

        let resolved = pair::create_pair(db.pool(), &new_pair(1, "alice", "bob", "hi"))
            .await
            .unwrap();
        pair::resolve_pair(db.pool(), resolved, 2).await.unwrap();
        // Sender never recorded as a user (e.g. rows from an older schema).
        pair::create_pair(db.pool(), &new_pair(5, "eve", "dave", "hey"))
            .await
            .unwrap();

        message::record_message(db.pool(), resolved, 2, "who is this?").await.unwrap();
        message::record_message(db.pool(), resolved, 1, "a secret").await.unwrap();

        let log = message::list_for_pair(db.pool(), resolved).await.unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0].sender_id, 2);
        assert_eq!(log[1].message, "a secret");
        assert_eq!(message::count_messages(db.pool()).await.unwrap(), 2);

        let recipients = user::list_broadcast_recipients(db.pool()).await.unwrap();
        assert_eq!(recipients, vec![1, 2, 5]);
    }
}
