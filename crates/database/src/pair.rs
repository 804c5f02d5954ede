//! Valentine pair operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{NewPair, Pair};

/// Insert a new unresolved pair and return its id.
///
/// No uniqueness check: submitting the same valentine twice creates two
/// pairs.
pub async fn create_pair(pool: &SqlitePool, pair: &NewPair) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO valentine_pairs (sender_id, sender_username, receiver_username, initial_message)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(pair.sender_id)
    .bind(&pair.sender_username)
    .bind(&pair.receiver_username)
    .bind(&pair.initial_message)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Get a pair by ID.
pub async fn get_pair(pool: &SqlitePool, id: i64) -> Result<Pair> {
    sqlx::query_as::<_, Pair>(
        r#"
        SELECT id, sender_id, sender_username, receiver_username, receiver_id,
               initial_message, created_at
        FROM valentine_pairs
        WHERE id = ?
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "Pair",
        id: id.to_string(),
    })
}

/// Find the oldest unresolved pair addressed to `receiver_username`.
pub async fn find_pending_for_handle(
    pool: &SqlitePool,
    receiver_username: &str,
) -> Result<Option<Pair>> {
    let pair = sqlx::query_as::<_, Pair>(
        r#"
        SELECT id, sender_id, sender_username, receiver_username, receiver_id,
               initial_message, created_at
        FROM valentine_pairs
        WHERE receiver_username = ? AND receiver_id IS NULL
        ORDER BY created_at ASC, id ASC
        LIMIT 1
        "#,
    )
    .bind(receiver_username)
    .fetch_optional(pool)
    .await?;

    Ok(pair)
}

/// Set the receiver identity of a pair, making it active.
pub async fn resolve_pair(pool: &SqlitePool, id: i64, receiver_id: i64) -> Result<()> {
    let result = sqlx::query(
        r#"
        UPDATE valentine_pairs
        SET receiver_id = ?
        WHERE id = ?
        "#,
    )
    .bind(receiver_id)
    .bind(id)
    .execute(pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::NotFound {
            entity: "Pair",
            id: id.to_string(),
        });
    }

    Ok(())
}

/// The most recently created resolved pair in which `user_id` is either
/// sender or receiver.
pub async fn latest_active_for_user(pool: &SqlitePool, user_id: i64) -> Result<Option<Pair>> {
    let pair = sqlx::query_as::<_, Pair>(
        r#"
        SELECT id, sender_id, sender_username, receiver_username, receiver_id,
               initial_message, created_at
        FROM valentine_pairs
        WHERE (sender_id = ? OR receiver_id = ?)
          AND receiver_id IS NOT NULL
        ORDER BY created_at DESC, id DESC
        LIMIT 1
        "#,
    )
    .bind(user_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(pair)
}

/// Count all pairs.
pub async fn count_pairs(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM valentine_pairs
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Count pairs whose receiver has started the bot.
pub async fn count_resolved_pairs(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM valentine_pairs WHERE receiver_id IS NOT NULL
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
