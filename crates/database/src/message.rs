//! Relayed message log.

use sqlx::SqlitePool;

use crate::error::Result;
use crate::models::Message;

/// Append a relayed message to the log and return its id.
pub async fn record_message(
    pool: &SqlitePool,
    pair_id: i64,
    sender_id: i64,
    text: &str,
) -> Result<i64> {
    let result = sqlx::query(
        r#"
        INSERT INTO messages (pair_id, sender_id, message)
        VALUES (?, ?, ?)
        "#,
    )
    .bind(pair_id)
    .bind(sender_id)
    .bind(text)
    .execute(pool)
    .await?;

    Ok(result.last_insert_rowid())
}

/// List the messages of a pair, oldest first.
pub async fn list_for_pair(pool: &SqlitePool, pair_id: i64) -> Result<Vec<Message>> {
    let messages = sqlx::query_as::<_, Message>(
        r#"
        SELECT id, pair_id, sender_id, message, created_at
        FROM messages
        WHERE pair_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(pair_id)
    .fetch_all(pool)
    .await?;

    Ok(messages)
}

/// Count all relayed messages.
pub async fn count_messages(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM messages
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}
