//! User operations.

use sqlx::SqlitePool;

use crate::error::{DatabaseError, Result};
use crate::models::{User, UserInteraction};

/// Create or refresh a user from an inbound message.
///
/// Handle, names and bot name are overwritten and `last_interaction` is
/// bumped. Never deletes anything.
pub async fn upsert_user(pool: &SqlitePool, interaction: &UserInteraction) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO users (user_id, username, first_name, last_name, bot_name)
        VALUES (?, ?, ?, ?, ?)
        ON CONFLICT (user_id) DO UPDATE SET
            username = excluded.username,
            first_name = excluded.first_name,
            last_name = excluded.last_name,
            bot_name = excluded.bot_name,
            last_interaction = CURRENT_TIMESTAMP
        "#,
    )
    .bind(interaction.user_id)
    .bind(&interaction.username)
    .bind(&interaction.first_name)
    .bind(&interaction.last_name)
    .bind(&interaction.bot_name)
    .execute(pool)
    .await?;

    Ok(())
}

/// Get a user by ID.
pub async fn get_user(pool: &SqlitePool, user_id: i64) -> Result<User> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT user_id, username, first_name, last_name, bot_name, created_at, last_interaction
        FROM users
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "User",
        id: user_id.to_string(),
    })
}

/// Count total users.
pub async fn count_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(*) FROM users
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Count users whose last interaction falls within the last 24 hours.
pub async fn count_active_users(pool: &SqlitePool) -> Result<i64> {
    let count = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT COUNT(DISTINCT user_id)
        FROM users
        WHERE last_interaction > datetime('now', '-1 day')
        "#,
    )
    .fetch_one(pool)
    .await?;

    Ok(count)
}

/// Every identity the bot can reach: known users plus both sides of
/// resolved pairs, without duplicates.
pub async fn list_broadcast_recipients(pool: &SqlitePool) -> Result<Vec<i64>> {
    let ids = sqlx::query_scalar::<_, i64>(
        r#"
        SELECT user_id FROM users WHERE user_id IS NOT NULL
        UNION
        SELECT sender_id FROM valentine_pairs
        UNION
        SELECT receiver_id FROM valentine_pairs WHERE receiver_id IS NOT NULL
        ORDER BY 1
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(ids)
}
