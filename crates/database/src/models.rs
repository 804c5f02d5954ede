//! Database models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A user seen by the bot, identified by their Telegram user id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct User {
    /// Telegram user id.
    pub user_id: i64,
    /// Handle without the leading `@`, if the user has one.
    pub username: Option<String>,
    /// First name.
    pub first_name: Option<String>,
    /// Last name.
    pub last_name: Option<String>,
    /// Username of the bot instance the user last talked to.
    pub bot_name: Option<String>,
    /// First time the user was seen.
    pub created_at: String,
    /// Last inbound message from the user.
    pub last_interaction: String,
}

/// Fields refreshed on every inbound message.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UserInteraction {
    pub user_id: i64,
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub bot_name: Option<String>,
}

/// A valentine linking an anonymous sender to a receiver handle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Pair {
    /// Auto-incrementing ID.
    pub id: i64,
    /// User id of the anonymous sender.
    pub sender_id: i64,
    /// Sender handle at creation time.
    pub sender_username: String,
    /// Handle the sender typed for the receiver.
    pub receiver_username: String,
    /// Receiver user id, set once the receiver starts the bot.
    pub receiver_id: Option<i64>,
    /// The valentine text delivered on resolution.
    pub initial_message: String,
    /// Creation timestamp.
    pub created_at: String,
}

impl Pair {
    /// Whether the receiver has started the bot and the pair can relay.
    pub fn is_resolved(&self) -> bool {
        self.receiver_id.is_some()
    }

    /// The other participant from `user_id`'s point of view.
    ///
    /// Returns `None` when the pair is unresolved, when `user_id` is not a
    /// participant, or when both sides are the same identity.
    pub fn counterpart(&self, user_id: i64) -> Option<i64> {
        let receiver_id = self.receiver_id?;
        let other = if user_id == self.sender_id {
            receiver_id
        } else if user_id == receiver_id {
            self.sender_id
        } else {
            return None;
        };

        (other != user_id).then_some(other)
    }
}

/// Input for creating a new, unresolved pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPair {
    pub sender_id: i64,
    pub sender_username: String,
    pub receiver_username: String,
    pub initial_message: String,
}

/// A relayed message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Message {
    /// Auto-incrementing ID.
    pub id: i64,
    /// Pair this message was relayed through.
    pub pair_id: i64,
    /// Author of the message.
    pub sender_id: i64,
    /// Message text.
    pub message: String,
    /// Creation timestamp.
    pub created_at: String,
}
