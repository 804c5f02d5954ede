//! Message sender trait and implementations.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use teloxide::prelude::*;
use tracing::debug;

use crate::Error;

/// Trait for delivering a text message to a chat identity.
///
/// Abstracted so the relay logic can run against Telegram or a test double.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Send `text` verbatim to `recipient`.
    async fn send_text(&self, recipient: i64, text: &str) -> Result<(), Error>;
}

#[async_trait]
impl<T: MessageSender + ?Sized> MessageSender for Arc<T> {
    async fn send_text(&self, recipient: i64, text: &str) -> Result<(), Error> {
        (**self).send_text(recipient, text).await
    }
}

/// Sends through the Telegram Bot API.
///
/// Recipients are private chats, so a user id doubles as the chat id.
#[derive(Debug, Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    /// Get the underlying bot.
    pub fn bot(&self) -> &Bot {
        &self.bot
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_text(&self, recipient: i64, text: &str) -> Result<(), Error> {
        let sent = self.bot.send_message(ChatId(recipient), text).await?;
        debug!(recipient, message_id = sent.id.0, "Message delivered");
        Ok(())
    }
}

/// A sender that records every message instead of delivering it.
///
/// Recipients registered with [`RecordingSender::fail_for`] get an error
/// and nothing is recorded for them.
#[derive(Debug, Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(i64, String)>>,
    failing: Mutex<HashSet<i64>>,
}

impl RecordingSender {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every send to `recipient` fail.
    pub fn fail_for(&self, recipient: i64) {
        lock(&self.failing).insert(recipient);
    }

    /// All delivered messages in send order.
    pub fn sent(&self) -> Vec<(i64, String)> {
        lock(&self.sent).clone()
    }

    /// Texts delivered to one recipient, in order.
    pub fn sent_to(&self, recipient: i64) -> Vec<String> {
        lock(&self.sent)
            .iter()
            .filter(|(to, _)| *to == recipient)
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// Forget everything recorded so far.
    pub fn clear(&self) {
        lock(&self.sent).clear();
    }
}

#[async_trait]
impl MessageSender for RecordingSender {
    async fn send_text(&self, recipient: i64, text: &str) -> Result<(), Error> {
        if lock(&self.failing).contains(&recipient) {
            return Err(Error::SendFailed(format!("recipient {} unreachable", recipient)));
        }
        lock(&self.sent).push((recipient, text.to_string()));
        Ok(())
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_recording_sender() {
        let sender = RecordingSender::new();
        sender.fail_for(3);

        sender.send_text(1, "one").await.unwrap();
        sender.send_text(2, "two").await.unwrap();
        assert!(sender.send_text(3, "three").await.is_err());
        sender.send_text(1, "again").await.unwrap();

        assert_eq!(sender.sent().len(), 3);
        assert_eq!(sender.sent_to(1), vec!["one", "again"]);
        assert!(sender.sent_to(3).is_empty());

        sender.clear();
        assert!(sender.sent().is_empty());
    }
}
