//! Broadcast utilities for the valentine relay bot.
//!
//! This crate provides the [`MessageSender`] abstraction used for every
//! outbound message, its Telegram implementation, and a [`Broadcaster`] that
//! sends one text to many recipients with a fixed pause between sends.
//!
//! # Example
//!
//! ```no_run
//! use broadcaster::{Broadcaster, TelegramSender};
//! use teloxide::Bot;
//!
//! # async fn example() {
//! let bot = Bot::new("123456:ABC-DEF");
//! let broadcaster = Broadcaster::new(TelegramSender::new(bot));
//!
//! let report = broadcaster.broadcast(&[42, 43], "Hello everyone!").await;
//! println!("sent {}, failed {}", report.sent, report.failed);
//! # }
//! ```

mod sender;

use std::time::Duration;

use teloxide::{ApiError, RequestError};
use thiserror::Error;
use tracing::{info, warn};

pub use sender::{MessageSender, RecordingSender, TelegramSender};

/// Default pause between two broadcast sends, to stay under the Bot API
/// rate limits.
pub const DEFAULT_SEND_DELAY: Duration = Duration::from_millis(50);

/// Errors that can occur while sending.
#[derive(Debug, Error)]
pub enum Error {
    /// Bot API error.
    #[error("Telegram error: {0}")]
    Api(#[from] RequestError),

    /// Delivery failed for another reason.
    #[error("Send failed: {0}")]
    SendFailed(String),
}

impl Error {
    /// The recipient can no longer be reached: they blocked the bot, never
    /// opened a chat with it, or deleted their account.
    pub fn is_unreachable(&self) -> bool {
        matches!(
            self,
            Error::Api(RequestError::Api(
                ApiError::BotBlocked | ApiError::ChatNotFound | ApiError::UserDeactivated
            ))
        )
    }
}

/// Outcome of a broadcast run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients that got the message.
    pub sent: usize,
    /// Recipients whose delivery failed.
    pub failed: usize,
    /// One entry per failure: recipient and error text.
    pub errors: Vec<(i64, String)>,
}

impl BroadcastReport {
    /// Total recipients attempted.
    pub fn attempted(&self) -> usize {
        self.sent + self.failed
    }
}

/// Sends one message to many recipients, sequentially.
#[derive(Debug, Clone)]
pub struct Broadcaster<S: MessageSender> {
    sender: S,
    delay: Duration,
}

impl<S: MessageSender> Broadcaster<S> {
    /// Create a broadcaster with the default inter-send delay.
    pub fn new(sender: S) -> Self {
        Self::with_delay(sender, DEFAULT_SEND_DELAY)
    }

    /// Create a broadcaster with a custom inter-send delay.
    pub fn with_delay(sender: S, delay: Duration) -> Self {
        Self { sender, delay }
    }

    /// Send `text` to every recipient in order.
    ///
    /// A failed delivery is logged and counted; it never stops the run.
    pub async fn broadcast(&self, recipients: &[i64], text: &str) -> BroadcastReport {
        info!(recipients = recipients.len(), "Starting broadcast");
        let mut report = BroadcastReport::default();

        for (index, &recipient) in recipients.iter().enumerate() {
            if index > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match self.sender.send_text(recipient, text).await {
                Ok(()) => report.sent += 1,
                Err(e) if e.is_unreachable() => {
                    info!(recipient, "Broadcast recipient unreachable: {}", e);
                    report.failed += 1;
                    report.errors.push((recipient, e.to_string()));
                }
                Err(e) => {
                    warn!(recipient, "Broadcast delivery failed: {}", e);
                    report.failed += 1;
                    report.errors.push((recipient, e.to_string()));
                }
            }
        }

        info!(sent = report.sent, failed = report.failed, "Broadcast finished");
        report
    }

    /// Get the underlying sender.
    pub fn sender(&self) -> &S {
        &self.sender
    }

    /// The pause between two sends.
    pub fn delay(&self) -> Duration {
        self.delay
    }
}

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
