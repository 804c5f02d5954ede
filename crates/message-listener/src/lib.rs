//! Update listener for the valentine bot.
//!
//! This crate runs the teloxide dispatcher over Telegram long polling, turns
//! each private text message into an [`InboundMessage`] and feeds it, one at
//! a time, to a [`Valentine`] instance.
//!
//! # Example
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use broadcaster::TelegramSender;
//! use database::Database;
//! use message_listener::UpdateProcessor;
//! use teloxide::Bot;
//! use valentine::{Valentine, ValentineConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let bot = Bot::new("123456:ABC-DEF");
//! let db = Database::connect("sqlite:valentine.db?mode=rwc").await?;
//! db.migrate().await?;
//!
//! let valentine = Valentine::new(db, TelegramSender::new(bot.clone()), ValentineConfig::default());
//!
//! // Runs until Ctrl+C
//! UpdateProcessor::new(valentine)
//!     .run(bot, Duration::from_secs(30))
//!     .await;
//! # Ok(())
//! # }
//! ```
//!
//! [`InboundMessage`]: valentine::InboundMessage
//! [`Valentine`]: valentine::Valentine

mod convert;
mod processor;

pub use convert::MessageExt;
pub use processor::{ProcessResult, ProcessorError, UpdateProcessor};

/// Crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
