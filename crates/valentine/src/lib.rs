//! Anonymous valentine relay.
//!
//! A user starts a valentine with `/send_valentine`, names a target handle and
//! writes a message. The message waits in the store until the target sends
//! `/start`; from then on plain text from either side is relayed to the
//! other without revealing the sender. Admins get `/stats` and `/broadcast`.
//!
//! ```text
//! InboundMessage ──► Valentine::handle
//!                      ├─ command ──► start / send_valentine / stats / broadcast
//!                      └─ text ─────► compose flow (SessionStore) or relay
//! ```
//!
//! # Example
//!
//! ```no_run
//! use broadcaster::RecordingSender;
//! use database::Database;
//! use valentine::{InboundMessage, Sender, Valentine, ValentineConfig};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let db = Database::connect("sqlite::memory:").await?;
//! db.migrate().await?;
//!
//! let bot = Valentine::new(db, RecordingSender::new(), ValentineConfig::default());
//! let alice = Sender::new(1).with_username("alice");
//! bot.handle(&InboundMessage::direct(alice, "/send_valentine")).await?;
//! # Ok(())
//! # }
//! ```

pub mod admin;
pub mod bot;
pub mod command;
pub mod error;
pub mod message;
mod router;
pub mod session;
pub mod texts;

pub use admin::{AdminPolicy, Stats};
pub use bot::{Outcome, Valentine, ValentineConfig};
pub use command::{Command, Input};
pub use error::{Result, ValentineError};
pub use message::{InboundMessage, Sender};
pub use session::{ComposeStage, InMemorySessionStore, SessionStore};
