//! Update processor that connects the Telegram dispatcher to the
//! valentine bot.

use std::sync::Arc;
use std::time::Duration;

use broadcaster::MessageSender;
use teloxide::dispatching::{Dispatcher, UpdateHandler};
use teloxide::error_handlers::LoggingErrorHandler;
use teloxide::prelude::*;
use teloxide::update_listeners::Polling;
use teloxide::RequestError;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use valentine::{Outcome, Valentine, ValentineError};

use crate::convert::MessageExt;

/// Errors that can occur during update processing.
#[derive(Debug, Error)]
pub enum ProcessorError {
    /// The bot failed to handle a message.
    #[error("handler error: {0}")]
    Handler(#[from] ValentineError),
}

/// Result of processing a single message.
#[derive(Debug)]
pub enum ProcessResult {
    /// The message reached the bot.
    Handled { user_id: i64, outcome: Outcome },
    /// Message was skipped (no text, from a bot, group chat, ...).
    Skipped { reason: String },
    /// Error occurred during processing.
    Error(ProcessorError),
}

/// Feeds messages to a [`Valentine`] bot one at a time, in delivery order.
pub struct UpdateProcessor<S: MessageSender> {
    bot: Valentine<S>,
}

impl<S: MessageSender + 'static> UpdateProcessor<S> {
    pub fn new(bot: Valentine<S>) -> Self {
        Self { bot }
    }

    /// Get a reference to the bot.
    pub fn bot(&self) -> &Valentine<S> {
        &self.bot
    }

    /// Check if we should process this message.
    fn should_process(message: &Message) -> Result<(), String> {
        let from = message
            .from
            .as_ref()
            .ok_or_else(|| "no sender".to_string())?;

        if from.is_bot {
            return Err("message from a bot".to_string());
        }

        if message.text().is_none() {
            return Err("no text content".to_string());
        }

        // The relay is strictly one-to-one
        if !message.chat.is_private() {
            return Err("non-private chat".to_string());
        }

        Ok(())
    }

    /// Process a single message and return the result.
    pub async fn process_message(&self, message: &Message) -> ProcessResult {
        if let Err(reason) = Self::should_process(message) {
            debug!(message_id = message.id.0, "Skipping message: {}", reason);
            return ProcessResult::Skipped { reason };
        }

        let Some(inbound) = message.to_inbound_message() else {
            return ProcessResult::Skipped {
                reason: "could not convert to inbound message".to_string(),
            };
        };

        let user_id = inbound.sender.id;
        debug!(message_id = message.id.0, user_id, "Processing message");

        match self.bot.handle(&inbound).await {
            Ok(outcome) => ProcessResult::Handled { user_id, outcome },
            Err(e) => {
                error!(user_id, "Failed to handle message: {}", e);
                ProcessResult::Error(ProcessorError::Handler(e))
            }
        }
    }

    fn log_result(result: ProcessResult) {
        match result {
            ProcessResult::Handled { user_id, outcome } => {
                debug!(user_id, ?outcome, "Handled message");
            }
            ProcessResult::Skipped { reason } => {
                debug!("Skipped: {}", reason);
            }
            ProcessResult::Error(e) => {
                // Log but continue processing
                warn!("Error processing update: {}", e);
            }
        }
    }

    /// The update handler tree: every new message goes to
    /// [`UpdateProcessor::process_message`]. Other update kinds are dropped.
    pub fn handler() -> UpdateHandler<RequestError> {
        Update::filter_message().endpoint(
            |message: Message, processor: Arc<UpdateProcessor<S>>| async move {
                Self::log_result(processor.process_message(&message).await);
                respond(())
            },
        )
    }

    /// Build a dispatcher that stops on Ctrl+C.
    ///
    /// All updates share one queue so they are handled sequentially, in
    /// delivery order, across every chat.
    pub fn dispatcher(self, bot: Bot) -> Dispatcher<Bot, RequestError, ()> {
        Dispatcher::builder(bot, Self::handler())
            .dependencies(dptree::deps![Arc::new(self)])
            .distribution_function(|_| Some(()))
            .default_handler(|_| async {
                debug!("Ignoring non-message update");
            })
            .enable_ctrlc_handler()
            .build()
    }

    /// Long-poll Telegram and process messages until Ctrl+C.
    ///
    /// The database is closed once the dispatcher has stopped.
    pub async fn run(self, bot: Bot, poll_timeout: Duration) {
        info!("Starting update processor");

        let db = self.bot.database().clone();
        let listener = Polling::builder(bot.clone()).timeout(poll_timeout).build();

        self.dispatcher(bot)
            .dispatch_with_listener(
                listener,
                LoggingErrorHandler::with_custom_text("An error from the update listener"),
            )
            .await;

        info!("Update processor stopped");
        db.close().await;
    }
}
