//! Routing of plain text: the compose flow first, then the relay.

use broadcaster::MessageSender;
use database::{message as messages, pair, NewPair};
use tracing::{debug, error, info, warn};

use crate::bot::{Outcome, Valentine};
use crate::command::normalize_handle;
use crate::error::Result;
use crate::message::InboundMessage;
use crate::session::ComposeStage;
use crate::texts;

impl<S: MessageSender> Valentine<S> {
    /// Route non-command text. An active compose flow takes priority; the
    /// relay only sees text from users who are not mid-flow.
    pub(crate) async fn route_text(&self, message: &InboundMessage, text: &str) -> Result<Outcome> {
        match self.sessions.get(message.sender.id).await {
            Some(ComposeStage::AwaitingUsername) => self.accept_target(message, text).await,
            Some(ComposeStage::AwaitingMessage { target_handle }) => {
                self.store_valentine(message, text, target_handle).await
            }
            None => self.relay(message, text).await,
        }
    }

    async fn accept_target(&self, message: &InboundMessage, text: &str) -> Result<Outcome> {
        let candidate = normalize_handle(text);

        if candidate.is_empty() {
            self.reply(message, texts::EMPTY_TARGET).await?;
            return Ok(Outcome::TargetRejected);
        }

        if message.sender.handle() == Some(candidate) {
            self.reply(message, texts::SELF_TARGET).await?;
            return Ok(Outcome::TargetRejected);
        }

        let target = candidate.to_string();
        self.sessions
            .advance(
                message.sender.id,
                ComposeStage::AwaitingMessage {
                    target_handle: target.clone(),
                },
            )
            .await;

        self.reply(message, texts::ASK_MESSAGE).await?;
        Ok(Outcome::TargetAccepted { target })
    }

    async fn store_valentine(
        &self,
        message: &InboundMessage,
        text: &str,
        target_handle: String,
    ) -> Result<Outcome> {
        // The handle may have been removed since /send_valentine.
        let Some(sender_handle) = message.sender.handle() else {
            self.reply(message, texts::MISSING_HANDLE).await?;
            return Ok(Outcome::MissingHandle);
        };

        let new_pair = NewPair {
            sender_id: message.sender.id,
            sender_username: sender_handle.to_string(),
            receiver_username: target_handle,
            initial_message: text.to_string(),
        };

        let pair_id = match pair::create_pair(self.database().pool(), &new_pair).await {
            Ok(id) => id,
            Err(e) => {
                error!(user_id = message.sender.id, "Failed to save valentine: {}", e);
                self.reply(message, texts::SAVE_FAILED).await?;
                return Ok(Outcome::StorageFailed);
            }
        };

        info!(user_id = message.sender.id, pair_id, "Valentine saved");

        self.sessions.clear(message.sender.id).await;
        self.reply(message, &texts::valentine_saved(&new_pair.receiver_username))
            .await?;
        Ok(Outcome::PairCreated { pair_id })
    }

    /// Forward text to the other side of the sender's latest active pair.
    ///
    /// The message row is written before the forward and kept if the
    /// forward fails.
    async fn relay(&self, message: &InboundMessage, text: &str) -> Result<Outcome> {
        let pool = self.database().pool();
        let user_id = message.sender.id;

        let active = match pair::latest_active_for_user(pool, user_id).await {
            Ok(Some(active)) => active,
            Ok(None) => {
                debug!(user_id, "No active pair, dropping message");
                return Ok(Outcome::Dropped);
            }
            Err(e) => {
                error!(user_id, "Failed to look up active pair: {}", e);
                self.reply(message, texts::RELAY_FAILED).await?;
                return Ok(Outcome::StorageFailed);
            }
        };

        let Some(recipient) = active.counterpart(user_id) else {
            warn!(user_id, pair_id = active.id, "Pair has no counterpart to relay to");
            self.reply(message, texts::RELAY_FAILED).await?;
            return Ok(Outcome::RoutingFailed { pair_id: active.id });
        };

        if let Err(e) = messages::record_message(pool, active.id, user_id, text).await {
            error!(user_id, pair_id = active.id, "Failed to store relayed message: {}", e);
            self.reply(message, texts::RELAY_FAILED).await?;
            return Ok(Outcome::StorageFailed);
        }

        if let Err(e) = self.sender().send_text(recipient, text).await {
            error!(
                user_id,
                pair_id = active.id,
                recipient,
                "Failed to forward message: {}",
                e
            );
            self.reply(message, texts::RELAY_FAILED).await?;
            return Ok(Outcome::DeliveryFailed {
                pair_id: active.id,
                recipient,
            });
        }

        debug!(user_id, pair_id = active.id, recipient, "Message relayed");
        Ok(Outcome::Relayed {
            pair_id: active.id,
            recipient,
        })
    }
}
