//! The valentine bot: entry point for every inbound message.

use std::sync::Arc;
use std::time::Duration;

use broadcaster::{BroadcastReport, Broadcaster, MessageSender, DEFAULT_SEND_DELAY};
use database::{pair, user, Database, UserInteraction};
use tracing::{debug, error, info};

use crate::admin::{AdminPolicy, Stats};
use crate::command::{self, Command, Input};
use crate::error::Result;
use crate::message::{InboundMessage, Sender};
use crate::session::{InMemorySessionStore, SessionStore};
use crate::texts;

/// Settings for a [`Valentine`] instance.
#[derive(Debug, Clone)]
pub struct ValentineConfig {
    /// Who may run `/stats` and `/broadcast`.
    pub admins: AdminPolicy,
    /// Pause between two broadcast sends.
    pub broadcast_delay: Duration,
    /// The bot's own handle. Used to recognize `/cmd@handle` and stored on
    /// user rows.
    pub bot_username: Option<String>,
}

impl Default for ValentineConfig {
    fn default() -> Self {
        Self {
            admins: AdminPolicy::none(),
            broadcast_delay: DEFAULT_SEND_DELAY,
            bot_username: None,
        }
    }
}

/// What handling a message did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// `/start` with nothing waiting: welcome text sent.
    Welcomed,
    /// `/start` resolved a pending pair and delivered its message.
    ValentineDelivered { pair_id: i64 },
    /// The sender has no handle and the command needs one.
    MissingHandle,
    /// `/send_valentine` reset the flow to asking for a target.
    ComposeStarted,
    /// Target handle was empty or the sender's own; still asking.
    TargetRejected,
    /// Target accepted; now asking for the valentine text.
    TargetAccepted { target: String },
    /// A new unresolved pair was stored.
    PairCreated { pair_id: i64 },
    /// Text stored and forwarded to the other side of a pair.
    Relayed { pair_id: i64, recipient: i64 },
    /// Text stored but forwarding failed.
    DeliveryFailed { pair_id: i64, recipient: i64 },
    /// Plain text from someone with no flow and no active pair.
    Dropped,
    /// The active pair has no usable counterpart.
    RoutingFailed { pair_id: i64 },
    /// A storage error was reported to the user.
    StorageFailed,
    /// Admin command from a non-admin.
    NotAuthorized,
    StatsReported(Stats),
    /// `/broadcast` without text.
    BroadcastUsage,
    Broadcast(BroadcastReport),
    /// Unknown command or one for another bot.
    Ignored,
}

/// Anonymous valentine relay.
///
/// Generic over the message sender so flows can run against Telegram or a
/// recording test double.
pub struct Valentine<S: MessageSender> {
    db: Database,
    broadcaster: Broadcaster<S>,
    pub(crate) sessions: Arc<dyn SessionStore>,
    config: ValentineConfig,
}

impl<S: MessageSender> Valentine<S> {
    /// Create a bot with an in-memory session store.
    pub fn new(db: Database, sender: S, config: ValentineConfig) -> Self {
        let broadcaster = Broadcaster::with_delay(sender, config.broadcast_delay);
        Self {
            db,
            broadcaster,
            sessions: Arc::new(InMemorySessionStore::new()),
            config,
        }
    }

    /// Use a different session store.
    pub fn with_session_store(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = sessions;
        self
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn sender(&self) -> &S {
        self.broadcaster.sender()
    }

    pub fn sessions(&self) -> &Arc<dyn SessionStore> {
        &self.sessions
    }

    pub fn config(&self) -> &ValentineConfig {
        &self.config
    }

    /// Handle one inbound message.
    ///
    /// Problems inside a flow are answered to the user and show up in the
    /// returned [`Outcome`]. An `Err` means a reply could not be sent.
    pub async fn handle(&self, message: &InboundMessage) -> Result<Outcome> {
        self.record_user(&message.sender).await;

        match command::parse(&message.text, self.config.bot_username.as_deref()) {
            Input::Command(Command::Start) => self.handle_start(message).await,
            Input::Command(Command::SendValentine) => self.handle_send_valentine(message).await,
            Input::Command(Command::Stats) => self.handle_stats(message).await,
            Input::Command(Command::Broadcast(body)) => {
                self.handle_broadcast(message, &body).await
            }
            Input::UnknownCommand | Input::OtherBot => {
                debug!(user_id = message.sender.id, "Ignoring command");
                Ok(Outcome::Ignored)
            }
            Input::Text(text) => self.route_text(message, text).await,
        }
    }

    pub(crate) async fn reply(&self, message: &InboundMessage, text: &str) -> Result<()> {
        self.sender().send_text(message.chat_id, text).await?;
        Ok(())
    }

    /// Refresh the sender's user row. Failures are logged and never block
    /// the rest of the handling.
    async fn record_user(&self, sender: &Sender) {
        let interaction = UserInteraction {
            user_id: sender.id,
            username: sender.username.clone(),
            first_name: sender.first_name.clone(),
            last_name: sender.last_name.clone(),
            bot_name: self.config.bot_username.clone(),
        };

        if let Err(e) = user::upsert_user(self.db.pool(), &interaction).await {
            error!(user_id = sender.id, "Error updating user interaction: {}", e);
        }
    }

    async fn handle_start(&self, message: &InboundMessage) -> Result<Outcome> {
        let Some(handle) = message.sender.handle() else {
            self.reply(message, texts::MISSING_HANDLE).await?;
            return Ok(Outcome::MissingHandle);
        };

        if let Some(outcome) = self.deliver_pending(message, handle).await? {
            return Ok(outcome);
        }

        self.reply(message, texts::WELCOME).await?;
        Ok(Outcome::Welcomed)
    }

    /// Resolve the oldest pair waiting for `handle` and hand its message to
    /// the new receiver. `None` when nothing is waiting or storage failed.
    async fn deliver_pending(
        &self,
        message: &InboundMessage,
        handle: &str,
    ) -> Result<Option<Outcome>> {
        let pool = self.db.pool();
        let receiver_id = message.sender.id;

        let pending = match pair::find_pending_for_handle(pool, handle).await {
            Ok(Some(pending)) => pending,
            Ok(None) => return Ok(None),
            Err(e) => {
                error!(user_id = receiver_id, "Failed to look up pending valentine: {}", e);
                return Ok(None);
            }
        };

        if let Err(e) = pair::resolve_pair(pool, pending.id, receiver_id).await {
            error!(
                user_id = receiver_id,
                pair_id = pending.id,
                "Failed to resolve valentine: {}",
                e
            );
            return Ok(None);
        }

        info!(
            user_id = receiver_id,
            pair_id = pending.id,
            "Valentine resolved"
        );

        self.reply(message, texts::VALENTINE_RECEIVED).await?;
        self.reply(message, &pending.initial_message).await?;
        self.reply(message, texts::REPLIES_RELAYED).await?;

        Ok(Some(Outcome::ValentineDelivered {
            pair_id: pending.id,
        }))
    }

    async fn handle_send_valentine(&self, message: &InboundMessage) -> Result<Outcome> {
        if message.sender.handle().is_none() {
            self.reply(message, texts::MISSING_HANDLE).await?;
            return Ok(Outcome::MissingHandle);
        }

        self.sessions.begin(message.sender.id).await;
        self.reply(message, texts::ASK_TARGET).await?;
        Ok(Outcome::ComposeStarted)
    }

    async fn handle_stats(&self, message: &InboundMessage) -> Result<Outcome> {
        if !self.config.admins.allows(message.sender.id) {
            self.reply(message, texts::NOT_ADMIN).await?;
            return Ok(Outcome::NotAuthorized);
        }

        match Stats::collect(&self.db).await {
            Ok(stats) => {
                self.reply(message, &stats.to_string()).await?;
                Ok(Outcome::StatsReported(stats))
            }
            Err(e) => {
                error!("Error getting stats: {}", e);
                self.reply(message, texts::STATS_FAILED).await?;
                Ok(Outcome::StorageFailed)
            }
        }
    }

    async fn handle_broadcast(&self, message: &InboundMessage, body: &str) -> Result<Outcome> {
        if !self.config.admins.allows(message.sender.id) {
            self.reply(message, texts::NOT_ADMIN).await?;
            return Ok(Outcome::NotAuthorized);
        }

        let body = body.trim();
        if body.is_empty() {
            self.reply(message, texts::BROADCAST_USAGE).await?;
            return Ok(Outcome::BroadcastUsage);
        }

        let recipients = match user::list_broadcast_recipients(self.db.pool()).await {
            Ok(recipients) => recipients,
            Err(e) => {
                error!("Error loading broadcast recipients: {}", e);
                self.reply(message, texts::BROADCAST_FAILED).await?;
                return Ok(Outcome::StorageFailed);
            }
        };

        info!(admin = message.sender.id, "Broadcast requested");

        let text = format!("{}{}", texts::BROADCAST_PREFIX, body);
        let report = self.broadcaster.broadcast(&recipients, &text).await;

        self.reply(message, &texts::broadcast_complete(report.sent, report.failed))
            .await?;
        Ok(Outcome::Broadcast(report))
    }
}
