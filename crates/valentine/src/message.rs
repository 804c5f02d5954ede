//! Inbound message types.

/// The person who sent an inbound message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Sender {
    /// Chat identity.
    pub id: i64,
    /// Handle without the leading `@`.
    pub username: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

impl Sender {
    /// A sender with only an identity.
    pub fn new(id: i64) -> Self {
        Self {
            id,
            ..Default::default()
        }
    }

    /// Set the handle.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }

    /// The handle, if the sender has a non-empty one.
    pub fn handle(&self) -> Option<&str> {
        self.username.as_deref().filter(|h| !h.is_empty())
    }
}

/// A text message addressed to the bot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Chat to answer in.
    pub chat_id: i64,
    /// Who wrote it.
    pub sender: Sender,
    /// Message text.
    pub text: String,
}

impl InboundMessage {
    /// A message in the sender's private chat with the bot.
    pub fn direct(sender: Sender, text: impl Into<String>) -> Self {
        Self {
            chat_id: sender.id,
            sender,
            text: text.into(),
        }
    }
}
