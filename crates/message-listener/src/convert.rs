//! Conversion from Telegram messages to valentine messages.

use teloxide::types::Message;
use valentine::{InboundMessage, Sender};

/// Extension trait for turning a Telegram [`Message`] into an
/// [`InboundMessage`].
pub trait MessageExt {
    /// The text and sender of this message, if it has both.
    ///
    /// No chat-type filtering happens here.
    fn to_inbound_message(&self) -> Option<InboundMessage>;
}

impl MessageExt for Message {
    fn to_inbound_message(&self) -> Option<InboundMessage> {
        let from = self.from.as_ref()?;
        let text = self.text()?;
        let id = i64::try_from(from.id.0).ok()?;

        let first_name = Some(from.first_name.clone()).filter(|name| !name.is_empty());

        Some(InboundMessage {
            chat_id: self.chat.id.0,
            sender: Sender {
                id,
                username: from.username.clone(),
                first_name,
                last_name: from.last_name.clone(),
            },
            text: text.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn private_message(from: serde_json::Value) -> Message {
        serde_json::from_value(json!({
            "message_id": 1,
            "date": 1_707_868_800,
            "chat": { "id": 42, "type": "private", "first_name": "Alice", "username": "alice" },
            "from": from,
            "text": "hello"
        }))
        .unwrap()
    }

    #[test]
    fn test_converts_text_message() {
        let message = private_message(json!({
            "id": 42,
            "is_bot": false,
            "first_name": "Alice",
            "username": "alice"
        }));
        let inbound = message.to_inbound_message().unwrap();

        assert_eq!(inbound.chat_id, 42);
        assert_eq!(inbound.sender.id, 42);
        assert_eq!(inbound.sender.handle(), Some("alice"));
        assert_eq!(inbound.sender.first_name.as_deref(), Some("Alice"));
        assert_eq!(inbound.sender.last_name, None);
        assert_eq!(inbound.text, "hello");
    }

    #[test]
    fn test_empty_first_name_is_dropped() {
        let message = private_message(json!({
            "id": 42,
            "is_bot": false,
            "first_name": "",
            "last_name": "Smith"
        }));
        let inbound = message.to_inbound_message().unwrap();

        assert_eq!(inbound.sender.first_name, None);
        assert_eq!(inbound.sender.last_name.as_deref(), Some("Smith"));
        assert_eq!(inbound.sender.handle(), None);
    }
}
