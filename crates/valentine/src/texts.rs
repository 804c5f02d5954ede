//! User-facing reply texts.

pub const MISSING_HANDLE: &str =
    "Sorry, you need to have a Telegram username to use this bot!";

pub const WELCOME: &str = "Welcome to Valentine Bot! 💝\n\n\
    Send /send_valentine to send an anonymous valentine message to someone special!";

pub const VALENTINE_RECEIVED: &str = "💘 Someone sent you a valentine message!";

pub const REPLIES_RELAYED: &str =
    "You can now reply to them through me, and I'll pass your messages along! 💝";

pub const ASK_TARGET: &str =
    "Please send me the Telegram username of the person you want to send a valentine to\n\
     (without the @ symbol)";

pub const EMPTY_TARGET: &str =
    "That doesn't look like a username. Please send the username of the person you want to send a valentine to.";

pub const SELF_TARGET: &str =
    "You can't send a valentine to yourself! Please try another username.";

pub const ASK_MESSAGE: &str =
    "Great! Now send me the message you want to send to them.\nMake it special! 💝";

pub const SAVE_FAILED: &str =
    "Sorry, there was an error saving your message. Please try again later.";

pub const RELAY_FAILED: &str = "Sorry, there was an error sending your message.";

pub const NOT_ADMIN: &str = "Sorry, this command is only available to administrators.";

pub const STATS_FAILED: &str = "Sorry, there was an error getting the statistics.";

pub const BROADCAST_USAGE: &str =
    "Please provide a message to broadcast.\nFormat: /broadcast your message";

pub const BROADCAST_FAILED: &str = "Sorry, there was an error broadcasting the message.";

pub const BROADCAST_PREFIX: &str = "📢 Broadcast Message:\n\n";

/// Confirmation after a valentine has been stored for `target`.
pub fn valentine_saved(target: &str) -> String {
    format!(
        "Your valentine message has been saved! ❤️\n\n\
         When @{} starts this bot, they'll receive your message with a lovely heart sticker!\n\
         You'll be able to chat with each other anonymously through me!",
        target
    )
}

/// Summary sent to the admin once a broadcast run is over.
pub fn broadcast_complete(sent: usize, failed: usize) -> String {
    format!(
        "📢 Broadcast Complete!\n\n✅ Successfully sent: {}\n❌ Failed: {}",
        sent, failed
    )
}
