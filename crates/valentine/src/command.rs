//! Chat command parsing.
//!
//! Command names and their `/help`-style descriptions come from the
//! [`BotCommands`] derive on [`Command`]. [`parse`] adds the relay's own
//! leniency on top of it.

use teloxide::utils::command::{BotCommands, ParseError};

#[derive(BotCommands, Debug, Clone, PartialEq, Eq)]
#[command(
    rename_rule = "snake_case",
    description = "Anonymous valentines. These commands are supported:"
)]
pub enum Command {
    #[command(description = "register and pick up a waiting valentine.")]
    Start,
    #[command(description = "send an anonymous valentine.")]
    SendValentine,
    #[command(description = "bot statistics (admins only).")]
    Stats,
    #[command(description = "message every user (admins only).")]
    Broadcast(String),
}

/// How a piece of inbound text should be treated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input<'a> {
    /// A command for this bot.
    Command(Command),
    /// Starts with `/` but is not a command we know.
    UnknownCommand,
    /// A command addressed to a different bot (`/start@other_bot`).
    OtherBot,
    /// Plain text for the compose flow or the relay.
    Text(&'a str),
}

/// Classify inbound text.
///
/// Commands may carry an `@bot_username` suffix, as Telegram adds in menus.
/// When the bot's own username is unknown every suffix is accepted.
/// Anything starting with `/` is never treated as relay text.
pub fn parse<'a>(text: &'a str, bot_username: Option<&str>) -> Input<'a> {
    let trimmed = text.trim_start();
    if !trimmed.starts_with('/') {
        return Input::Text(text);
    }

    let (token, rest) = match trimmed.find(char::is_whitespace) {
        Some(idx) => (&trimmed[..idx], trimmed[idx..].trim()),
        None => (trimmed, ""),
    };
    let token = token.to_ascii_lowercase();

    let addressee = bot_username
        .or_else(|| token.split_once('@').map(|(_, bot)| bot))
        .unwrap_or_default();

    let line = if rest.is_empty() {
        token.clone()
    } else {
        format!("{} {}", token, rest)
    };

    match Command::parse(&line, addressee) {
        Ok(command) => Input::Command(command),
        // `/start <payload>` from deep links: the payload is dropped
        Err(ParseError::TooManyArguments { .. }) => match Command::parse(&token, addressee) {
            Ok(command) => Input::Command(command),
            Err(_) => Input::UnknownCommand,
        },
        // only `/broadcast` takes arguments, and its body may be empty
        Err(ParseError::TooFewArguments { .. }) => {
            Input::Command(Command::Broadcast(String::new()))
        }
        Err(ParseError::WrongBotName(_)) => Input::OtherBot,
        Err(_) => Input::UnknownCommand,
    }
}

/// Turn what a user typed as a target into a handle: surrounding
/// whitespace and one leading `@` are removed.
pub fn normalize_handle(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed.strip_prefix('@').unwrap_or(trimmed).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_commands() {
        assert_eq!(parse("/start", None), Input::Command(Command::Start));
        assert_eq!(parse("/start deep-link", None), Input::Command(Command::Start));
        assert_eq!(
            parse("/send_valentine", None),
            Input::Command(Command::SendValentine)
        );
        assert_eq!(parse("/stats", None), Input::Command(Command::Stats));
        assert_eq!(parse("/STATS", None), Input::Command(Command::Stats));
    }

    #[test]
    fn test_parse_leading_whitespace() {
        assert_eq!(parse("  /start", None), Input::Command(Command::Start));
        assert_eq!(
            parse("\n/send_valentine", Some("valentine_bot")),
            Input::Command(Command::SendValentine)
        );
        assert_eq!(parse("  /help", None), Input::UnknownCommand);
    }

    #[test]
    fn test_parse_broadcast_body() {
        assert_eq!(
            parse("/broadcast Happy Valentine's Day!", None),
            Input::Command(Command::Broadcast("Happy Valentine's Day!".to_string()))
        );
        assert_eq!(
            parse("/broadcast  line one\nline two ", None),
            Input::Command(Command::Broadcast("line one\nline two".to_string()))
        );
        assert_eq!(
            parse("/broadcast\nline one", None),
            Input::Command(Command::Broadcast("line one".to_string()))
        );
        assert_eq!(
            parse("/broadcast", None),
            Input::Command(Command::Broadcast(String::new()))
        );
        assert_eq!(
            parse("/broadcast   ", None),
            Input::Command(Command::Broadcast(String::new()))
        );
    }

    #[test]
    fn test_parse_bot_suffix() {
        assert_eq!(
            parse("/start@Valentine_Bot", Some("valentine_bot")),
            Input::Command(Command::Start)
        );
        assert_eq!(parse("/start@other_bot", Some("valentine_bot")), Input::OtherBot);
        assert_eq!(
            parse("/stats@anything", None),
            Input::Command(Command::Stats)
        );
    }

    #[test]
    fn test_parse_unknown_and_text() {
        assert_eq!(parse("/help", None), Input::UnknownCommand);
        assert_eq!(parse("/", None), Input::UnknownCommand);
        assert_eq!(parse("hello /start", None), Input::Text("hello /start"));
        assert_eq!(parse("@bob", None), Input::Text("@bob"));
    }

    #[test]
    fn test_descriptions_list_every_command() {
        let help = Command::descriptions().to_string();
        assert!(help.contains("/start"));
        assert!(help.contains("/send_valentine"));
        assert!(help.contains("/stats"));
        assert!(help.contains("/broadcast"));
    }

    #[test]
    fn test_normalize_handle() {
        assert_eq!(normalize_handle("@bob"), "bob");
        assert_eq!(normalize_handle("  bob "), "bob");
        assert_eq!(normalize_handle("@@bob"), "@bob");
        assert_eq!(normalize_handle("@"), "");
        assert_eq!(normalize_handle("bob@example"), "bob@example");
    }
}
