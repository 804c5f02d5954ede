//! Configuration loaded from environment variables.

use std::env;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

use reqwest::Url;
use valentine::AdminPolicy;

const DEFAULT_API_URL: &str = "https://api.telegram.org";

/// Bot process configuration.
#[derive(Clone)]
pub struct Config {
    /// Telegram bot token.
    pub bot_token: String,
    /// Who may run admin commands.
    pub admins: AdminPolicy,
    /// SQLite database URL.
    pub database_url: String,
    /// Bot API base URL.
    pub api_url: Url,
    /// Long-poll timeout for `getUpdates`.
    pub poll_timeout: Duration,
    /// Pause between broadcast sends.
    pub broadcast_delay: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `BOT_TOKEN` | Telegram bot token | (required) |
    /// | `ADMIN_USER_ID` | Admin user id, or a comma-separated list | none |
    /// | `SQLITE_PATH` | SQLite path or `sqlite:` URL | `./data/valentine.db` |
    /// | `TELEGRAM_API_URL` | Bot API base URL | `https://api.telegram.org` |
    /// | `POLL_TIMEOUT_SECS` | Long-poll timeout in seconds | `30` |
    /// | `BROADCAST_DELAY_MS` | Delay between broadcast sends | `50` |
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let bot_token = lookup("BOT_TOKEN")
            .map(|token| token.trim().to_string())
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingBotToken)?;

        let admins = match lookup("ADMIN_USER_ID") {
            Some(value) => AdminPolicy::from_str(&value)
                .map_err(|_| ConfigError::InvalidAdminId(value))?,
            None => AdminPolicy::none(),
        };

        let sqlite_path =
            lookup("SQLITE_PATH").unwrap_or_else(|| "./data/valentine.db".to_string());
        let database_url = sqlite_url_from_path(&sqlite_path);

        let api_url = lookup("TELEGRAM_API_URL").unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let api_url = Url::parse(api_url.trim()).map_err(|_| ConfigError::InvalidApiUrl(api_url))?;

        let poll_timeout = Duration::from_secs(parse_number(&lookup, "POLL_TIMEOUT_SECS", 30)?);
        let broadcast_delay =
            Duration::from_millis(parse_number(&lookup, "BROADCAST_DELAY_MS", 50)?);

        Ok(Self {
            bot_token,
            admins,
            database_url,
            api_url,
            poll_timeout,
            broadcast_delay,
        })
    }

    /// Directory that must exist before a file database can be created.
    pub fn database_dir(&self) -> Option<&Path> {
        let path = self.database_url.strip_prefix("sqlite:")?;
        let path = path.split('?').next()?;
        if path.is_empty() || path.starts_with(':') {
            return None;
        }
        Path::new(path)
            .parent()
            .filter(|parent| !parent.as_os_str().is_empty())
    }
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("bot_token", &"<redacted>")
            .field("admins", &self.admins.len())
            .field("database_url", &self.database_url)
            .field("api_url", &self.api_url.as_str())
            .field("poll_timeout", &self.poll_timeout)
            .field("broadcast_delay", &self.broadcast_delay)
            .finish()
    }
}

fn parse_number<F>(lookup: &F, var: &'static str, default: u64) -> Result<u64, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(var) {
        Some(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidNumber { var, value }),
        None => Ok(default),
    }
}

fn sqlite_url_from_path(path: &str) -> String {
    if path.starts_with("sqlite:") {
        path.to_string()
    } else {
        format!("sqlite:{}?mode=rwc", path)
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("BOT_TOKEN environment variable is required")]
    MissingBotToken,

    #[error("Invalid ADMIN_USER_ID: {0}")]
    InvalidAdminId(String),

    #[error("Invalid TELEGRAM_API_URL: {0}")]
    InvalidApiUrl(String),

    #[error("Invalid {var}: {value}")]
    InvalidNumber { var: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("BOT_TOKEN", "123:abc")]).unwrap();

        assert_eq!(config.bot_token, "123:abc");
        assert!(config.admins.is_empty());
        assert_eq!(config.database_url, "sqlite:./data/valentine.db?mode=rwc");
        assert_eq!(config.api_url.as_str(), "https://api.telegram.org/");
        assert_eq!(config.poll_timeout, Duration::from_secs(30));
        assert_eq!(config.broadcast_delay, Duration::from_millis(50));
        assert_eq!(config.database_dir(), Some(Path::new("./data")));
    }

    #[test]
    fn test_missing_token() {
        assert!(matches!(load(&[]), Err(ConfigError::MissingBotToken)));
        assert!(matches!(
            load(&[("BOT_TOKEN", "  ")]),
            Err(ConfigError::MissingBotToken)
        ));
    }

    #[test]
    fn test_admins() {
        let config = load(&[("BOT_TOKEN", "t"), ("ADMIN_USER_ID", "42,43")]).unwrap();
        assert!(config.admins.allows(42));
        assert!(config.admins.allows(43));

        assert!(matches!(
            load(&[("BOT_TOKEN", "t"), ("ADMIN_USER_ID", "admin")]),
            Err(ConfigError::InvalidAdminId(_))
        ));
    }

    #[test]
    fn test_invalid_numbers() {
        assert!(matches!(
            load(&[("BOT_TOKEN", "t"), ("POLL_TIMEOUT_SECS", "soon")]),
            Err(ConfigError::InvalidNumber {
                var: "POLL_TIMEOUT_SECS",
                ..
            })
        ));
        assert!(matches!(
            load(&[("BOT_TOKEN", "t"), ("BROADCAST_DELAY_MS", "-1")]),
            Err(ConfigError::InvalidNumber { .. })
        ));
    }

    #[test]
    fn test_api_url() {
        let config = load(&[("BOT_TOKEN", "t"), ("TELEGRAM_API_URL", "http://localhost:8081")])
            .unwrap();
        assert_eq!(config.api_url.host_str(), Some("localhost"));
        assert_eq!(config.api_url.port(), Some(8081));

        assert!(matches!(
            load(&[("BOT_TOKEN", "t"), ("TELEGRAM_API_URL", "not a url")]),
            Err(ConfigError::InvalidApiUrl(_))
        ));
    }

    #[test]
    fn test_sqlite_url_passthrough() {
        let config = load(&[("BOT_TOKEN", "t"), ("SQLITE_PATH", "sqlite::memory:")]).unwrap();
        assert_eq!(config.database_url, "sqlite::memory:");
        assert_eq!(config.database_dir(), None);

        let config = load(&[("BOT_TOKEN", "t"), ("SQLITE_PATH", "bot.db")]).unwrap();
        assert_eq!(config.database_dir(), None);
    }

    #[test]
    fn test_debug_hides_token() {
        let config = load(&[("BOT_TOKEN", "123:secret")]).unwrap();
        assert!(!format!("{:?}", config).contains("secret"));
    }
}
