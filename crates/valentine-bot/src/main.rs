//! Telegram bot for anonymous valentines.
//!
//! Polls the Bot API for private messages and relays them until Ctrl+C.

mod config;

use broadcaster::TelegramSender;
use database::Database;
use message_listener::UpdateProcessor;
use teloxide::prelude::*;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use valentine::{Valentine, ValentineConfig};

use crate::config::Config;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = Config::from_env()?;
    if config.admins.is_empty() {
        warn!("ADMIN_USER_ID not set, admin commands are disabled");
    }

    let bot = Bot::new(&config.bot_token).set_api_url(config.api_url.clone());
    let me = bot.get_me().await?;
    let bot_username = me.user.username.clone();
    info!(
        "Connected to Telegram as @{}",
        bot_username.as_deref().unwrap_or("unknown")
    );

    if let Some(dir) = config.database_dir() {
        std::fs::create_dir_all(dir)?;
    }
    let db = Database::connect(&config.database_url).await?;
    db.migrate().await?;

    let valentine_config = ValentineConfig {
        admins: config.admins.clone(),
        broadcast_delay: config.broadcast_delay,
        bot_username,
    };
    let valentine = Valentine::new(db, TelegramSender::new(bot.clone()), valentine_config);

    info!("Valentine bot is running...");
    UpdateProcessor::new(valentine)
        .run(bot, config.poll_timeout)
        .await;

    info!("Valentine bot stopped");
    Ok(())
}
