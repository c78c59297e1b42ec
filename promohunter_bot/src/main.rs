use promohunter_core::chat::run_chat_loop;
use promohunter_core::{ChatService, ConfigError, ConfigStore, SourceError, TransportError};
use std::process;
use thiserror::Error;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod telegram;

use telegram::TelegramTransport;

#[derive(Error, Debug)]
enum BotError {
    #[error("TELEGRAM_TOKEN not configured (set it in the environment or in the config file)")]
    MissingToken,

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source setup error: {0}")]
    Source(#[from] SourceError),

    #[error("Telegram error: {0}")]
    Transport(#[from] TransportError),
}

#[tokio::main]
async fn main() {
    let config = match ConfigStore::new_default().load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", BotError::from(e));
            process::exit(1);
        }
    };

    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_level.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(config).await {
        error!("{}", e);
        process::exit(1);
    }
}

async fn run(config: promohunter_core::AppConfig) -> Result<(), BotError> {
    info!("Starting PromoHunter bot");

    let token = config
        .telegram_token
        .clone()
        .filter(|t| !t.trim().is_empty())
        .ok_or(BotError::MissingToken)?;

    let service = ChatService::from_config(&config)?;
    let mut transport = TelegramTransport::new(&token)?;

    let me = transport.get_me().await?;
    info!(
        bot = me.username.as_deref().unwrap_or(&me.first_name),
        sources = ?config.sources,
        policy = %config.default_policy,
        "Bot ready, polling for messages"
    );

    tokio::select! {
        result = run_chat_loop(&mut transport, &service) => result?,
        _ = tokio::signal::ctrl_c() => info!("Shutting down"),
    }

    Ok(())
}
