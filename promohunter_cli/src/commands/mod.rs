pub mod chat;
pub mod config;
pub mod search;
pub mod sources;

use crate::cli::Cli;
use promohunter_core::{AppConfig, ConfigStore};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CommandError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Configuration error: {0}")]
    Config(#[from] promohunter_core::ConfigError),

    #[error("Source setup error: {0}")]
    Source(#[from] promohunter_core::SourceError),

    #[error("Chat transport error: {0}")]
    Transport(#[from] promohunter_core::TransportError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML serialization error: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

pub type Result<T> = std::result::Result<T, CommandError>;

/// The config store selected by `--config`, or the default location.
pub fn config_store(cli: &Cli) -> ConfigStore {
    match &cli.config {
        Some(path) => ConfigStore::new(path.clone()),
        None => ConfigStore::new_default(),
    }
}

/// File + environment, validated.
pub fn load_config(cli: &Cli) -> Result<AppConfig> {
    Ok(config_store(cli).load()?)
}
