use crate::commands::Result;
use owo_colors::OwoColorize;
use promohunter_core::chat::run_chat_loop;
use promohunter_core::transport::StdioTransport;
use promohunter_core::{AppConfig, ChatService};

/// Interactive chat over stdin/stdout until EOF.
pub async fn run(config: &AppConfig) -> Result<()> {
    let service = ChatService::from_config(config)?;

    eprintln!(
        "{} {}",
        "PromoHunter chat".bold().cyan(),
        "- type a product name, /help for commands, Ctrl-D to quit".dimmed()
    );
    eprintln!();

    let mut transport = StdioTransport::new();
    run_chat_loop(&mut transport, &service).await?;
    Ok(())
}
