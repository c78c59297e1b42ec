use clap::Parser;
use owo_colors::OwoColorize;
use std::process;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;
mod commands;
mod output;

use cli::{Cli, Commands};
use commands::*;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // `config path/init` must work even when the file is broken.
    let config = match &cli.command {
        Some(Commands::Config { .. }) | None => None,
        Some(_) => match load_config(&cli) {
            Ok(config) => Some(config),
            Err(e) => {
                eprintln!("{}: {}", "Error".red().bold(), e);
                process::exit(1);
            }
        },
    };

    // Initialize logging (stderr, so stdout stays clean for JSON output)
    let default_level = match cli.verbose {
        0 => config
            .as_ref()
            .map(|c| c.log_level.clone())
            .unwrap_or_else(|| "warn".to_string()),
        1 => "debug".to_string(),
        _ => "trace".to_string(),
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_level.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let result = match (&cli.command, &config) {
        (None, _) => {
            show_overview();
            Ok(())
        }
        (Some(Commands::Config { action }), _) => config::run(&cli, action.clone()).await,
        (
            Some(Commands::Search {
                query,
                policy,
                sources,
                timeout,
                all,
            }),
            Some(config),
        ) => {
            search::run(
                &cli,
                config,
                query,
                *policy,
                sources.as_deref(),
                *timeout,
                *all,
            )
            .await
        }
        (Some(Commands::Chat), Some(config)) => chat::run(config).await,
        (Some(Commands::Sources), Some(config)) => sources::run(&cli, config).await,
        (Some(_), None) => Err(CommandError::InvalidInput(
            "configuration was not loaded".to_string(),
        )),
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        process::exit(1);
    }
}

fn show_overview() {
    println!();
    println!(
        "{}  {}",
        "PromoHunter".bold().cyan(),
        "- best deals across Brazilian online stores".dimmed()
    );
    println!();

    println!("{}", "Quick Start:".bold().cyan());
    println!(
        "  {}{}",
        "promohunter search \"mouse gamer\"".cyan(),
        "       Cheapest offers across every store".dimmed()
    );
    println!(
        "  {}{}",
        "promohunter search ssd -p best_value".cyan(),
        "   Rank by value for money".dimmed()
    );
    println!(
        "  {}{}",
        "promohunter chat".cyan(),
        "                       Chat with the bot in your terminal".dimmed()
    );
    println!();

    println!(
        "{} Use {} for full help",
        "Tip:".dimmed(),
        "promohunter --help".cyan()
    );
    println!();
}
