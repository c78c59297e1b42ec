use clap::{Parser, Subcommand, ValueEnum};
use promohunter_core::RankingPolicy;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "promohunter")]
#[command(about = "PromoHunter - find the best deals across Brazilian online stores")]
#[command(version)]
#[command(after_help = "\x1b[1;36mQuick Start:\x1b[0m
  promohunter search mouse gamer              Cheapest offers across every store
  promohunter search ssd 1tb -p best_value    Rank by value for money
  promohunter search monitor -s kabum         Search a single store
  promohunter chat                            Talk to the bot in your terminal

\x1b[1;36mConfiguration:\x1b[0m
  promohunter config show                     View the effective configuration
  promohunter config init                     Write a default config file
  promohunter sources                         List the stores searched")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    /// Config file (default: ~/.config/promohunter/config.yaml)
    #[arg(long, global = true, env = "PROMOHUNTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search every configured store and show the best offers
    ///
    /// Products that are unavailable or have no price are never ranked.
    #[command(after_help = "\x1b[1;33mRanking Policies:\x1b[0m
  lowest_price   Cheapest first (default)
  best_value     Price, rating and discount combined
  best_rating    Best rated first, weighted by number of ratings

\x1b[1;33mExamples:\x1b[0m
  promohunter search \"mouse gamer\"
  promohunter search teclado mecanico --policy best_rating
  promohunter search headset -s magalu,kabum --timeout 10
  promohunter search cadeira --all --output json")]
    Search {
        /// What to look for
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,
        /// Ranking policy (lowest_price, best_value, best_rating)
        #[arg(short, long)]
        policy: Option<RankingPolicy>,
        /// Comma-separated list of stores to search, in order
        #[arg(short = 's', long = "sources")]
        sources: Option<String>,
        /// Per-store timeout in seconds
        #[arg(short, long)]
        timeout: Option<u64>,
        /// List every product found, not just the top picks
        #[arg(long)]
        all: bool,
    },

    /// Chat with the bot over stdin/stdout
    ///
    /// Each line is one message. Plain text searches; /help lists commands.
    Chat,

    /// List the stores and their endpoints
    Sources,

    /// Show or initialize configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Clone)]
pub enum ConfigAction {
    /// Show the effective configuration (file + environment)
    Show,
    /// Print the config file location
    Path,
    /// Write a config file with the defaults
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

#[derive(ValueEnum, Clone, Debug)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Pretty,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Plain text output
    Text,
    /// Markdown output, as the chat bot would send it
    Markdown,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_search_args() {
        let cli = Cli::parse_from([
            "promohunter",
            "search",
            "mouse",
            "gamer",
            "--policy",
            "best-value",
            "-s",
            "kabum",
            "--output",
            "json",
        ]);
        match cli.command {
            Some(Commands::Search {
                query,
                policy,
                sources,
                ..
            }) => {
                assert_eq!(query, vec!["mouse", "gamer"]);
                assert_eq!(policy, Some(RankingPolicy::BestValue));
                assert_eq!(sources.as_deref(), Some("kabum"));
            }
            _ => panic!("expected search command"),
        }
        assert!(matches!(cli.output, OutputFormat::Json));
    }

    #[test]
    fn test_unknown_policy_is_rejected() {
        assert!(Cli::try_parse_from(["promohunter", "search", "mouse", "-p", "fanciest"]).is_err());
    }
}
