use crate::cli::Cli;
use crate::commands::{CommandError, Result};
use crate::output::{format_output, OutputData};
use indicatif::{ProgressBar, ProgressStyle};
use promohunter_core::search::Aggregator;
use promohunter_core::{build_sources, select, AppConfig, RankingPolicy, Store};
use tracing::debug;

/// Run a search across the configured (or given) stores.
///
/// # Arguments
/// - `query`: Search terms, joined with spaces
/// - `policy`: Ranking policy (defaults to the configured one)
/// - `sources`: Comma-separated store list overriding the configured order
/// - `timeout_secs`: Per-store timeout override
/// - `show_all`: List every product, not just the top picks
pub async fn run(
    cli: &Cli,
    config: &AppConfig,
    query: &[String],
    policy: Option<RankingPolicy>,
    sources: Option<&str>,
    timeout_secs: Option<u64>,
    show_all: bool,
) -> Result<()> {
    let query = query.join(" ");
    let query = query.trim();
    if query.is_empty() {
        return Err(CommandError::InvalidInput(
            "Missing search query. Usage: promohunter search \"<query>\"".to_string(),
        ));
    }

    let mut config = config.clone();
    if let Some(list) = sources {
        config.sources = parse_store_list(list)?;
    }
    if let Some(secs) = timeout_secs {
        config.source_timeout_ms = timeout_millis(secs)?;
    }
    config.validate()?;
    let policy = policy.unwrap_or(config.default_policy);

    let store_names: Vec<&str> = config.sources.iter().map(|s| s.display_name()).collect();
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner()),
    );
    spinner.set_message(format!(
        "Searching {} for '{}'...",
        store_names.join(", "),
        query
    ));
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));

    let aggregator = Aggregator::new(build_sources(&config)?).with_timeout(config.source_timeout());
    let result = aggregator.search(query).await;
    let selected = select(&result.all_products, policy);

    spinner.finish_and_clear();
    debug!(
        total = result.total_count(),
        selected = selected.len(),
        "search complete"
    );

    let output_data = OutputData::SearchResults {
        policy,
        result,
        selected,
        show_all,
    };
    format_output(&output_data, &cli.output)
}

/// Parse `magalu,kabum` into stores, keeping the given order.
pub fn parse_store_list(list: &str) -> Result<Vec<Store>> {
    let mut stores = Vec::new();
    for name in list.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let store = name
            .parse::<Store>()
            .map_err(|e| CommandError::InvalidInput(format!("{} (known: magalu, kabum)", e)))?;
        if !stores.contains(&store) {
            stores.push(store);
        }
    }
    if stores.is_empty() {
        return Err(CommandError::InvalidInput("no stores given".to_string()));
    }
    Ok(stores)
}

/// `--timeout` seconds as milliseconds.
fn timeout_millis(secs: u64) -> Result<u64> {
    if secs == 0 {
        return Err(CommandError::InvalidInput(
            "--timeout must be at least 1 second".to_string(),
        ));
    }
    secs.checked_mul(1000)
        .ok_or_else(|| CommandError::InvalidInput(format!("--timeout {} is too large", secs)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_store_list() {
        assert_eq!(
            parse_store_list("kabum, magalu").unwrap(),
            vec![Store::Kabum, Store::Magalu]
        );
        assert_eq!(parse_store_list("kabum,kabum").unwrap(), vec![Store::Kabum]);
        assert!(parse_store_list("amazon").is_err());
        assert!(parse_store_list(" , ").is_err());
    }

    #[test]
    fn test_timeout_millis() {
        assert_eq!(timeout_millis(10).unwrap(), 10_000);
        assert!(timeout_millis(0).is_err());
        assert!(timeout_millis(18_446_744_073_709_552).is_err());
        assert!(timeout_millis(u64::MAX).is_err());
    }
}
