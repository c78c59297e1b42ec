use crate::cli::Cli;
use crate::commands::Result;
use crate::output::{format_output, OutputData, SourceInfo};
use promohunter_core::{AppConfig, Store};

pub async fn run(cli: &Cli, config: &AppConfig) -> Result<()> {
    format_output(&OutputData::SourceList(source_infos(config)), &cli.output)
}

/// Every known store; enabled ones first, in search order.
pub fn source_infos(config: &AppConfig) -> Vec<SourceInfo> {
    let enabled = config.sources.iter().copied();
    let disabled = Store::ALL
        .into_iter()
        .filter(|s| !config.sources.contains(s));

    enabled
        .chain(disabled)
        .map(|store| SourceInfo {
            store,
            key: store.key().to_string(),
            name: store.display_name().to_string(),
            endpoint: config.endpoints.for_store(store).to_string(),
            position: config.sources.iter().position(|s| *s == store).map(|p| p + 1),
        })
        .collect()
}
