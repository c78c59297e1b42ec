use crate::cli::{Cli, ConfigAction};
use crate::commands::{config_store, load_config, CommandError, Result};
use crate::output::{format_output, OutputData};
use owo_colors::OwoColorize;
use promohunter_core::AppConfig;
use serde_json::{json, Value};

pub async fn run(cli: &Cli, action: ConfigAction) -> Result<()> {
    match action {
        ConfigAction::Show => show_config(cli).await,
        ConfigAction::Path => {
            println!("{}", config_store(cli).path().display());
            Ok(())
        }
        ConfigAction::Init { force } => init_config(cli, force).await,
    }
}

async fn show_config(cli: &Cli) -> Result<()> {
    let store = config_store(cli);
    let config = load_config(cli)?;

    let output_data = OutputData::ConfigInfo(config_json(
        &config,
        &store.path().display().to_string(),
        store.exists(),
    )?);
    format_output(&output_data, &cli.output)
}

/// Effective configuration; the bot token is reported only as present or absent.
fn config_json(config: &AppConfig, path: &str, file_exists: bool) -> Result<Value> {
    let mut value = serde_json::to_value(config)?;
    if let Value::Object(map) = &mut value {
        map.insert(
            "telegram_token_configured".to_string(),
            json!(config.has_telegram_token()),
        );
        map.insert(
            "config_file".to_string(),
            json!({ "path": path, "exists": file_exists }),
        );
    }
    Ok(value)
}

async fn init_config(cli: &Cli, force: bool) -> Result<()> {
    let store = config_store(cli);
    let path = store.path();

    if store.exists() && !force {
        return Err(CommandError::InvalidInput(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let yaml = serde_yaml::to_string(&AppConfig::default())?;
    std::fs::write(path, yaml)?;

    println!("{} {}", "Wrote".green().bold(), path.display());
    println!(
        "{}",
        "Set TELEGRAM_TOKEN in the environment (or telegram_token in the file) to run the bot."
            .dimmed()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_json_hides_token() {
        let config = AppConfig {
            telegram_token: Some("123:secret".to_string()),
            ..AppConfig::default()
        };
        let value = config_json(&config, "/tmp/config.yaml", false).unwrap();
        let text = value.to_string();
        assert!(!text.contains("123:secret"));
        assert_eq!(value["telegram_token_configured"], true);
        assert_eq!(value["default_policy"], "lowest_price");
        assert_eq!(value["sources"], json!(["magalu", "kabum"]));
        assert_eq!(value["config_file"]["exists"], false);
    }
}
