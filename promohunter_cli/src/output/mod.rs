use crate::cli::OutputFormat;
use crate::commands::Result;
use promohunter_core::presenter::{render_reply, OutgoingMessage};
use promohunter_core::{Product, RankingPolicy, SearchResult, Store};
use serde::Serialize;
use serde_json::Value;

mod pretty;
pub use pretty::{format_search, format_sources};

/// One configurable store, as listed by `promohunter sources`.
#[derive(Debug, Clone, Serialize)]
pub struct SourceInfo {
    pub store: Store,
    pub key: String,
    pub name: String,
    pub endpoint: String,
    /// 1-based registration position; `None` when the store is disabled
    pub position: Option<usize>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum OutputData {
    SearchResults {
        policy: RankingPolicy,
        result: SearchResult,
        selected: Vec<Product>,
        #[serde(skip)]
        show_all: bool,
    },
    SourceList(Vec<SourceInfo>),
    ConfigInfo(Value),
}

pub fn format_output(data: &OutputData, format: &OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(data)?);
        }
        OutputFormat::Yaml => {
            println!("{}", serde_yaml::to_string(data)?);
        }
        OutputFormat::Text => {
            print!("{}", format_text_output(data)?);
        }
        OutputFormat::Markdown => {
            print!("{}", format_markdown_output(data)?);
        }
        OutputFormat::Pretty => {
            format_pretty_output(data)?;
        }
    }
    Ok(())
}

fn format_text_output(data: &OutputData) -> Result<String> {
    let mut out = String::new();
    match data {
        OutputData::SearchResults {
            result,
            selected,
            show_all,
            ..
        } => {
            for store in &result.stores {
                out.push_str(&format!("{}: {} products\n", store.store.display_name(), store.count()));
            }
            out.push_str(&format!("Total: {} products\n", result.total_count()));
            let listed = if *show_all { result.all_products.as_slice() } else { selected.as_slice() };
            for (i, product) in listed.iter().enumerate() {
                out.push_str(&format!(
                    "{}. {}\t{:.2}\t{}\t{}\n",
                    i + 1,
                    product.name,
                    product.price,
                    product.source.key(),
                    product.url
                ));
            }
        }
        OutputData::SourceList(sources) => {
            for source in sources {
                let position = source.position.map(|p| p.to_string()).unwrap_or_default();
                out.push_str(&format!("{}\t{}\t{}\n", position, source.key, source.endpoint));
            }
        }
        OutputData::ConfigInfo(config) => {
            out.push_str("Configuration:\n");
            out.push_str(&serde_json::to_string_pretty(config)?);
            out.push('\n');
        }
    }
    Ok(out)
}

fn format_pretty_output(data: &OutputData) -> Result<()> {
    use owo_colors::OwoColorize;

    match data {
        OutputData::SearchResults {
            policy,
            result,
            selected,
            show_all,
        } => {
            print!("{}", format_search(result, selected, *policy, *show_all));
        }
        OutputData::SourceList(sources) => {
            println!("{}", "Stores".cyan().bold());
            println!();
            println!("{}", format_sources(sources));
        }
        OutputData::ConfigInfo(config) => {
            println!("{}", "Configuration".cyan().bold());
            println!();
            print!("{}", serde_yaml::to_string(config)?);
        }
    }
    Ok(())
}

/// The same Markdown the chat bot sends.
fn format_markdown_output(data: &OutputData) -> Result<String> {
    let mut out = String::new();
    match data {
        OutputData::SearchResults {
            result, selected, ..
        } => {
            for message in render_reply(result, selected) {
                match message {
                    OutgoingMessage::Text { text } => out.push_str(&text),
                    OutgoingMessage::Photo { url, caption } => {
                        out.push_str(&format!("![product]({})\n\n{}", url, caption));
                    }
                }
                out.push_str("\n\n");
            }
        }
        OutputData::SourceList(sources) => {
            out.push_str("# Stores\n\n");
            for source in sources {
                out.push_str(&format!("## {}\n\n", source.name));
                out.push_str(&format!("- **Key:** {}\n", source.key));
                out.push_str(&format!("- **Endpoint:** `{}`\n", source.endpoint));
                let enabled = if source.position.is_some() { "yes" } else { "no" };
                out.push_str(&format!("- **Enabled:** {}\n\n", enabled));
            }
        }
        OutputData::ConfigInfo(config) => {
            out.push_str("# Configuration\n\n```yaml\n");
            out.push_str(&serde_yaml::to_string(config)?);
            out.push_str("```\n");
        }
    }
    Ok(out)
}
