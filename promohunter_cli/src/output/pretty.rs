//! Pretty formatter for terminal output.
//!
//! - Whitespace between logical groups
//! - Bold titles, dimmed metadata, colored prices and links
//! - Card-like grouping for products
//! - Partial-result warnings and timing at the end

use super::SourceInfo;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, ContentArrangement, Table};
use owo_colors::OwoColorize;
use promohunter_core::{Product, RankingPolicy, SearchResult};

/// Terminal width for formatting (default fallback)
const DEFAULT_WIDTH: usize = 80;

/// Longest product title on a card
const TITLE_WIDTH: usize = 70;

// ============================================================================
// Search Results
// ============================================================================

/// Render a search: per-store counts, top picks, optionally every product.
pub fn format_search(
    result: &SearchResult,
    selected: &[Product],
    policy: RankingPolicy,
    show_all: bool,
) -> String {
    let width = terminal_width();
    let mut output = String::new();

    output.push_str(&format!(
        "{} {}  {} {}\n\n",
        "Search:".bold().cyan(),
        result.query.yellow(),
        "policy:".dimmed(),
        policy.name().green()
    ));

    for store in &result.stores {
        let count = store.count().to_string();
        let count = if store.products.is_empty() {
            count.dimmed().to_string()
        } else {
            count.green().bold().to_string()
        };
        output.push_str(&format!(
            "   {} {:<8} {} products\n",
            store.store.emoji(),
            store.store.display_name(),
            count
        ));
    }
    output.push('\n');

    if result.is_empty() {
        output.push_str(&format!("   {}\n", "No products found.".yellow()));
        output.push_str(&format!(
            "   {}\n",
            "Try simpler terms, specific keywords, or check the spelling.".dimmed()
        ));
    } else {
        output.push_str(&format_section_header("Top picks", Some(selected.len()), width));
        output.push_str("\n\n");
        for (i, product) in selected.iter().enumerate() {
            output.push_str(&format_card(product, i + 1));
            output.push('\n');
        }

        if let Some(line) = comparison_line(selected) {
            output.push_str(&line);
            output.push('\n');
        }

        if show_all {
            for store in &result.stores {
                output.push('\n');
                output.push_str(&format_section_header(
                    store.store.display_name(),
                    Some(store.count()),
                    width,
                ));
                output.push_str("\n\n");
                for (i, product) in store.products.iter().enumerate() {
                    output.push_str(&format_card(product, i + 1));
                    output.push('\n');
                }
            }
        }
    }

    if result.is_partial() {
        output.push('\n');
        output.push_str(&format!("{}\n", "⚠ Partial results - some stores failed:".yellow()));
        for failure in &result.failures {
            let timeout_marker = if failure.is_timeout { " (timeout)" } else { "" };
            output.push_str(&format!(
                "   {} {}: {}{}\n",
                "•".dimmed(),
                failure.store.display_name().yellow(),
                failure.error.dimmed(),
                timeout_marker.dimmed()
            ));
        }
    }

    if let Some(duration) = result.duration_ms {
        output.push('\n');
        output.push_str(&format!("{}\n", format!("Completed in {}ms", duration).dimmed()));
    }

    output
}

fn format_card(product: &Product, index: usize) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        " {:>3}. {} {}\n",
        index.to_string().cyan().bold(),
        truncate_str(&product.name, TITLE_WIDTH).bold(),
        format!("[{}]", product.source.display_name()).dimmed()
    ));

    let mut price = format!("R$ {:.2}", product.price).green().bold().to_string();
    if product.is_discounted() {
        price.push_str(&format!(
            " {} {}",
            format!("R$ {:.2}", product.full_price).strikethrough().dimmed(),
            format!("-{:.0}%", product.discount_percent).red()
        ));
    }
    if !product.available {
        price.push_str(&format!(" {}", "unavailable".red()));
    }
    output.push_str(&format!("      {}\n", price));

    let mut meta = Vec::new();
    if product.brand != promohunter_core::normalize::UNKNOWN {
        meta.push(product.brand.clone());
    }
    if product.rating.average > 0.0 {
        meta.push(format!(
            "★ {:.1} ({})",
            product.rating.average, product.rating.count
        ));
    }
    if !product.installment_info.is_empty() {
        meta.push(product.installment_info.clone());
    }
    if let Some(offer) = &product.offer {
        meta.push(format!("{} R$ {:.2}", offer.name, offer.price));
    }
    if !meta.is_empty() {
        output.push_str(&format!("      {}\n", meta.join(" · ").dimmed()));
    }

    if !product.url.is_empty() {
        output.push_str(&format!(
            "      {}\n",
            format_hyperlink(&product.url, &product.url).blue()
        ));
    }

    output
}

fn comparison_line(selected: &[Product]) -> Option<String> {
    if selected.len() < 2 {
        return None;
    }
    let cheapest = selected
        .iter()
        .fold(&selected[0], |best, p| if p.price < best.price { p } else { best });
    let priciest = selected
        .iter()
        .fold(&selected[0], |worst, p| if p.price > worst.price { p } else { worst });

    Some(format!(
        "{} cheapest {} ({}), most expensive {} ({}), spread {}",
        "Compare:".dimmed(),
        format!("R$ {:.2}", cheapest.price).green(),
        cheapest.source.display_name(),
        format!("R$ {:.2}", priciest.price).yellow(),
        priciest.source.display_name(),
        format!("R$ {:.2}", priciest.price - cheapest.price).bold()
    ))
}

// ============================================================================
// Sources
// ============================================================================

pub fn format_sources(sources: &[SourceInfo]) -> String {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(terminal_width() as u16)
        .set_header(vec!["#", "Store", "Key", "Endpoint"]);

    for source in sources {
        let order = source
            .position
            .map(|p| p.to_string())
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            order,
            source.name.clone(),
            source.key.clone(),
            truncate_str(&source.endpoint, 60),
        ]);
    }

    table.to_string()
}

// ============================================================================
// Section Headers
// ============================================================================

fn format_section_header(label: &str, count: Option<usize>, width: usize) -> String {
    let count_str = match count {
        Some(n) => format!(" ({})", n),
        None => String::new(),
    };

    let header_text = format!("{}{}", label, count_str);
    let line_len = (width.saturating_sub(header_text.len() + 4)).min(60);
    let line = "─".repeat(line_len);

    format!(
        "{} {} {}",
        "──".cyan(),
        header_text.green().bold(),
        line.cyan()
    )
}

fn truncate_str(s: &str, max_len: usize) -> String {
    // Take first line only
    let first_line = s.lines().next().unwrap_or(s);

    if first_line.chars().count() <= max_len {
        first_line.to_string()
    } else {
        let truncated: String = first_line.chars().take(max_len - 3).collect();
        format!("{}...", truncated)
    }
}

fn terminal_width() -> usize {
    terminal_size::terminal_size()
        .map(|(w, _)| w.0 as usize)
        .unwrap_or(DEFAULT_WIDTH)
}

/// Format a URL as a clickable hyperlink using OSC 8 escape sequences.
fn format_hyperlink(url: &str, display_text: &str) -> String {
    format!("\x1b]8;;{}\x07{}\x1b]8;;\x07", url, display_text)
}
