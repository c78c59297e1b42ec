//! Chat-ready text for search results.
//!
//! Everything here is pure formatting: no I/O and no failure modes.
//! Output uses the Markdown flavour chat clients understand
//! (`**bold**`, `~~strike~~`, `[text](url)`).

use crate::product::Product;
use crate::search::SearchResult;
use serde::{Deserialize, Serialize};
use std::fmt::Write;

/// Longest product name shown on a card.
pub const MAX_NAME_CHARS: usize = 80;

/// A reply ready to hand to a chat transport.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutgoingMessage {
    Text { text: String },
    Photo { url: String, caption: String },
}

impl OutgoingMessage {
    pub fn text(text: impl Into<String>) -> Self {
        OutgoingMessage::Text { text: text.into() }
    }

    /// The message body; the caption for photos.
    pub fn body(&self) -> &str {
        match self {
            OutgoingMessage::Text { text } => text,
            OutgoingMessage::Photo { caption, .. } => caption,
        }
    }
}

/// Render one product as a card. `rank` is 1-based.
pub fn format_product(product: &Product, rank: usize) -> String {
    let mut card = String::new();

    let _ = writeln!(
        card,
        "{} **{}. {}**",
        product.source.emoji(),
        rank,
        truncate_chars(&product.name, MAX_NAME_CHARS)
    );
    let _ = writeln!(card, "🏪 {}", product.source.display_name());
    let _ = writeln!(card, "🏷️ {}", product.brand);

    let _ = write!(card, "💰 **{}**", money(product.price));
    if product.is_discounted() {
        let _ = write!(
            card,
            " ~~{}~~ ({:.0}% OFF)",
            money(product.full_price),
            product.discount_percent
        );
    }
    card.push('\n');

    if product.rating.average > 0.0 {
        let line = format!(
            "{} {:.1}/5 ({} ratings)",
            stars(product.rating.average),
            product.rating.average,
            product.rating.count
        );
        let _ = writeln!(card, "{}", line.trim_start());
    }

    if !product.installment_info.is_empty() {
        let _ = writeln!(card, "💳 {}", product.installment_info);
    }

    if let Some(offer) = &product.offer {
        let _ = writeln!(card, "🎉 **{}** - {}", offer.name, money(offer.price));
    }

    if !product.payment_method_note.is_empty() {
        let _ = writeln!(card, "🧾 {}", product.payment_method_note);
    }

    let link = if product.url.is_empty() { "#" } else { product.url.as_str() };
    let _ = writeln!(card, "🔗 [View product]({})", link);

    card
}

/// Header shown before the product cards.
///
/// Failed stores are counted like stores that found nothing.
pub fn format_summary(result: &SearchResult, selected: &[Product]) -> String {
    let mut summary = format!("🔍 **Search: {}**\n\n", result.query);

    if result.is_empty() {
        summary.push_str("❌ No products found in the stores searched.\n\n");
        summary.push_str("💡 **Tips:**\n");
        summary.push_str("• Try simpler terms (e.g. 'notebook' instead of 'notebook gamer asus')\n");
        summary.push_str("• Use specific keywords\n");
        summary.push_str("• Check the spelling\n\n");
        summary.push_str("Send another term to search! 😊");
        return summary;
    }

    summary.push_str("📊 **Results found:**\n");
    for store in &result.stores {
        let _ = writeln!(
            summary,
            "{} {}: {} products",
            store.store.emoji(),
            store.store.display_name(),
            store.count()
        );
    }
    let _ = writeln!(summary, "📦 Total: {} products\n", result.total_count());
    let _ = write!(summary, "🏆 **Top {} best offers:**", selected.len());

    summary
}

/// Cheapest vs. most expensive of the selection, or `""` for fewer than two.
pub fn format_comparison(selected: &[Product]) -> String {
    let Some(first) = selected.first() else {
        return String::new();
    };
    if selected.len() < 2 {
        return String::new();
    }

    let mut cheapest = first;
    let mut priciest = first;
    for product in &selected[1..] {
        if product.price < cheapest.price {
            cheapest = product;
        }
        if product.price > priciest.price {
            priciest = product;
        }
    }

    let mut comparison = String::from("💡 **Quick comparison:**\n");
    let _ = writeln!(
        comparison,
        "💰 Cheapest: **{}** ({})",
        money(cheapest.price),
        cheapest.source.display_name()
    );
    let _ = writeln!(
        comparison,
        "💸 Most expensive: **{}** ({})",
        money(priciest.price),
        priciest.source.display_name()
    );
    let _ = write!(
        comparison,
        "💵 Savings: **{}**",
        money(priciest.price - cheapest.price)
    );

    comparison
}

/// The full reply for one search: summary, one message per product, comparison.
pub fn render_reply(result: &SearchResult, selected: &[Product]) -> Vec<OutgoingMessage> {
    let mut messages = Vec::with_capacity(selected.len() + 2);
    messages.push(OutgoingMessage::text(format_summary(result, selected)));

    for (index, product) in selected.iter().enumerate() {
        let card = format_product(product, index + 1);
        if product.image_url.is_empty() {
            messages.push(OutgoingMessage::text(card));
        } else {
            messages.push(OutgoingMessage::Photo {
                url: product.image_url.clone(),
                caption: card,
            });
        }
    }

    let comparison = format_comparison(selected);
    if !comparison.is_empty() {
        messages.push(OutgoingMessage::text(comparison));
    }

    messages
}

fn money(value: f64) -> String {
    format!("R$ {:.2}", value)
}

/// One star per whole point of the average.
fn stars(average: f64) -> String {
    "⭐".repeat(average.clamp(0.0, 5.0) as usize)
}

fn truncate_chars(text: &str, max: usize) -> String {
    text.chars().take(max).collect()
}
