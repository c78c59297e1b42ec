//! Store record -> canonical [`Product`] mapping.
//!
//! Everything here is total: missing or oddly typed fields fall back to
//! documented defaults instead of failing the record.

use crate::product::{Offer, Product, Rating, Store};
use crate::stores::kabum::PRODUCT_URL_BASE;
use crate::stores::{KabumProduct, MagaluProduct, RawProductRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Placeholder for missing names and brands.
pub const UNKNOWN: &str = "unknown";

static NON_PRICE_CHARS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9.,]").unwrap());

/// Normalize one raw record.
///
/// `source` tags the resulting product; the record variant picks the
/// field mapping.
pub fn normalize(raw: &RawProductRecord, source: Store) -> Product {
    match raw {
        RawProductRecord::Magalu(record) => normalize_magalu(record, source),
        RawProductRecord::Kabum(record) => normalize_kabum(record, source),
    }
}

/// Normalize a whole listing, preserving order.
pub fn normalize_all(records: &[RawProductRecord], source: Store) -> Vec<Product> {
    records.iter().map(|r| normalize(r, source)).collect()
}

fn normalize_magalu(record: &MagaluProduct, source: Store) -> Product {
    let price_info = &record.price;

    let price = first_positive(&[price_info.get("bestPrice"), price_info.get("price")]);
    let full_price = first_positive(&[price_info.get("fullPrice"), price_info.get("price")]);
    let full_price = reference_price(price, full_price);

    let supplied_discount = price_info.get("discount").map(parse_price).unwrap_or(0.0);
    let discount_percent = if supplied_discount > 0.0 {
        round2(supplied_discount)
    } else {
        derive_discount(price, full_price)
    };

    Product {
        id: id_string(&record.id),
        name: text_or_unknown(record.title.as_deref()),
        url: record.url.clone().unwrap_or_default(),
        image_url: record.image.clone().unwrap_or_default(),
        brand: text_or_unknown(named(&record.brand).as_deref()),
        description: record.description.clone().unwrap_or_default(),
        available: record.available.unwrap_or(false),
        price,
        full_price,
        discount_percent,
        rating: parse_rating(record.rating.get("average"), record.rating.get("count")),
        installment_info: String::new(),
        offer: None,
        payment_method_note: price_info
            .get("paymentMethodDescription")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        source,
    }
}

fn normalize_kabum(record: &KabumProduct, source: Store) -> Product {
    let id = id_string(&record.id);
    let Some(attrs) = record.attributes.as_ref() else {
        let mut product = Product::new(source, id, UNKNOWN);
        product.url = format!("{}/{}/", PRODUCT_URL_BASE, product.id);
        return product;
    };

    let list_price = parse_price(&attrs.price);
    let discounted = parse_price(&attrs.price_with_discount);
    let old_price = parse_price(&attrs.old_price);

    let price = if discounted > 0.0 { discounted } else { list_price };
    let full_price = reference_price(price, if old_price > 0.0 { old_price } else { list_price });

    let offer = attrs.offer.as_ref().and_then(|offer| {
        let name = offer.name.as_deref().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return None;
        }
        Some(Offer {
            name: name.to_string(),
            price: first_positive(&[Some(&offer.price_with_discount), Some(&offer.price)]),
            discount_percent: parse_price(&offer.discount_percentage),
        })
    });

    Product {
        url: format!(
            "{}/{}/{}",
            PRODUCT_URL_BASE,
            id,
            attrs.product_link.as_deref().unwrap_or_default()
        ),
        id,
        name: text_or_unknown(attrs.title.as_deref()),
        image_url: attrs
            .images
            .as_array()
            .and_then(|images| images.iter().find_map(Value::as_str))
            .unwrap_or_default()
            .to_string(),
        brand: text_or_unknown(named(&attrs.manufacturer).as_deref()),
        description: attrs.description.clone().unwrap_or_default(),
        available: attrs.available.unwrap_or(false),
        price,
        full_price,
        discount_percent: derive_discount(price, full_price),
        rating: parse_rating(Some(&attrs.score_of_ratings), Some(&attrs.number_of_ratings)),
        installment_info: attrs
            .max_installment
            .as_str()
            .map(str::trim)
            .unwrap_or_default()
            .to_string(),
        offer,
        payment_method_note: String::new(),
        source,
    }
}

/// Parse a price-like JSON value.
///
/// Numbers pass through; strings go through [`parse_price_str`]; any
/// other shape is 0.0.
pub fn parse_price(value: &Value) -> f64 {
    match value {
        Value::Number(n) => n.as_f64().map(sanitize).unwrap_or(0.0),
        Value::String(s) => parse_price_str(s),
        _ => 0.0,
    }
}

/// Parse a price string such as `"R$ 1.234,56"` or `"129.90"`.
///
/// Everything except digits, commas and periods is dropped. When a comma
/// is present it is the decimal separator and periods are thousands
/// separators. Unparseable input yields 0.0.
pub fn parse_price_str(raw: &str) -> f64 {
    let cleaned = NON_PRICE_CHARS.replace_all(raw, "");
    let numeric = if cleaned.contains(',') {
        cleaned.replace('.', "").replace(',', ".")
    } else {
        cleaned.into_owned()
    };
    numeric.parse::<f64>().map(sanitize).unwrap_or(0.0)
}

/// Discount implied by a reference price, in percent with two decimals.
pub fn derive_discount(price: f64, full_price: f64) -> f64 {
    if full_price > price && price > 0.0 {
        round2((full_price - price) / full_price * 100.0)
    } else {
        0.0
    }
}

fn reference_price(price: f64, full_price: f64) -> f64 {
    if full_price > 0.0 {
        full_price
    } else {
        price
    }
}

fn first_positive(candidates: &[Option<&Value>]) -> f64 {
    candidates
        .iter()
        .flatten()
        .map(|v| parse_price(v))
        .find(|p| *p > 0.0)
        .unwrap_or(0.0)
}

fn parse_rating(average: Option<&Value>, count: Option<&Value>) -> Rating {
    let average = average.map(parse_price).unwrap_or(0.0).clamp(0.0, 5.0);
    let count = count.map(parse_price).unwrap_or(0.0).floor() as u64;
    Rating::new(average, count)
}

/// `{ "name": "X" }` or a bare string.
fn named(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Object(map) => map.get("name").and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}

fn id_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn text_or_unknown(text: Option<&str>) -> String {
    match text.map(str::trim) {
        Some(t) if !t.is_empty() => t.to_string(),
        _ => UNKNOWN.to_string(),
    }
}

fn sanitize(value: f64) -> f64 {
    if value.is_finite() {
        value.max(0.0)
    } else {
        0.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
