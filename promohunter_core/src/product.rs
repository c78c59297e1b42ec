//! Canonical product schema shared by ranking and presentation.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A store queried by the aggregator.
///
/// Closed set: adding a store means adding a variant, a raw record type
/// and a source client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Store {
    Magalu,
    Kabum,
}

impl Store {
    pub const ALL: [Store; 2] = [Store::Magalu, Store::Kabum];

    /// Config key (`magalu`, `kabum`).
    pub fn key(&self) -> &'static str {
        match self {
            Store::Magalu => "magalu",
            Store::Kabum => "kabum",
        }
    }

    /// Human-facing store name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Store::Magalu => "Magalu",
            Store::Kabum => "KaBuM!",
        }
    }

    pub fn emoji(&self) -> &'static str {
        match self {
            Store::Magalu => "🔵",
            Store::Kabum => "🟠",
        }
    }
}

impl fmt::Display for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Store {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "magalu" | "magazineluiza" | "magazine_luiza" => Ok(Store::Magalu),
            "kabum" | "kabuum" | "kabum!" => Ok(Store::Kabum),
            other => Err(format!("unknown store '{}'", other)),
        }
    }
}

/// Aggregate customer rating.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Rating {
    /// Average score in [0, 5]
    pub average: f64,
    /// Number of ratings
    pub count: u64,
}

impl Rating {
    pub fn new(average: f64, count: u64) -> Self {
        Self { average, count }
    }

    /// Rating confidence: saturates once ten ratings exist.
    pub fn confidence(&self) -> f64 {
        (self.count as f64 / 10.0).min(1.0)
    }
}

/// A store-side promotional offer attached to a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Offer {
    pub name: String,
    pub price: f64,
    pub discount_percent: f64,
}

/// A normalized, store-agnostic product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub url: String,
    pub image_url: String,
    pub brand: String,
    pub description: String,
    pub available: bool,

    /// Current purchase price; 0 means unknown
    pub price: f64,

    /// Reference price before discount
    pub full_price: f64,

    pub discount_percent: f64,
    pub rating: Rating,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub installment_info: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub offer: Option<Offer>,

    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub payment_method_note: String,

    pub source: Store,
}

impl Product {
    /// Create a product with every optional field at its default.
    pub fn new(source: Store, id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: String::new(),
            image_url: String::new(),
            brand: "unknown".to_string(),
            description: String::new(),
            available: false,
            price: 0.0,
            full_price: 0.0,
            discount_percent: 0.0,
            rating: Rating::default(),
            installment_info: String::new(),
            offer: None,
            payment_method_note: String::new(),
            source,
        }
    }

    /// Builder method to set price and reference price.
    pub fn with_prices(mut self, price: f64, full_price: f64) -> Self {
        self.price = price;
        self.full_price = full_price;
        self
    }

    /// Builder method to set availability.
    pub fn with_available(mut self, available: bool) -> Self {
        self.available = available;
        self
    }

    /// Builder method to set the rating.
    pub fn with_rating(mut self, average: f64, count: u64) -> Self {
        self.rating = Rating::new(average, count);
        self
    }

    /// Builder method to set the discount.
    pub fn with_discount(mut self, discount_percent: f64) -> Self {
        self.discount_percent = discount_percent;
        self
    }

    /// Builder method to set the product page URL.
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// Builder method to set the image URL.
    pub fn with_image(mut self, image_url: impl Into<String>) -> Self {
        self.image_url = image_url.into();
        self
    }

    /// Priced and purchasable: the only products the ranker scores.
    pub fn is_rankable(&self) -> bool {
        self.available && self.price > 0.0
    }

    pub fn is_discounted(&self) -> bool {
        self.full_price > self.price && self.discount_percent > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_parsing() {
        assert_eq!("magalu".parse::<Store>().unwrap(), Store::Magalu);
        assert_eq!(" KaBuM ".parse::<Store>().unwrap(), Store::Kabum);
        assert!("amazon".parse::<Store>().is_err());
    }

    #[test]
    fn test_rating_confidence_saturates() {
        assert_eq!(Rating::new(4.0, 5).confidence(), 0.5);
        assert_eq!(Rating::new(4.0, 250).confidence(), 1.0);
        assert_eq!(Rating::default().confidence(), 0.0);
    }

    #[test]
    fn test_rankable() {
        let p = Product::new(Store::Kabum, "1", "Mouse").with_prices(99.9, 99.9);
        assert!(!p.is_rankable());
        assert!(p.clone().with_available(true).is_rankable());
        assert!(!p.with_prices(0.0, 0.0).with_available(true).is_rankable());
    }

    #[test]
    fn test_serialization_uses_store_key() {
        let p = Product::new(Store::Magalu, "abc", "Teclado");
        let json = serde_json::to_string(&p).unwrap();
        assert!(json.contains("\"source\":\"magalu\""));
        assert!(!json.contains("installment_info"));
    }
}
