//! Top-N selection over normalized products.

use crate::product::Product;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Maximum number of products a policy returns.
pub const TOP_N: usize = 5;

/// Products returned when nothing passes the availability/price filter.
pub const DEGRADED_TOP_N: usize = 3;

// best_value weights
const PRICE_WEIGHT: f64 = 0.5;
const RATING_WEIGHT: f64 = 0.3;
const DISCOUNT_WEIGHT: f64 = 0.2;

/// Price at which the price score halves.
const PRICE_SCALE: f64 = 1000.0;

/// Discount percentage that maxes out the discount score.
const DISCOUNT_CAP: f64 = 50.0;

/// How candidates are ordered before truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RankingPolicy {
    /// Cheapest first (default)
    #[default]
    LowestPrice,
    /// Weighted blend of price, rating and discount
    BestValue,
    /// Rating average weighted by rating volume
    BestRating,
}

impl RankingPolicy {
    pub const ALL: [RankingPolicy; 3] = [
        RankingPolicy::LowestPrice,
        RankingPolicy::BestValue,
        RankingPolicy::BestRating,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            RankingPolicy::LowestPrice => "lowest_price",
            RankingPolicy::BestValue => "best_value",
            RankingPolicy::BestRating => "best_rating",
        }
    }

    /// Order an already filtered candidate list and keep the top N.
    fn apply(&self, mut candidates: Vec<Product>) -> Vec<Product> {
        match self {
            RankingPolicy::LowestPrice => {
                candidates.sort_by(|a, b| a.price.total_cmp(&b.price));
            }
            RankingPolicy::BestValue => sort_descending_by(&mut candidates, value_score),
            RankingPolicy::BestRating => sort_descending_by(&mut candidates, rating_score),
        }
        candidates.truncate(TOP_N);
        candidates
    }
}

impl fmt::Display for RankingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for RankingPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "lowest_price" | "cheapest" | "price" => Ok(RankingPolicy::LowestPrice),
            "best_value" | "value" => Ok(RankingPolicy::BestValue),
            "best_rating" | "rating" | "rated" => Ok(RankingPolicy::BestRating),
            other => Err(format!(
                "unknown ranking policy '{}' (expected lowest_price, best_value or best_rating)",
                other
            )),
        }
    }
}

/// Select at most [`TOP_N`] products under `policy`.
///
/// Only available, priced products are ranked. If none qualify, the
/// first [`DEGRADED_TOP_N`] products of the unfiltered input are
/// returned as-is.
pub fn select(products: &[Product], policy: RankingPolicy) -> Vec<Product> {
    match rankable(products) {
        Some(candidates) => policy.apply(candidates),
        None => degraded(products),
    }
}

/// Like [`select`] but takes a policy name.
///
/// Unrecognized names rank nothing: the first [`TOP_N`] filtered
/// products are returned in input order.
pub fn select_by_name(products: &[Product], policy: &str) -> Vec<Product> {
    match policy.parse::<RankingPolicy>() {
        Ok(policy) => select(products, policy),
        Err(_) => match rankable(products) {
            Some(mut candidates) => {
                candidates.truncate(TOP_N);
                candidates
            }
            None => degraded(products),
        },
    }
}

/// `0.5 * price + 0.3 * rating + 0.2 * discount`, each in [0, 1].
pub fn value_score(product: &Product) -> f64 {
    let price_score = 1.0 / (product.price / PRICE_SCALE + 1.0);
    let rating_score = (product.rating.average / 5.0) * product.rating.confidence();
    let discount_score = (product.discount_percent / DISCOUNT_CAP).min(1.0);

    price_score * PRICE_WEIGHT + rating_score * RATING_WEIGHT + discount_score * DISCOUNT_WEIGHT
}

/// Rating average discounted for products with few ratings.
pub fn rating_score(product: &Product) -> f64 {
    product.rating.average * product.rating.confidence()
}

fn rankable(products: &[Product]) -> Option<Vec<Product>> {
    let candidates: Vec<Product> = products
        .iter()
        .filter(|p| p.is_rankable())
        .cloned()
        .collect();
    (!candidates.is_empty()).then_some(candidates)
}

fn degraded(products: &[Product]) -> Vec<Product> {
    products.iter().take(DEGRADED_TOP_N).cloned().collect()
}

/// Stable descending sort on a float key.
fn sort_descending_by(products: &mut [Product], score: fn(&Product) -> f64) {
    products.sort_by(|a, b| score(b).total_cmp(&score(a)));
}
