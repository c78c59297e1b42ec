//! Per-query aggregate produced by the aggregator.

use crate::product::{Product, Store};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Products contributed by a single store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreResults {
    pub store: Store,

    /// Normalized products, in the order the store listed them
    pub products: Vec<Product>,

    /// Time taken by this store (ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl StoreResults {
    pub fn new(store: Store, products: Vec<Product>) -> Self {
        Self {
            store,
            products,
            duration_ms: None,
        }
    }

    pub fn count(&self) -> usize {
        self.products.len()
    }
}

/// A store that contributed nothing because its call failed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceFailure {
    pub store: Store,

    /// Error message
    pub error: String,

    /// Machine-readable error code (`unavailable`, `timeout`, `malformed_response`)
    pub code: String,

    /// Whether this was a timeout
    #[serde(default)]
    pub is_timeout: bool,
}

/// Everything one query produced, across all registered stores.
///
/// Failures are kept for diagnostics only; user-facing rendering treats
/// a failed store exactly like a store with no matches.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    /// The search query
    pub query: String,

    /// One entry per registered store, in registration order
    pub stores: Vec<StoreResults>,

    /// Concatenation of every store's products, in registration order
    pub all_products: Vec<Product>,

    /// Stores whose call failed or timed out
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<SourceFailure>,

    pub searched_at: DateTime<Utc>,

    /// Total time taken (ms)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl SearchResult {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            stores: Vec::new(),
            all_products: Vec::new(),
            failures: Vec::new(),
            searched_at: Utc::now(),
            duration_ms: None,
        }
    }

    /// Append a store's products.
    ///
    /// Callers must add stores in registration order; `all_products`
    /// follows the order of these calls.
    pub fn add_store(&mut self, results: StoreResults) {
        self.all_products.extend(results.products.iter().cloned());
        self.stores.push(results);
    }

    /// Record a failed store. It still gets an (empty) entry in `stores`.
    pub fn add_failure(&mut self, store: Store, error: impl Into<String>, code: &str, is_timeout: bool) {
        self.failures.push(SourceFailure {
            store,
            error: error.into(),
            code: code.to_string(),
            is_timeout,
        });
        self.stores.push(StoreResults::new(store, Vec::new()));
    }

    /// Products from one store; empty if the store failed or is not registered.
    pub fn products_for(&self, store: Store) -> &[Product] {
        self.stores
            .iter()
            .find(|s| s.store == store)
            .map(|s| s.products.as_slice())
            .unwrap_or(&[])
    }

    pub fn total_count(&self) -> usize {
        self.all_products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all_products.is_empty()
    }

    /// Whether results are partial (some stores failed or timed out).
    pub fn is_partial(&self) -> bool {
        !self.failures.is_empty()
    }

    /// Check if every registered store failed.
    pub fn all_failed(&self) -> bool {
        !self.stores.is_empty() && self.failures.len() == self.stores.len()
    }
}
