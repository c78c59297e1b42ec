//! Concurrent fan-out over the registered source clients.

use super::{SearchResult, StoreResults};
use crate::error::SourceError;
use crate::normalize::normalize_all;
use crate::product::{Product, Store};
use crate::SourceClient;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::timeout;
use tracing::{info, info_span, warn, Instrument, Span};

/// Default per-source timeout in milliseconds
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 30_000;

/// Searches every registered store at once and merges what comes back.
///
/// A store that errors, times out or panics contributes zero products;
/// nothing a single store does can fail the search as a whole.
pub struct Aggregator {
    sources: Vec<Arc<dyn SourceClient>>,
    source_timeout: Duration,
    span: Span,
}

impl Aggregator {
    /// Create an aggregator over `sources`, searched in this order.
    pub fn new(sources: Vec<Arc<dyn SourceClient>>) -> Self {
        Self {
            sources,
            source_timeout: Duration::from_millis(DEFAULT_SOURCE_TIMEOUT_MS),
            span: info_span!("aggregator"),
        }
    }

    /// Builder method to set the per-source timeout.
    pub fn with_timeout(mut self, source_timeout: Duration) -> Self {
        self.source_timeout = source_timeout;
        self
    }

    /// Builder method to set the span all search events are recorded under.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    /// Registered stores, in registration order.
    pub fn stores(&self) -> Vec<Store> {
        self.sources.iter().map(|s| s.store()).collect()
    }

    pub fn source_timeout(&self) -> Duration {
        self.source_timeout
    }

    /// Run `query` against every store and wait for all of them.
    pub async fn search(&self, query: &str) -> SearchResult {
        let span = info_span!(parent: &self.span, "search", query = %query);
        self.execute_search(query).instrument(span).await
    }

    async fn execute_search(&self, query: &str) -> SearchResult {
        let start = Instant::now();
        let timeout_ms = self.source_timeout.as_millis() as u64;
        info!(sources = self.sources.len(), "search started");

        let futures: Vec<_> = self
            .sources
            .iter()
            .map(|source| {
                let source = Arc::clone(source);
                async move {
                    let store = source.store();
                    let started = Instant::now();
                    let outcome = fetch_one(source.as_ref(), query, self.source_timeout, timeout_ms).await;
                    (store, outcome, started.elapsed())
                }
            })
            .collect();

        // join_all yields outputs in input order, so registration order is
        // kept no matter which store answers first.
        let outcomes = futures::future::join_all(futures).await;

        let mut result = SearchResult::new(query);
        for (store, outcome, elapsed) in outcomes {
            match outcome {
                Ok(products) => {
                    info!(
                        store = store.key(),
                        count = products.len(),
                        elapsed_ms = elapsed.as_millis() as u64,
                        "store answered"
                    );
                    let mut store_results = StoreResults::new(store, products);
                    store_results.duration_ms = Some(elapsed.as_millis() as u64);
                    result.add_store(store_results);
                }
                Err(error) => {
                    warn!(
                        store = store.key(),
                        code = error.code_str(),
                        error = %error,
                        "store failed; counting it as zero results"
                    );
                    result.add_failure(store, error.to_string(), error.code_str(), error.is_timeout());
                }
            }
        }

        result.duration_ms = Some(start.elapsed().as_millis() as u64);
        info!(
            total = result.total_count(),
            failed = result.failures.len(),
            elapsed_ms = result.duration_ms.unwrap_or_default(),
            "search finished"
        );
        result
    }
}

/// Fetch and normalize one store, folding every failure mode into `SourceError`.
async fn fetch_one(
    source: &dyn SourceClient,
    query: &str,
    limit: Duration,
    timeout_ms: u64,
) -> Result<Vec<Product>, SourceError> {
    let store = source.store();
    let guarded = AssertUnwindSafe(source.fetch(query)).catch_unwind();

    match timeout(limit, guarded).await {
        Ok(Ok(Ok(records))) => Ok(normalize_all(&records, store)),
        Ok(Ok(Err(error))) => Err(error),
        Ok(Err(_panic)) => Err(SourceError::Unavailable(format!(
            "{} client panicked",
            store.key()
        ))),
        Err(_) => Err(SourceError::Timeout(timeout_ms)),
    }
}

/// One-shot search with default settings.
pub async fn search(query: &str, sources: &[Arc<dyn SourceClient>]) -> SearchResult {
    Aggregator::new(sources.to_vec()).search(query).await
}
