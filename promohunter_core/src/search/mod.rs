//! Multi-store product search.
//!
//! This module provides:
//! - `Aggregator`: concurrent fan-out with a timeout per store
//! - `SearchResult`: per-store and flattened products for one query
//!
//! # Example
//!
//! ```ignore
//! use promohunter_core::search::Aggregator;
//!
//! let aggregator = Aggregator::new(sources);
//! let result = aggregator.search("mouse gamer").await;
//! println!("{} products", result.total_count());
//! ```

mod engine;
mod types;

pub use engine::{search, Aggregator, DEFAULT_SOURCE_TIMEOUT_MS};
pub use types::{SearchResult, SourceFailure, StoreResults};
