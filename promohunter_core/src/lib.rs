// src/lib.rs
pub mod chat;
pub mod config;
pub mod error;
pub mod normalize;
pub mod presenter;
pub mod product;
pub mod ranking;
pub mod search;
pub mod stores;
pub mod transport;

use async_trait::async_trait;

pub use crate::chat::{ChatCommand, ChatService, ChatTransport, IncomingMessage};
pub use crate::config::{AppConfig, ConfigStore};
pub use crate::error::{ConfigError, SourceError, TransportError};
pub use crate::presenter::{format_comparison, format_product, format_summary, OutgoingMessage};
pub use crate::product::{Offer, Product, Rating, Store};
pub use crate::ranking::{select, select_by_name, RankingPolicy};
pub use crate::search::{Aggregator, SearchResult};
pub use crate::stores::{build_sources, RawProductRecord};

/// One store's search endpoint.
///
/// Implementations hold no mutable state between calls and are safe to
/// call concurrently. Zero matches is `Ok(vec![])`, never an error.
#[async_trait]
pub trait SourceClient: Send + Sync {
    /// The store this client talks to.
    fn store(&self) -> Store;

    /// Run one search and return the store's raw listings.
    async fn fetch(&self, query: &str) -> Result<Vec<RawProductRecord>, SourceError>;
}
