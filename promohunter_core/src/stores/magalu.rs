use super::{decode_records, fetch_body, lenient, products_at, RawProductRecord, SourceSettings};
use crate::error::SourceError;
use crate::product::Store;
use crate::SourceClient;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

/// Next.js data route of the Magalu storefront. The build id segment
/// rotates on every deploy, so it is overridable from config.
pub const DEFAULT_ENDPOINT: &str = "https://www.magazinevoce.com.br/_next/data/6cijUACDhFQyBEGYnV_Mr/magazinemagalushopbr/busca/{query}.json?path0=magazinemagalushopbr&path2={query}";

const PRODUCTS_POINTER: &str = "/pageProps/data/search/products";

/// One product as listed by Magalu search.
///
/// `price`, `brand` and `rating` are nested objects upstream but have
/// been seen as strings and nulls, so they stay as raw JSON until
/// normalization.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MagaluProduct {
    /// String or number
    pub id: Value,
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub url: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub image: Option<String>,
    /// `{ "name": ... }`
    pub brand: Value,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub available: Option<bool>,
    /// `{ bestPrice, price, fullPrice, discount, paymentMethodDescription }`
    pub price: Value,
    /// `{ average, count }`
    pub rating: Value,
}

pub struct MagaluClient {
    client: Client,
    settings: SourceSettings,
}

impl MagaluClient {
    pub fn new(settings: SourceSettings) -> Result<Self, SourceError> {
        let client = settings.build_client()?;
        Ok(Self { client, settings })
    }
}

#[async_trait]
impl SourceClient for MagaluClient {
    fn store(&self) -> Store {
        Store::Magalu
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawProductRecord>, SourceError> {
        let url = self.settings.url_for(query);
        debug!(store = "magalu", %url, "requesting search page data");

        let request = self
            .client
            .get(&url)
            .header("Accept", "application/json");
        let body = fetch_body(Store::Magalu, request).await?;
        parse_response(&body)
    }
}

/// Decode a Magalu search payload into raw records.
pub fn parse_response(body: &str) -> Result<Vec<RawProductRecord>, SourceError> {
    let payload: Value = serde_json::from_str(body)?;
    let items = products_at(&payload, PRODUCTS_POINTER)?;
    Ok(decode_records(Store::Magalu, items, RawProductRecord::Magalu))
}
