use super::{decode_records, fetch_body, lenient, products_at, RawProductRecord, SourceSettings};
use crate::error::SourceError;
use crate::product::Store;
use crate::SourceClient;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT, ACCEPT_LANGUAGE, ORIGIN, REFERER};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

pub const DEFAULT_ENDPOINT: &str = "https://servicespub.prod.api.aws.grupokabum.com.br/catalog/v2/sponsored_products?query={query}&context=search";

/// Product pages live under `/produto/{id}/{product_link}`.
pub const PRODUCT_URL_BASE: &str = "https://www.kabum.com.br/produto";

const PRODUCTS_POINTER: &str = "/data";

/// One entry of the Kabum catalog `data` array.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KabumProduct {
    /// String or number
    pub id: Value,
    #[serde(deserialize_with = "lenient")]
    pub attributes: Option<KabumAttributes>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KabumAttributes {
    #[serde(deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub product_link: Option<String>,
    /// Image URLs; non-string entries are ignored
    pub images: Value,
    /// `{ "name": ... }`
    pub manufacturer: Value,
    #[serde(deserialize_with = "lenient")]
    pub description: Option<String>,
    #[serde(deserialize_with = "lenient")]
    pub available: Option<bool>,
    pub price: Value,
    pub price_with_discount: Value,
    pub old_price: Value,
    pub score_of_ratings: Value,
    pub number_of_ratings: Value,
    pub max_installment: Value,
    #[serde(deserialize_with = "lenient")]
    pub offer: Option<KabumOffer>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KabumOffer {
    #[serde(deserialize_with = "lenient")]
    pub name: Option<String>,
    pub price: Value,
    pub price_with_discount: Value,
    pub discount_percentage: Value,
}

pub struct KabumClient {
    client: Client,
    settings: SourceSettings,
}

impl KabumClient {
    pub fn new(settings: SourceSettings) -> Result<Self, SourceError> {
        let client = settings.build_client()?;
        Ok(Self { client, settings })
    }

    fn headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("*/*"));
        headers.insert(
            ACCEPT_LANGUAGE,
            HeaderValue::from_static("pt-BR,pt;q=0.9,en-US;q=0.8,en;q=0.7"),
        );
        headers.insert(ORIGIN, HeaderValue::from_static("https://www.kabum.com.br"));
        headers.insert(REFERER, HeaderValue::from_static("https://www.kabum.com.br/"));
        headers.insert(
            HeaderName::from_static("client-id"),
            HeaderValue::from_static("kabum"),
        );
        headers
    }
}

#[async_trait]
impl SourceClient for KabumClient {
    fn store(&self) -> Store {
        Store::Kabum
    }

    async fn fetch(&self, query: &str) -> Result<Vec<RawProductRecord>, SourceError> {
        let url = self.settings.url_for(query);
        debug!(store = "kabum", %url, "requesting sponsored catalog");

        let request = self.client.get(&url).headers(Self::headers());
        let body = fetch_body(Store::Kabum, request).await?;
        let records = parse_response(&body)?;
        if records.is_empty() {
            debug!(store = "kabum", body_len = body.len(), "catalog returned no products");
        }
        Ok(records)
    }
}

/// Decode a Kabum catalog payload into raw records.
pub fn parse_response(body: &str) -> Result<Vec<RawProductRecord>, SourceError> {
    let payload: Value = serde_json::from_str(body)?;
    let items = products_at(&payload, PRODUCTS_POINTER)?;
    Ok(decode_records(Store::Kabum, items, RawProductRecord::Kabum))
}
