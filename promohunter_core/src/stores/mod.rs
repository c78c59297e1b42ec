//! Per-store source clients and their raw record shapes.
//!
//! Each store returns its own JSON layout. Records are decoded into a
//! store-specific struct and wrapped in [`RawProductRecord`]; only
//! [`crate::normalize`] looks inside them.

pub mod kabum;
pub mod magalu;

pub use kabum::{KabumAttributes, KabumClient, KabumOffer, KabumProduct};
pub use magalu::{MagaluClient, MagaluProduct};

use crate::config::AppConfig;
use crate::error::SourceError;
use crate::product::Store;
use crate::SourceClient;
use reqwest::{Client, RequestBuilder};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

/// Default request timeout for a single store call.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 10_000;

/// Browser-like user agent; both stores reject obvious bots.
pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// A raw listing as returned by one store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "store", content = "record", rename_all = "snake_case")]
pub enum RawProductRecord {
    Magalu(MagaluProduct),
    Kabum(KabumProduct),
}

impl RawProductRecord {
    pub fn store(&self) -> Store {
        match self {
            RawProductRecord::Magalu(_) => Store::Magalu,
            RawProductRecord::Kabum(_) => Store::Kabum,
        }
    }
}

/// Static request shaping shared by the store clients.
#[derive(Debug, Clone)]
pub struct SourceSettings {
    /// URL template; every `{query}` is replaced by the URL-encoded term
    pub endpoint: String,
    pub user_agent: String,
    pub request_timeout: Duration,
}

impl SourceSettings {
    pub fn new(endpoint: impl Into<String>) -> Self {
        Self {
            endpoint: endpoint.into(),
            user_agent: DEFAULT_USER_AGENT.to_string(),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }

    pub fn url_for(&self, query: &str) -> String {
        let encoded = urlencoding::encode(query.trim());
        self.endpoint.replace("{query}", &encoded)
    }

    pub(crate) fn build_client(&self) -> Result<Client, SourceError> {
        Ok(Client::builder()
            .user_agent(self.user_agent.clone())
            .timeout(self.request_timeout)
            .build()?)
    }
}

/// Build the configured source clients in registration order.
pub fn build_sources(config: &AppConfig) -> Result<Vec<Arc<dyn SourceClient>>, SourceError> {
    let mut sources: Vec<Arc<dyn SourceClient>> = Vec::with_capacity(config.sources.len());
    for store in &config.sources {
        let settings = config.source_settings(*store);
        let client: Arc<dyn SourceClient> = match store {
            Store::Magalu => Arc::new(MagaluClient::new(settings)?),
            Store::Kabum => Arc::new(KabumClient::new(settings)?),
        };
        sources.push(client);
    }
    Ok(sources)
}

/// Send a request and return the body of a 2xx response.
pub(crate) async fn fetch_body(store: Store, request: RequestBuilder) -> Result<String, SourceError> {
    let response = request.send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(SourceError::Unavailable(format!(
            "{} answered HTTP {}",
            store.key(),
            status
        )));
    }
    Ok(response.text().await?)
}

/// Locate the product array inside a decoded payload.
///
/// A missing or null path means zero results; anything other than an
/// array at that path is a malformed response.
pub(crate) fn products_at<'a>(payload: &'a Value, pointer: &str) -> Result<&'a [Value], SourceError> {
    if !payload.is_object() {
        return Err(SourceError::MalformedResponse(format!(
            "expected a JSON object, got {}",
            json_kind(payload)
        )));
    }
    match payload.pointer(pointer) {
        None | Some(Value::Null) => Ok(&[][..]),
        Some(Value::Array(items)) => Ok(items.as_slice()),
        Some(other) => Err(SourceError::MalformedResponse(format!(
            "`{}` is {}, expected an array",
            pointer,
            json_kind(other)
        ))),
    }
}

/// Optional field that reads as `None` when the value has the wrong shape.
///
/// Use with `#[serde(deserialize_with = "lenient")]` so one odd field
/// leaves the rest of the record intact.
pub(crate) fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).ok())
}

/// Decode each item independently; undecodable items are skipped.
pub(crate) fn decode_records<T, F>(store: Store, items: &[Value], wrap: F) -> Vec<RawProductRecord>
where
    T: DeserializeOwned,
    F: Fn(T) -> RawProductRecord,
{
    items
        .iter()
        .enumerate()
        .filter_map(|(idx, item)| match T::deserialize(item) {
            Ok(record) => Some(wrap(record)),
            Err(e) => {
                warn!(store = store.key(), index = idx, error = %e, "skipping undecodable record");
                None
            }
        })
        .collect()
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_url_for_encodes_every_placeholder() {
        let settings = SourceSettings::new("https://example.com/busca/{query}.json?q={query}");
        assert_eq!(
            settings.url_for(" mouse gamer "),
            "https://example.com/busca/mouse%20gamer.json?q=mouse%20gamer"
        );
    }

    #[test]
    fn test_products_at_missing_path_is_empty() {
        let payload = json!({"pageProps": {}});
        assert!(products_at(&payload, "/pageProps/data/search/products")
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_products_at_rejects_non_array() {
        let payload = json!({"data": "oops"});
        let err = products_at(&payload, "/data").unwrap_err();
        assert!(err.is_malformed());

        let err = products_at(&json!([1, 2]), "/data").unwrap_err();
        assert!(err.is_malformed());
    }
}
