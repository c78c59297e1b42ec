#![allow(dead_code)]

use async_trait::async_trait;
use promohunter_core::stores::{kabum, magalu};
use promohunter_core::{RawProductRecord, SourceClient, SourceError, Store};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// What a fake store does once its delay has elapsed.
pub enum Behavior {
    Answer(Vec<RawProductRecord>),
    Unavailable,
    Malformed,
    Hang,
    Panic,
}

/// In-process stand-in for a store endpoint.
pub struct FakeSource {
    store: Store,
    delay: Duration,
    behavior: Behavior,
    calls: AtomicUsize,
}

impl FakeSource {
    pub fn new(store: Store, delay_ms: u64, behavior: Behavior) -> Self {
        Self {
            store,
            delay: Duration::from_millis(delay_ms),
            behavior,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn shared(store: Store, delay_ms: u64, behavior: Behavior) -> Arc<dyn SourceClient> {
        Arc::new(Self::new(store, delay_ms, behavior))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SourceClient for FakeSource {
    fn store(&self) -> Store {
        self.store
    }

    async fn fetch(&self, _query: &str) -> Result<Vec<RawProductRecord>, SourceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.delay).await;
        match &self.behavior {
            Behavior::Answer(records) => Ok(records.clone()),
            Behavior::Unavailable => Err(SourceError::Unavailable("connection refused".into())),
            Behavior::Malformed => Err(SourceError::MalformedResponse("expected array".into())),
            Behavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Ok(Vec::new())
            }
            Behavior::Panic => panic!("fake store blew up"),
        }
    }
}

pub fn kabum_item(id: u64, title: &str, price: f64, old_price: f64, available: bool) -> Value {
    json!({
        "id": id,
        "attributes": {
            "title": title,
            "product_link": title.to_lowercase().replace(' ', "-"),
            "images": [format!("https://images.kabum.com.br/{}_g.jpg", id)],
            "manufacturer": {"name": "Redragon"},
            "available": available,
            "price": price,
            "old_price": old_price,
            "score_of_ratings": 4.5,
            "number_of_ratings": 80,
            "max_installment": "10x sem juros"
        }
    })
}

pub fn magalu_item(id: &str, title: &str, best_price: &str, full_price: &str, available: bool) -> Value {
    json!({
        "id": id,
        "title": title,
        "url": format!("https://www.magazinevoce.com.br/p/{}", id),
        "brand": {"name": "Logitech"},
        "available": available,
        "price": {
            "bestPrice": best_price,
            "fullPrice": full_price,
            "paymentMethodDescription": "no Pix"
        },
        "rating": {"average": 4.8, "count": 25}
    })
}

pub fn kabum_records(items: Vec<Value>) -> Vec<RawProductRecord> {
    kabum::parse_response(&json!({ "data": items }).to_string()).unwrap()
}

pub fn magalu_records(items: Vec<Value>) -> Vec<RawProductRecord> {
    let body = json!({ "pageProps": { "data": { "search": { "products": items } } } });
    magalu::parse_response(&body.to_string()).unwrap()
}
