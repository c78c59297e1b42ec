mod common;

use common::{kabum_item, kabum_records, magalu_item, magalu_records, Behavior, FakeSource};
use promohunter_core::search::Aggregator;
use promohunter_core::{SourceClient, Store};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

fn three_kabum_products() -> Behavior {
    Behavior::Answer(kabum_records(vec![
        kabum_item(1, "Mouse Gamer A", 99.9, 129.9, true),
        kabum_item(2, "Mouse Gamer B", 149.9, 149.9, true),
        kabum_item(3, "Mouse Gamer C", 79.9, 0.0, false),
    ]))
}

#[tokio::test(start_paused = true)]
async fn test_timed_out_store_contributes_nothing() {
    let sources = vec![
        FakeSource::shared(Store::Magalu, 0, Behavior::Hang),
        FakeSource::shared(Store::Kabum, 50, three_kabum_products()),
    ];
    let aggregator = Aggregator::new(sources).with_timeout(Duration::from_secs(30));

    let started = Instant::now();
    let result = aggregator.search("mouse").await;

    assert!(started.elapsed() >= Duration::from_secs(30));
    assert!(started.elapsed() < Duration::from_secs(31));
    assert_eq!(result.total_count(), 3);
    assert!(result.products_for(Store::Magalu).is_empty());
    assert_eq!(result.products_for(Store::Kabum).len(), 3);
    assert_eq!(result.failures.len(), 1);
    assert_eq!(result.failures[0].store, Store::Magalu);
    assert!(result.failures[0].is_timeout);
    assert_eq!(result.failures[0].code, "timeout");
}

#[tokio::test(start_paused = true)]
async fn test_output_follows_registration_order() {
    let magalu = Behavior::Answer(magalu_records(vec![
        magalu_item("m1", "Mouse Logitech G203", "119,90", "149,90", true),
        magalu_item("m2", "Mouse Logitech G305", "199,00", "249,00", true),
    ]));
    // Magalu answers last but is registered first.
    let sources = vec![
        FakeSource::shared(Store::Magalu, 500, magalu),
        FakeSource::shared(Store::Kabum, 10, three_kabum_products()),
    ];

    let result = Aggregator::new(sources).search("mouse").await;

    let order: Vec<Store> = result.all_products.iter().map(|p| p.source).collect();
    assert_eq!(
        order,
        vec![Store::Magalu, Store::Magalu, Store::Kabum, Store::Kabum, Store::Kabum]
    );
    let stores: Vec<Store> = result.stores.iter().map(|s| s.store).collect();
    assert_eq!(stores, vec![Store::Magalu, Store::Kabum]);
    assert!(!result.is_partial());
}

#[tokio::test(start_paused = true)]
async fn test_sources_run_concurrently() {
    let sources = vec![
        FakeSource::shared(Store::Magalu, 1_000, Behavior::Answer(Vec::new())),
        FakeSource::shared(Store::Kabum, 1_000, three_kabum_products()),
    ];

    let started = Instant::now();
    let result = Aggregator::new(sources).search("mouse").await;

    assert!(started.elapsed() < Duration::from_millis(1_500));
    assert_eq!(result.total_count(), 3);
}

#[tokio::test(start_paused = true)]
async fn test_every_failure_kind_is_isolated() {
    for behavior in [Behavior::Unavailable, Behavior::Malformed, Behavior::Panic] {
        let sources = vec![
            FakeSource::shared(Store::Magalu, 5, behavior),
            FakeSource::shared(Store::Kabum, 5, three_kabum_products()),
        ];
        let result = Aggregator::new(sources).search("mouse").await;

        assert_eq!(result.total_count(), 3);
        assert_eq!(result.failures.len(), 1);
        assert!(!result.failures[0].is_timeout);
        assert!(result.products_for(Store::Magalu).is_empty());
    }
}

#[tokio::test(start_paused = true)]
async fn test_all_sources_failing_is_an_empty_result() {
    let sources = vec![
        FakeSource::shared(Store::Magalu, 5, Behavior::Unavailable),
        FakeSource::shared(Store::Kabum, 5, Behavior::Hang),
    ];
    let result = Aggregator::new(sources)
        .with_timeout(Duration::from_secs(2))
        .search("mouse")
        .await;

    assert!(result.is_empty());
    assert!(result.all_failed());
    assert_eq!(result.stores.len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_each_source_called_once_per_search() {
    let kabum = Arc::new(FakeSource::new(Store::Kabum, 5, three_kabum_products()));
    let source: Arc<dyn SourceClient> = kabum.clone();
    let aggregator = Aggregator::new(vec![source]);

    aggregator.search("mouse").await;
    aggregator.search("teclado").await;

    assert_eq!(kabum.calls(), 2);
    assert_eq!(aggregator.stores(), vec![Store::Kabum]);
}
