mod common;

use common::{kabum_item, kabum_records, magalu_item, magalu_records, Behavior, FakeSource};
use promohunter_core::presenter::{render_reply, OutgoingMessage};
use promohunter_core::{select, ChatService, RankingPolicy, Store};
use promohunter_core::search::Aggregator;

fn service(magalu: Behavior, kabum: Behavior, policy: RankingPolicy) -> ChatService {
    let sources = vec![
        FakeSource::shared(Store::Magalu, 20, magalu),
        FakeSource::shared(Store::Kabum, 10, kabum),
    ];
    ChatService::new(Aggregator::new(sources), policy)
}

fn magalu_listing() -> Behavior {
    Behavior::Answer(magalu_records(vec![
        magalu_item("m1", "Mouse Logitech G203", "119,90", "149,90", true),
        magalu_item("m2", "Mouse Logitech G305", "199,00", "249,00", true),
        magalu_item("m3", "Mouse Logitech G Pro X", "R$ 1.234,56", "R$ 1.399,00", true),
    ]))
}

fn kabum_listing() -> Behavior {
    Behavior::Answer(kabum_records(vec![
        kabum_item(1, "Mouse Gamer Redragon Cobra", 99.9, 129.9, true),
        kabum_item(2, "Mouse Gamer Redragon King", 149.9, 149.9, true),
        kabum_item(3, "Mouse Gamer Redragon Storm", 79.9, 0.0, false),
    ]))
}

#[tokio::test(start_paused = true)]
async fn test_cheapest_command_end_to_end() {
    let service = service(magalu_listing(), kabum_listing(), RankingPolicy::BestRating);
    let replies = service.handle("/cheapest mouse").await;

    // summary + five cards + comparison
    assert_eq!(replies.len(), 7);

    let summary = replies[0].body();
    assert!(summary.contains("Search: mouse"));
    assert!(summary.contains("Magalu: 3 products"));
    assert!(summary.contains("KaBuM!: 3 products"));
    assert!(summary.contains("Total: 6 products"));
    assert!(summary.contains("Top 5 best offers"));

    let prices: Vec<&str> = replies[1..6]
        .iter()
        .map(|m| {
            m.body()
                .lines()
                .find(|l| l.starts_with("💰"))
                .unwrap()
        })
        .collect();
    assert!(prices[0].starts_with("💰 **R$ 99.90** ~~R$ 129.90~~ (23% OFF)"));
    assert!(prices[1].starts_with("💰 **R$ 119.90**"));
    assert!(prices[2].starts_with("💰 **R$ 149.90**"));
    assert!(prices[3].starts_with("💰 **R$ 199.00**"));
    assert!(prices[4].starts_with("💰 **R$ 1234.56**"));

    // Kabum listings carry images, Magalu ones do not.
    assert!(matches!(replies[1], OutgoingMessage::Photo { .. }));
    assert!(matches!(replies[2], OutgoingMessage::Text { .. }));

    let comparison = replies[6].body();
    assert!(comparison.contains("Cheapest: **R$ 99.90** (KaBuM!)"));
    assert!(comparison.contains("Most expensive: **R$ 1234.56** (Magalu)"));
    assert!(comparison.contains("Savings: **R$ 1134.66**"));
}

#[tokio::test(start_paused = true)]
async fn test_failed_store_looks_like_empty_store() {
    let service = service(Behavior::Unavailable, kabum_listing(), RankingPolicy::LowestPrice);
    let replies = service.handle("mouse").await;

    let summary = replies[0].body();
    assert!(summary.contains("Magalu: 0 products"));
    assert!(summary.contains("Top 2 best offers"));
    assert!(!summary.contains("connection refused"));
    assert!(replies.iter().all(|m| !m.body().contains("unavailable")));
}

#[tokio::test(start_paused = true)]
async fn test_everything_failing_reads_as_no_results() {
    let service = service(Behavior::Malformed, Behavior::Hang, RankingPolicy::LowestPrice);
    let replies = service.handle("/value mouse").await;

    assert_eq!(replies.len(), 1);
    assert!(replies[0].body().contains("No products found"));
}

#[tokio::test(start_paused = true)]
async fn test_degraded_selection_when_nothing_is_rankable() {
    let kabum = Behavior::Answer(kabum_records(vec![
        kabum_item(1, "Sold Out A", 10.0, 10.0, false),
        kabum_item(2, "Sold Out B", 20.0, 20.0, false),
        kabum_item(3, "Sold Out C", 30.0, 30.0, false),
        kabum_item(4, "Sold Out D", 5.0, 5.0, false),
    ]));
    let service = service(Behavior::Answer(Vec::new()), kabum, RankingPolicy::LowestPrice);

    let (result, selected) = service.search("sold out", None).await;
    assert_eq!(result.total_count(), 4);
    let ids: Vec<&str> = selected.iter().map(|p| p.id.as_str()).collect();
    assert_eq!(ids, vec!["1", "2", "3"]);

    let replies = render_reply(&result, &selected);
    assert_eq!(replies.len(), 5);
}

#[tokio::test(start_paused = true)]
async fn test_policies_disagree_on_the_same_listing() {
    let service = service(magalu_listing(), kabum_listing(), RankingPolicy::LowestPrice);
    let (result, _) = service.search("mouse", None).await;

    let cheapest = select(&result.all_products, RankingPolicy::LowestPrice);
    let rated = select(&result.all_products, RankingPolicy::BestRating);

    assert_eq!(cheapest[0].source, Store::Kabum);
    // Magalu items carry 4.8 over 25 ratings, Kabum 4.5 over 80.
    assert_eq!(rated[0].source, Store::Magalu);
    assert!(cheapest.iter().all(|p| p.available));
}
