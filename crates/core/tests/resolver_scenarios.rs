use std::sync::Arc;
use std::time::Duration;

use chrono::{TimeZone, Utc};
use eshop_deals_core::testing::{RecordingSink, StaticCatalog, StaticPrices};
use eshop_deals_core::{
    run_query, CatalogEntry, DiscountPrice, Notifier, NotifierSettings, NotifyOutcome,
    PriceRecord, ProductId, Query, QueryResolver, ResolverSettings, SuppressReason,
};
use rust_decimal::Decimal;

fn resolver(catalog: &Arc<StaticCatalog>, prices: &Arc<StaticPrices>) -> QueryResolver {
    QueryResolver::new(catalog.clone(), prices.clone(), ResolverSettings::default())
}

fn texts(lines: &[eshop_deals_core::DisplayLine]) -> Vec<&str> {
    lines.iter().map(|line| line.as_str()).collect()
}

fn discounted_entries(count: usize) -> Vec<CatalogEntry> {
    (0..count)
        .map(|index| {
            CatalogEntry::new(format!("Game {index}"), index.to_string(), true, Decimal::new(1999, 2))
        })
        .collect()
}

#[tokio::test]
async fn single_title_without_discount_renders_sorting_price() {
    let catalog = Arc::new(StaticCatalog::new(vec![CatalogEntry::new(
        "Mario Kart 8",
        "70010000000153",
        false,
        Decimal::new(5999, 2),
    )]));
    let prices = Arc::new(StaticPrices::default());

    let lines = resolver(&catalog, &prices)
        .resolve(&Query::single_title("mario"))
        .await
        .expect("resolution should succeed");

    assert_eq!(texts(&lines), vec!["*Mario Kart 8*: normal price: *€59.99*"]);
}

#[tokio::test]
async fn discounted_title_renders_discount_and_end_date() {
    let catalog = Arc::new(StaticCatalog::new(vec![CatalogEntry::new(
        "Zelda",
        "123",
        true,
        Decimal::new(5999, 2),
    )]));
    let prices = Arc::new(StaticPrices::new(vec![PriceRecord {
        product_id: ProductId::from("123"),
        regular_price: Decimal::new(5999, 2),
        discount_price: Some(DiscountPrice {
            amount: Decimal::new(3999, 2),
            end_datetime: Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap(),
        }),
    }]));

    let lines = resolver(&catalog, &prices)
        .resolve(&Query::single_title("zelda"))
        .await
        .expect("resolution should succeed");

    assert_eq!(lines.len(), 1);
    assert!(lines[0].as_str().contains("until 15/3/2024"));
    assert!(lines[0].as_str().contains("€39.99"));
    assert_eq!(lines[0].as_str(), "*Zelda: €39.99* until 15/3/2024, normal price: €59.99");
}

#[tokio::test]
async fn discounted_title_without_price_record_falls_back_without_failing() {
    let catalog = Arc::new(StaticCatalog::new(vec![
        CatalogEntry::new("Kirby", "1", true, Decimal::new(4999, 2)),
        CatalogEntry::new("Kirby Fighters", "2", true, Decimal::new(1999, 2)),
    ]));
    let prices = Arc::new(StaticPrices::new(vec![PriceRecord {
        product_id: ProductId::from("2"),
        regular_price: Decimal::new(1999, 2),
        discount_price: Some(DiscountPrice {
            amount: Decimal::new(999, 2),
            end_datetime: Utc.with_ymd_and_hms(2024, 7, 1, 12, 0, 0).unwrap(),
        }),
    }]));

    let lines = resolver(&catalog, &prices)
        .resolve(&Query::prefix_search("kirby"))
        .await
        .expect("one missing record must not fail the batch");

    assert_eq!(
        texts(&lines),
        vec![
            "*Kirby*: normal price: *€49.99*",
            "*Kirby Fighters: €9.99* until 1/7/2024, normal price: €19.99",
        ]
    );
}

#[tokio::test]
async fn price_lookup_is_batched_once_per_resolution() {
    for size in [2_usize, 5, 50] {
        let catalog = Arc::new(StaticCatalog::new(discounted_entries(size)));
        let prices = Arc::new(StaticPrices::default());

        let lines = resolver(&catalog, &prices)
            .resolve(&Query::all_discounted())
            .await
            .expect("resolution should succeed");

        assert_eq!(lines.len(), size);
        assert_eq!(prices.call_count(), 1, "expected one batched lookup for {size} entries");
        assert_eq!(prices.requests()[0].1.len(), size);
        assert_eq!(prices.requests()[0].0.as_str(), "FI");
    }
}

#[tokio::test]
async fn title_list_preserves_input_order_under_out_of_order_completion() {
    let catalog = Arc::new(StaticCatalog::new(vec![
        CatalogEntry::new("Animal Crossing", "10", false, Decimal::new(5999, 2)),
        CatalogEntry::new("Bayonetta 3", "20", false, Decimal::new(6999, 2)),
        CatalogEntry::new("Celeste", "30", false, Decimal::new(1999, 2)),
    ]));
    let prices = Arc::new(
        StaticPrices::default()
            .with_delay("30", Duration::from_millis(60))
            .with_delay("20", Duration::from_millis(30)),
    );

    let lines = resolver(&catalog, &prices)
        .resolve(&Query::title_list("celeste,bayonetta,missing title,animal"))
        .await
        .expect("resolution should succeed");

    assert_eq!(
        texts(&lines),
        vec![
            "*Celeste*: normal price: *€19.99*",
            "*Bayonetta 3*: normal price: *€69.99*",
            "*Animal Crossing*: normal price: *€59.99*",
        ]
    );
    assert_eq!(catalog.call_count(), 4, "each title runs its own catalog lookup");
}

#[tokio::test]
async fn single_title_without_match_resolves_empty_and_does_not_notify() {
    let catalog = Arc::new(StaticCatalog::new(vec![CatalogEntry::new(
        "Pikmin 4",
        "1",
        false,
        Decimal::new(5999, 2),
    )]));
    let prices = Arc::new(StaticPrices::default());
    let sink = Arc::new(RecordingSink::default());
    let notifier = Notifier::new(sink.clone(), NotifierSettings::default());

    let report =
        run_query(&resolver(&catalog, &prices), &notifier, &Query::single_title("zelda"), "t-1")
            .await
            .expect("run should complete");

    assert!(report.lines.is_empty());
    assert_eq!(report.delivery, NotifyOutcome::Suppressed { reason: SuppressReason::NoContent });
    assert!(sink.payloads().is_empty(), "sink must not be invoked for empty output");
    assert_eq!(prices.call_count(), 0);
}

#[tokio::test]
async fn all_discounted_over_empty_set_issues_no_price_lookup() {
    let catalog = Arc::new(StaticCatalog::new(vec![CatalogEntry::new(
        "Tetris 99",
        "1",
        false,
        Decimal::ZERO,
    )]));
    let prices = Arc::new(StaticPrices::default());

    let lines = resolver(&catalog, &prices)
        .resolve(&Query::all_discounted())
        .await
        .expect("resolution should succeed");

    assert!(lines.is_empty());
    assert_eq!(prices.call_count(), 0);
}

#[tokio::test]
async fn full_run_posts_one_joined_message() {
    let catalog = Arc::new(StaticCatalog::new(vec![
        CatalogEntry::new("Hades", "1", false, Decimal::new(2499, 2)),
        CatalogEntry::new("Hollow Knight", "2", false, Decimal::new(1499, 2)),
    ]));
    let prices = Arc::new(StaticPrices::default());
    let sink = Arc::new(RecordingSink::default());
    let notifier = Notifier::new(sink.clone(), NotifierSettings::default());

    let report =
        run_query(&resolver(&catalog, &prices), &notifier, &Query::prefix_search("h"), "t-2")
            .await
            .expect("run should complete");

    assert_eq!(report.delivery, NotifyOutcome::Delivered { lines: 2 });
    assert_eq!(
        sink.payloads()[0].text,
        "*Hades*: normal price: *€24.99*\n*Hollow Knight*: normal price: *€14.99*"
    );
}
