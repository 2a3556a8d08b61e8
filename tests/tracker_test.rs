mod helpers;

use helpers::*;
use watch_ledger::config::MAX_FETCH_CONCURRENCY;
use watch_ledger::models::*;
use watch_ledger::repositories::{HistoryStore, JsonHistoryRepository, PortfolioRepository};
use watch_ledger::services::*;

fn tracker(
    dir: &TestDir,
    fetcher: StaticFetcher,
) -> Tracker<StaticFetcher, JsonHistoryRepository, (TracingReportSink, JsonReportWriter)> {
    Tracker::new(
        fetcher,
        JsonHistoryRepository::new(dir.file("watch_data.json")),
        PortfolioRepository::new(dir.file("portfolio_statistics.json")),
        (TracingReportSink, JsonReportWriter::new(dir.file("reports"))),
    )
    .with_concurrency(2)
}

#[tokio::test]
async fn test_collect_snapshot_stops_at_empty_page() {
    let fetcher = StaticFetcher::new(vec![
        vec![listing("/w/1", "$1,000"), listing("/w/2", "Sold")],
        vec![listing("/w/3", "$2,500")],
    ]);

    let snapshot = collect_snapshot(&fetcher, 2, at(1, 10)).await;

    assert_eq!(snapshot.pages, 2);
    assert_eq!(snapshot.seeds.len(), 3);
    assert_eq!(snapshot.failed_pages, 0);
    // pages 1-2, then 3-4 where page 3 is empty
    assert_eq!(fetcher.calls(), 4);
    assert_eq!(snapshot.seeds[1].price(), Price::Sold);
    assert_eq!(snapshot.seeds[2].price(), usd(2500));
}

#[tokio::test]
async fn test_collect_snapshot_caps_page_window() {
    let fetcher = StaticFetcher::new(vec![vec![listing("/w/1", "$1,000")]]);

    let snapshot = collect_snapshot(&fetcher, usize::MAX, at(1, 10)).await;

    assert_eq!(snapshot.seeds.len(), 1);
    assert_eq!(fetcher.calls(), MAX_FETCH_CONCURRENCY as u32);
}

#[tokio::test]
async fn test_collect_snapshot_drops_listings_without_inventory() {
    let mut orphan = listing("", "$500");
    orphan.inventory = None;
    let fetcher = StaticFetcher::new(vec![vec![listing("/w/1", "$1,000"), orphan]]);

    let snapshot = collect_snapshot(&fetcher, 1, at(1, 10)).await;

    assert_eq!(snapshot.seeds.len(), 1);
    assert_eq!(snapshot.dropped, 1);
}

#[tokio::test]
async fn test_collect_snapshot_stops_at_failed_page() {
    let fetcher = StaticFetcher::new(vec![
        vec![listing("/w/1", "$1,000")],
        vec![listing("/w/2", "$2,000")],
        vec![listing("/w/3", "$3,000")],
    ])
    .failing_on(2);

    let snapshot = collect_snapshot(&fetcher, 3, at(1, 10)).await;

    assert_eq!(snapshot.pages, 1);
    assert_eq!(snapshot.failed_pages, 1);
    assert_eq!(snapshot.seeds.len(), 1);
    assert_eq!(snapshot.seeds[0].inventory_id, "/w/1");
}

#[tokio::test]
async fn test_first_cycle_records_everything() {
    let dir = TestDir::new();
    let fetcher = StaticFetcher::new(vec![
        vec![listing("/w/1", "$1,000"), listing("/w/2", "N/A")],
        vec![listing("/w/3", "SOLD")],
    ]);

    let summary = tracker(&dir, fetcher).run_cycle(at(1, 10)).await.unwrap();

    assert_eq!(summary.fetched, 3);
    assert_eq!(summary.tracked, 3);
    assert!(summary.saved);
    assert_eq!(summary.report.additions.len(), 3);
    assert_eq!(summary.stats.added_count, 1);
    assert_eq!(summary.stats.for_sale_count, 2);

    let stored = JsonHistoryRepository::new(dir.file("watch_data.json"))
        .load()
        .await
        .unwrap();
    assert_eq!(stored.len(), 3);
    assert_eq!(history(&stored, "/w/2"), vec![Price::Unknown]);
    assert_eq!(history(&stored, "/w/3"), vec![Price::Sold]);
    assert_eq!(stored.get("/w/1").unwrap().details.brand.as_deref(), Some("Rolex"));

    let report_file = dir.file("reports").join("report-2024-03-01.json");
    assert!(report_file.exists());
}

#[tokio::test]
async fn test_second_cycle_without_changes_keeps_history() {
    let dir = TestDir::new();
    let pages = vec![vec![listing("/w/1", "$1,000"), listing("/w/2", "$2,000")]];

    tracker(&dir, StaticFetcher::new(pages.clone()))
        .run_cycle(at(1, 10))
        .await
        .unwrap();
    let before = std::fs::read(dir.file("watch_data.json")).unwrap();

    let summary = tracker(&dir, StaticFetcher::new(pages))
        .run_cycle(at(2, 10))
        .await
        .unwrap();

    assert!(!summary.saved);
    assert!(summary.report.is_empty());
    assert_eq!(summary.report.unchanged, 2);
    assert_eq!(std::fs::read(dir.file("watch_data.json")).unwrap(), before);

    let portfolio = PortfolioRepository::new(dir.file("portfolio_statistics.json"))
        .load()
        .await
        .unwrap();
    assert_eq!(portfolio.len(), 2);
}

#[tokio::test]
async fn test_cycle_reports_sales_and_price_changes() {
    let dir = TestDir::new();
    tracker(
        &dir,
        StaticFetcher::new(vec![vec![listing("/w/1", "$1,000"), listing("/w/2", "$2,000")]]),
    )
    .run_cycle(at(1, 10))
    .await
    .unwrap();

    let summary = tracker(
        &dir,
        StaticFetcher::new(vec![vec![listing("/w/1", "$950"), listing("/w/2", "Sold")]]),
    )
    .run_cycle(at(2, 10))
    .await
    .unwrap();

    assert!(summary.saved);
    assert_eq!(summary.report.price_changes.len(), 1);
    assert_eq!(summary.report.sold.len(), 1);
    assert_eq!(summary.stats.sold_value, rust_decimal::Decimal::new(2000, 0));

    let stored = tracker(&dir, StaticFetcher::new(Vec::new()))
        .store()
        .load()
        .await
        .unwrap();
    assert_eq!(history(&stored, "/w/1"), vec![usd(1000), usd(950)]);
    assert_eq!(history(&stored, "/w/2"), vec![usd(2000), Price::Sold]);
}

#[tokio::test]
async fn test_cycle_keeps_records_missing_from_catalog() {
    let dir = TestDir::new();
    tracker(
        &dir,
        StaticFetcher::new(vec![vec![listing("/w/1", "$1,000"), listing("/w/2", "$2,000")]]),
    )
    .run_cycle(at(1, 10))
    .await
    .unwrap();

    let summary = tracker(&dir, StaticFetcher::new(vec![vec![listing("/w/1", "$1,000")]]))
        .run_cycle(at(2, 10))
        .await
        .unwrap();

    assert_eq!(summary.tracked, 2);
    assert_eq!(summary.stats.for_sale_count, 2);
}

#[tokio::test]
async fn test_integrity_violation_leaves_store_untouched() {
    let dir = TestDir::new();
    let path = dir.file("watch_data.json");
    std::fs::write(
        &path,
        r#"[{"Inventory": "/w/1", "Title": "Broken", "PriceHistory": []}]"#,
    )
    .unwrap();

    let result = tracker(&dir, StaticFetcher::new(vec![vec![listing("/w/1", "$1,000")]]))
        .run_cycle(at(1, 10))
        .await;

    let err = result.unwrap_err();
    assert!(err.is_integrity_violation());
    assert_eq!(
        std::fs::read_to_string(&path).unwrap(),
        r#"[{"Inventory": "/w/1", "Title": "Broken", "PriceHistory": []}]"#
    );
    assert!(!dir.file("portfolio_statistics.json").exists());
}
