// tests/metric_series.rs
use std::fs;

use chrono::{Duration, Utc};
use rank_scrape::config::{RunOptions, SteamSpec};
use rank_scrape::config::options::Pacing;
use rank_scrape::core::net::Fetched;
use rank_scrape::error::TransportError;
use rank_scrape::record::parse_ts;
use rank_scrape::report::summarize;
use rank_scrape::runner;
use rank_scrape::store::{MetricStore, export_metric_csv};

#[test]
fn range_query_is_inclusive_and_ascending() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetricStore::open(&dir.path().join("metrics.db"), "Steam", "wishlist").unwrap();
    let ts = |s: &str| parse_ts(s).unwrap();

    // out of order on purpose
    store.append_metric(ts("2026-03-03T09:00:00Z"), 300).unwrap();
    store.append_metric(ts("2026-03-01T09:00:00Z"), 100).unwrap();
    store.append_metric(ts("2026-03-02T09:00:00Z"), 200).unwrap();
    store.append_metric(ts("2026-03-04T09:00:00Z"), 400).unwrap();

    let pts = store.query_metric_range(ts("2026-03-01T09:00:00Z"), ts("2026-03-03T09:00:00Z")).unwrap();
    let values: Vec<u64> = pts.iter().map(|p| p.value).collect();
    assert_eq!(values, vec![100, 200, 300]);
    assert!(pts.windows(2).all(|w| w[0].timestamp <= w[1].timestamp));

    assert!(store.query_metric_range(ts("2027-01-01T00:00:00Z"), ts("2027-12-31T00:00:00Z")).unwrap().is_empty());
    assert_eq!(store.all_points().unwrap().len(), 4);
}

#[test]
fn series_are_isolated() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("metrics.db");
    let steam = MetricStore::open(&db, "Steam", "wishlist").unwrap();
    let other = MetricStore::open(&db, "Steam", "followers").unwrap();
    let now = Utc::now();

    steam.append_metric(now, 1).unwrap();
    other.append_metric(now, 2).unwrap();
    assert_eq!(steam.all_points().unwrap()[0].value, 1);
    assert_eq!(other.all_points().unwrap().len(), 1);
}

#[test]
fn metric_run_keeps_raw_and_skips_failures() {
    let dir = tempfile::tempdir().unwrap();
    let opts = RunOptions { data_dir: dir.path().to_path_buf(), config_path: None, pacing: Pacing::none() };
    let steam = SteamSpec::new("3321460");

    let ranged = |_: &str| -> Result<Fetched, TransportError> { Ok(Fetched::ok(r#"{"owners":"0 .. 20,000"}"#)) };
    let point = runner::run_metric(&opts, &steam, &ranged).unwrap().unwrap();
    assert_eq!(point.value, 10_000);
    assert_eq!(point.raw.as_deref(), Some("0 .. 20,000"));

    let down = |_: &str| -> Result<Fetched, TransportError> { Ok(Fetched { status: 500, body: String::new() }) };
    assert!(runner::run_metric(&opts, &steam, &down).unwrap().is_none());

    let garbage = |_: &str| -> Result<Fetched, TransportError> { Ok(Fetched::ok(r#"{"owners":"n/a"}"#)) };
    assert_eq!(runner::run_metric(&opts, &steam, &garbage).unwrap().unwrap().value, 0);

    let store = MetricStore::open(&opts.metrics_db_path(), "Steam", "wishlist").unwrap();
    let pts = store.all_points().unwrap();
    assert_eq!(pts.len(), 2);
    assert_eq!(pts[1].raw.as_deref(), Some("n/a"));

    let s = runner::metric_summary(&opts, &steam, 7).unwrap().unwrap();
    assert_eq!((s.first, s.current, s.samples), (10_000, 0, 2));
    assert_eq!(summarize(&pts), Some(s));
}

#[test]
fn csv_export_uses_reduced_schema() {
    let dir = tempfile::tempdir().unwrap();
    let store = MetricStore::open(&dir.path().join("metrics.db"), "Steam", "wishlist").unwrap();
    let start = parse_ts("2026-03-01T09:00:00Z").unwrap();
    store.append_metric(start, 15_000).unwrap();
    store.append_metric(start + Duration::days(1), 16_500).unwrap();

    let out = dir.path().join("exports/steam.csv");
    export_metric_csv(&out, &store.all_points().unwrap()).unwrap();
    assert_eq!(
        fs::read_to_string(&out).unwrap(),
        "ts,value\n2026-03-01T09:00:00.000000Z,15000\n2026-03-02T09:00:00.000000Z,16500\n"
    );
}
