// tests/record_store.rs
use std::fs;

use rank_scrape::config::TrackerConfig;
use rank_scrape::error::{ExtractError, StoreError, TransportError};
use rank_scrape::record::{RankingRecord, parse_ts};
use rank_scrape::store::RecordStore;
use tempfile::TempDir;

fn store() -> (TempDir, RecordStore) {
    let dir = tempfile::tempdir().unwrap();
    let store = RecordStore::new(dir.path().join("data/rankings.csv"), dir.path().join("data/latest.json"));
    (dir, store)
}

fn record(target: usize, ts: &str, overall: Option<u32>) -> RankingRecord {
    let cfg = TrackerConfig::builtin();
    let mut r = RankingRecord::for_target(&cfg.targets[target], parse_ts(ts).unwrap());
    r.rank_overall = overall;
    r
}

#[test]
fn log_keeps_every_record_in_append_order() {
    let (_dir, store) = store();
    let mut failed = record(2, "2026-03-01T09:00:05Z", None);
    failed = failed.failed(&ExtractError::from(TransportError::Status(503)));
    let mut priced = record(0, "2026-03-01T09:00:00Z", Some(1234));
    priced.price = Some("69.99".into());
    priced.in_stock = Some(true);
    priced.label = "Amazon US, physical".into();

    store.append_records(&[priced.clone(), failed.clone()]).unwrap();
    let second = record(0, "2026-03-02T09:00:00Z", Some(1100));
    store.append_records(&[second.clone()]).unwrap();

    let log = store.read_log().unwrap();
    assert_eq!(log, vec![priced, failed, second]);

    let text = fs::read_to_string(store.log_path()).unwrap();
    assert_eq!(text.lines().filter(|l| l.starts_with("timestamp,")).count(), 1);
    assert!(text.contains("\"Amazon US, physical\""));
}

#[test]
fn empty_batch_on_new_store_writes_header() {
    let (_dir, store) = store();
    store.append_records(&[]).unwrap();
    let text = fs::read_to_string(store.log_path()).unwrap();
    assert_eq!(
        text,
        "timestamp,store,label,region,asin,url,rank_overall,rank_console,console_category,price,currency,in_stock,error\n"
    );
    assert!(store.read_log().unwrap().is_empty());
}

#[test]
fn missing_files_read_as_empty() {
    let (_dir, store) = store();
    assert!(store.read_log().unwrap().is_empty());
    assert!(store.read_snapshot().unwrap().is_none());
}

#[test]
fn snapshot_is_replaced_not_merged() {
    let (_dir, store) = store();
    let first = vec![record(0, "2026-03-01T09:00:00Z", Some(10)), record(2, "2026-03-01T09:00:01Z", Some(20))];
    store.write_snapshot(&first).unwrap();

    let second = vec![record(0, "2026-03-02T09:00:00Z", Some(11))];
    let written = store.write_snapshot(&second).unwrap();

    let snap = store.read_snapshot().unwrap().unwrap();
    assert_eq!(snap.results, second);
    assert_eq!(snap.updated_at, written.updated_at);

    let json: serde_json::Value = serde_json::from_str(&fs::read_to_string(store.snapshot_path()).unwrap()).unwrap();
    assert_eq!(json["results"].as_array().unwrap().len(), 1);
    assert_eq!(json["results"][0]["rank_overall"], 11);
}

#[test]
fn snapshot_rebuilds_from_log() {
    let (_dir, store) = store();
    store
        .append_records(&[record(0, "2026-03-01T09:00:00Z", Some(10)), record(2, "2026-03-01T09:00:01Z", Some(20))])
        .unwrap();
    store.append_records(&[record(0, "2026-03-02T09:00:00Z", Some(9))]).unwrap();

    let snap = store.rebuild_snapshot().unwrap();
    let keys: Vec<_> = snap.results.iter().map(|r| (r.store_key.as_str(), r.rank_overall)).collect();
    assert_eq!(keys, vec![("amazon_us", Some(9)), ("amazon_uk", Some(20))]);
    assert_eq!(store.read_snapshot().unwrap().unwrap().results, snap.results);
}

#[test]
fn column_drift_is_reported_with_line() {
    let (_dir, store) = store();
    store.append_records(&[record(0, "2026-03-01T09:00:00Z", Some(10))]).unwrap();
    let mut text = fs::read_to_string(store.log_path()).unwrap();
    text.push_str("2026-03-02T09:00:00Z,amazon_us,too,few\n");
    fs::write(store.log_path(), text).unwrap();

    match store.read_log() {
        Err(StoreError::Malformed { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected malformed row, got {other:?}"),
    }
}
