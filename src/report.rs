// src/report.rs
use std::collections::HashMap;

use serde::Serialize;

use crate::record::{MetricPoint, RankingRecord};

/// First vs. latest over a window of points.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MetricSummary {
    pub first: u64,
    pub current: u64,
    pub growth: i64,
    /// Percent; 0 when the first value is 0.
    pub growth_rate_pct: f64,
    pub samples: usize,
}

/// `None` for an empty window. Points are expected in ascending time order.
pub fn summarize(points: &[MetricPoint]) -> Option<MetricSummary> {
    let first = points.first()?.value;
    let current = points.last()?.value;
    let growth = current as i128 - first as i128;
    let growth = growth.clamp(i64::MIN as i128, i64::MAX as i128) as i64;
    let growth_rate_pct = if first == 0 { 0.0 } else { growth as f64 / first as f64 * 100.0 };

    Some(MetricSummary { first, current, growth, growth_rate_pct, samples: points.len() })
}

/// Latest record per store key (max timestamp; later log position wins a
/// tie), ordered by first appearance of the key.
pub fn latest_by_store(records: &[RankingRecord]) -> Vec<RankingRecord> {
    let mut order: Vec<&str> = Vec::new();
    let mut latest: HashMap<&str, &RankingRecord> = HashMap::new();

    for r in records {
        match latest.get(r.store_key.as_str()) {
            None => {
                order.push(&r.store_key);
                latest.insert(&r.store_key, r);
            }
            Some(prev) if r.timestamp >= prev.timestamp => {
                latest.insert(&r.store_key, r);
            }
            Some(_) => {}
        }
    }

    order.into_iter().filter_map(|k| latest.get(k).map(|r| (*r).clone())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::record::parse_ts;

    fn point(ts: &str, value: u64) -> MetricPoint {
        MetricPoint { timestamp: parse_ts(ts).unwrap(), value, raw: None }
    }

    #[test]
    fn growth_over_window() {
        let pts = [
            point("2026-03-01T00:00:00Z", 10_000),
            point("2026-03-02T00:00:00Z", 12_000),
            point("2026-03-03T00:00:00Z", 15_000),
        ];
        let s = summarize(&pts).unwrap();
        assert_eq!((s.first, s.current, s.growth, s.samples), (10_000, 15_000, 5_000, 3));
        assert!((s.growth_rate_pct - 50.0).abs() < 1e-9);
    }

    #[test]
    fn zero_start_and_empty_window() {
        let s = summarize(&[point("2026-03-01T00:00:00Z", 0), point("2026-03-02T00:00:00Z", 7)]).unwrap();
        assert_eq!(s.growth_rate_pct, 0.0);
        assert_eq!(s.growth, 7);
        assert!(summarize(&[]).is_none());

        let s = summarize(&[point("2026-03-01T00:00:00Z", 9), point("2026-03-02T00:00:00Z", 3)]).unwrap();
        assert_eq!(s.growth, -6);
    }

    #[test]
    fn latest_per_key_keeps_first_seen_order() {
        let cfg = TrackerConfig::builtin();
        let at = |t: usize, ts: &str| RankingRecord::for_target(&cfg.targets[t], parse_ts(ts).unwrap());

        let mut newer_us = at(0, "2026-03-02T00:00:00Z");
        newer_us.rank_overall = Some(9);
        let log = vec![
            at(0, "2026-03-01T00:00:00Z"),
            at(2, "2026-03-01T00:00:01Z"),
            newer_us.clone(),
            at(2, "2026-02-28T00:00:00Z"),
        ];
        let latest = latest_by_store(&log);
        assert_eq!(latest.len(), 2);
        assert_eq!(latest[0], newer_us);
        assert_eq!(latest[1].store_key, "amazon_uk");
        assert_eq!(latest[1].timestamp, parse_ts("2026-03-01T00:00:01Z").unwrap());
    }
}
