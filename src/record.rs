// src/record.rs
//! Normalized observations.
//!
//! A [`RankingRecord`] is one observation of one target at one instant. It is
//! built once per cycle, never mutated after it is handed to the store, and
//! written both as a CSV log row and as a snapshot entry.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use crate::config::TargetSpec;
use crate::config::consts::LOG_COLUMNS;
use crate::error::ExtractError;

/* ---------------- Timestamps ---------------- */

/// Current time at the precision the log keeps (microseconds).
pub fn now_utc() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(6)
}

pub fn format_ts(ts: &DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn parse_ts(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s.trim()).ok().map(|d| d.with_timezone(&Utc))
}

/* ---------------- Ranking record ---------------- */

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankingRecord {
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "store")]
    pub store_key: String,
    pub label: String,
    pub region: String,
    #[serde(rename = "asin")]
    pub item_id: String,
    pub url: String,
    pub rank_overall: Option<u32>,
    pub rank_console: Option<u32>,
    #[serde(rename = "console_category")]
    pub category_label: String,
    pub price: Option<String>,
    pub currency: String,
    pub in_stock: Option<bool>,
    pub error: Option<String>,
}

impl RankingRecord {
    /// Empty observation of `target`: identity filled, nothing measured yet.
    pub fn for_target(target: &TargetSpec, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            store_key: target.key.clone(),
            label: target.label.clone(),
            region: target.region.clone(),
            item_id: target.item_id.clone(),
            url: target.url(),
            rank_overall: None,
            rank_console: None,
            category_label: target.category.clone(),
            price: None,
            currency: target.currency.clone(),
            in_stock: None,
            error: None,
        }
    }

    /// Hard failure: every measured field cleared, reason recorded.
    pub fn failed(mut self, err: &ExtractError) -> Self {
        self.rank_overall = None;
        self.rank_console = None;
        self.price = None;
        self.in_stock = None;
        self.error = Some(err.to_string());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Log row, column order as in `LOG_COLUMNS`.
    pub fn to_row(&self) -> Vec<String> {
        vec![
            format_ts(&self.timestamp),
            self.store_key.clone(),
            self.label.clone(),
            self.region.clone(),
            self.item_id.clone(),
            self.url.clone(),
            opt_cell(self.rank_overall),
            opt_cell(self.rank_console),
            self.category_label.clone(),
            self.price.clone().unwrap_or_default(),
            self.currency.clone(),
            opt_cell(self.in_stock),
            self.error.clone().unwrap_or_default(),
        ]
    }

    pub fn from_row(row: &[String]) -> Result<Self, String> {
        if row.len() != LOG_COLUMNS.len() {
            return Err(format!("expected {} columns, found {}", LOG_COLUMNS.len(), row.len()));
        }
        let timestamp = parse_ts(&row[0]).ok_or_else(|| format!("bad timestamp '{}'", row[0]))?;

        Ok(Self {
            timestamp,
            store_key: row[1].clone(),
            label: row[2].clone(),
            region: row[3].clone(),
            item_id: row[4].clone(),
            url: row[5].clone(),
            rank_overall: parse_rank(&row[6])?,
            rank_console: parse_rank(&row[7])?,
            category_label: row[8].clone(),
            price: non_empty(&row[9]),
            currency: row[10].clone(),
            in_stock: parse_flag(&row[11])?,
            error: non_empty(&row[12]),
        })
    }
}

fn opt_cell<T: ToString>(v: Option<T>) -> String {
    v.map(|x| x.to_string()).unwrap_or_default()
}

fn non_empty(cell: &str) -> Option<String> {
    if cell.is_empty() { None } else { Some(s!(cell)) }
}

fn parse_rank(cell: &str) -> Result<Option<u32>, String> {
    let t = cell.trim();
    if t.is_empty() {
        return Ok(None);
    }
    t.parse().map(Some).map_err(|_| format!("bad rank '{t}'"))
}

fn parse_flag(cell: &str) -> Result<Option<bool>, String> {
    match cell.trim().to_ascii_lowercase().as_str() {
        "" => Ok(None),
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(format!("bad in_stock '{other}'")),
    }
}

/* ---------------- Scalar series ---------------- */

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricPoint {
    pub timestamp: DateTime<Utc>,
    pub value: u64,
    /// Source text when `value` was derived (range midpoint, unparseable → 0).
    pub raw: Option<String>,
}

/* ---------------- Snapshot ---------------- */

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub updated_at: DateTime<Utc>,
    pub results: Vec<RankingRecord>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TrackerConfig;
    use crate::error::TransportError;

    fn sample() -> RankingRecord {
        let target = &TrackerConfig::builtin().targets[0];
        let ts = parse_ts("2026-03-01T09:00:00.123456Z").unwrap();
        let mut r = RankingRecord::for_target(target, ts);
        r.rank_overall = Some(1234);
        r.rank_console = Some(56);
        r.price = Some(s!("69.99"));
        r.in_stock = Some(true);
        r
    }

    #[test]
    fn row_round_trip_keeps_every_field() {
        let r = sample();
        let row = r.to_row();
        assert_eq!(row.len(), LOG_COLUMNS.len());
        assert_eq!(row[0], "2026-03-01T09:00:00.123456Z");
        assert_eq!(row[11], "true");
        assert_eq!(RankingRecord::from_row(&row).unwrap(), r);
    }

    #[test]
    fn failure_clears_measurements() {
        let r = sample().failed(&ExtractError::from(TransportError::Status(503)));
        assert_eq!(r.rank_overall, None);
        assert_eq!(r.price, None);
        assert_eq!(r.in_stock, None);
        assert_eq!(r.error.as_deref(), Some("transport: HTTP 503"));
        assert_eq!(r.store_key, "amazon_us");
    }

    #[test]
    fn column_drift_is_rejected() {
        let mut row = sample().to_row();
        row.pop();
        assert!(RankingRecord::from_row(&row).is_err());

        let mut row = sample().to_row();
        row[6] = s!("#12");
        assert!(RankingRecord::from_row(&row).unwrap_err().contains("bad rank"));
    }

    #[test]
    fn capitalized_flags_are_accepted() {
        let mut row = sample().to_row();
        row[11] = s!("False");
        assert_eq!(RankingRecord::from_row(&row).unwrap().in_stock, Some(false));
    }

    #[test]
    fn snapshot_json_uses_log_names() {
        let snap = Snapshot { updated_at: sample().timestamp, results: vec![sample()] };
        let v = serde_json::to_value(&snap).unwrap();
        assert_eq!(v["results"][0]["store"], "amazon_us");
        assert_eq!(v["results"][0]["console_category"], "Video Games");
        assert!(v["results"][0]["error"].is_null());
    }
}
