// src/store.rs
//! Local persistence.
//!
//! - [`RecordStore`]: append-only CSV log of every observation plus a JSON
//!   snapshot of the latest cycle. The snapshot is replaced wholesale each
//!   cycle and can always be rebuilt from the log.
//! - [`MetricStore`]: one scalar series (platform + metric type) in an SQLite
//!   table. Timestamps are stored as fixed-width RFC 3339 text, so text order
//!   is time order.

use std::{
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::debug;

use crate::{
    config::{
        consts::{LOG_COLUMNS, METRIC_COLUMNS, STORE_SEP},
        RunOptions,
    },
    csv::{parse_rows, write_row},
    error::StoreError,
    file::{append_rows, ensure_parent, replace_file},
    record::{format_ts, now_utc, parse_ts, MetricPoint, RankingRecord, Snapshot},
    report::latest_by_store,
    specs::steam::MetricReading,
};

/* ---------------- Ranking log + snapshot ---------------- */

#[derive(Clone, Debug)]
pub struct RecordStore {
    log_path: PathBuf,
    snapshot_path: PathBuf,
}

impl RecordStore {
    pub fn new(log_path: impl Into<PathBuf>, snapshot_path: impl Into<PathBuf>) -> Self {
        Self { log_path: log_path.into(), snapshot_path: snapshot_path.into() }
    }

    pub fn from_options(opts: &RunOptions) -> Self {
        Self::new(opts.log_path(), opts.snapshot_path())
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn snapshot_path(&self) -> &Path {
        &self.snapshot_path
    }

    /// Append `batch` in order. Creates the log (header only) even for an
    /// empty batch.
    pub fn append_records(&self, batch: &[RankingRecord]) -> Result<(), StoreError> {
        let rows: Vec<Vec<String>> = batch.iter().map(RankingRecord::to_row).collect();
        append_rows(&self.log_path, &LOG_COLUMNS, &rows, STORE_SEP)?;
        debug!(path = %self.log_path.display(), rows = rows.len(), "log appended");
        Ok(())
    }

    /// Every record in the log, oldest first. A missing log is empty.
    pub fn read_log(&self) -> Result<Vec<RankingRecord>, StoreError> {
        let text = match fs::read_to_string(&self.log_path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(StoreError::io(&self.log_path, e)),
        };
        let malformed = |line: usize, reason: String| StoreError::Malformed {
            path: self.log_path.clone(),
            line,
            reason,
        };

        let mut rows = parse_rows(&text, STORE_SEP).into_iter();
        match rows.next() {
            None => return Ok(Vec::new()),
            Some(header) if header.iter().map(String::as_str).eq(LOG_COLUMNS) => {}
            Some(header) => return Err(malformed(1, format!("unexpected header {}", header.join(",")))),
        }

        rows.enumerate()
            .map(|(i, row)| RankingRecord::from_row(&row).map_err(|reason| malformed(i + 2, reason)))
            .collect()
    }

    /// Replace the snapshot with exactly `batch`.
    pub fn write_snapshot(&self, batch: &[RankingRecord]) -> Result<Snapshot, StoreError> {
        let snapshot = Snapshot { updated_at: now_utc(), results: batch.to_vec() };
        let body = serde_json::to_vec_pretty(&snapshot)?;
        replace_file(&self.snapshot_path, &body)?;
        debug!(path = %self.snapshot_path.display(), results = batch.len(), "snapshot replaced");
        Ok(snapshot)
    }

    pub fn read_snapshot(&self) -> Result<Option<Snapshot>, StoreError> {
        let text = match fs::read_to_string(&self.snapshot_path) {
            Ok(t) => t,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StoreError::io(&self.snapshot_path, e)),
        };
        Ok(Some(serde_json::from_str(&text)?))
    }

    /// Recompute the snapshot from the log: latest record per store key.
    pub fn rebuild_snapshot(&self) -> Result<Snapshot, StoreError> {
        let log = self.read_log()?;
        self.write_snapshot(&latest_by_store(&log))
    }
}

/* ---------------- Scalar series ---------------- */

const METRICS_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS metrics (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        timestamp   TEXT NOT NULL,
        platform    TEXT NOT NULL,
        metric_type TEXT NOT NULL,
        value       INTEGER NOT NULL,
        raw         TEXT,
        metadata    TEXT,
        created_at  TEXT NOT NULL
    );
    CREATE INDEX IF NOT EXISTS idx_metrics_series
        ON metrics (platform, metric_type, timestamp);
";

pub struct MetricStore {
    conn: Connection,
    path: PathBuf,
    platform: String,
    metric_type: String,
}

impl MetricStore {
    /// Open (creating if needed) the series `platform`/`metric_type` in `path`.
    pub fn open(path: &Path, platform: &str, metric_type: &str) -> Result<Self, StoreError> {
        ensure_parent(path)?;
        let conn = Connection::open(path)?;
        conn.execute_batch(METRICS_SCHEMA)?;
        Ok(Self {
            conn,
            path: path.to_path_buf(),
            platform: s!(platform),
            metric_type: s!(metric_type),
        })
    }

    pub fn append_metric(&self, timestamp: DateTime<Utc>, value: u64) -> Result<(), StoreError> {
        self.insert(timestamp, value, None, None)
    }

    /// Value plus the source text when it was derived, and free-form metadata.
    pub fn append_reading(
        &self,
        timestamp: DateTime<Utc>,
        reading: &MetricReading,
        metadata: Option<&serde_json::Value>,
    ) -> Result<(), StoreError> {
        let meta = metadata.map(serde_json::to_string).transpose()?;
        self.insert(timestamp, reading.value, reading.raw_note(), meta)
    }

    fn insert(
        &self,
        timestamp: DateTime<Utc>,
        value: u64,
        raw: Option<String>,
        metadata: Option<String>,
    ) -> Result<(), StoreError> {
        let value = i64::try_from(value)
            .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
        self.conn.execute(
            "INSERT INTO metrics (timestamp, platform, metric_type, value, raw, metadata, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                format_ts(&timestamp),
                self.platform,
                self.metric_type,
                value,
                raw,
                metadata,
                format_ts(&now_utc()),
            ],
        )?;
        Ok(())
    }

    /// Points with `start <= timestamp <= end`, ascending.
    pub fn query_metric_range(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MetricPoint>, StoreError> {
        self.points_between(&format_ts(&start), &format_ts(&end))
    }

    /// Everything in the series.
    pub fn all_points(&self) -> Result<Vec<MetricPoint>, StoreError> {
        self.points_between("", "~")
    }

    fn points_between(&self, start: &str, end: &str) -> Result<Vec<MetricPoint>, StoreError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, timestamp, value, raw FROM metrics
             WHERE platform = ?1 AND metric_type = ?2 AND timestamp >= ?3 AND timestamp <= ?4
             ORDER BY timestamp ASC, id ASC",
        )?;
        let rows = stmt
            .query_map(params![self.platform, self.metric_type, start, end], |row| {
                Ok((
                    row.get::<_, i64>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, i64>(2)?,
                    row.get::<_, Option<String>>(3)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(id, ts, value, raw)| {
                let malformed = |reason: String| StoreError::Malformed {
                    path: self.path.clone(),
                    line: id as usize,
                    reason,
                };
                let timestamp = parse_ts(&ts).ok_or_else(|| malformed(format!("bad timestamp '{ts}'")))?;
                let value = u64::try_from(value).map_err(|_| malformed(format!("negative value {value}")))?;
                Ok(MetricPoint { timestamp, value, raw })
            })
            .collect()
    }
}

/// `ts,value` export of a series.
pub fn export_metric_csv(path: &Path, points: &[MetricPoint]) -> Result<(), StoreError> {
    let mut buf = Vec::new();
    let io = |e| StoreError::io(path, e);
    write_row(&mut buf, &METRIC_COLUMNS, STORE_SEP).map_err(io)?;
    for p in points {
        write_row(&mut buf, &[format_ts(&p.timestamp), p.value.to_string()], STORE_SEP).map_err(io)?;
    }
    replace_file(path, &buf)
}
