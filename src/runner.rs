// src/runner.rs
use std::thread;

use chrono::{DateTime, Datelike, Duration as ChronoDuration, Local, NaiveTime, TimeZone, Weekday};
use serde_json::json;
use tracing::{error, info, warn};

use crate::{
    config::{RunOptions, SteamSpec, TrackerConfig},
    core::net::Fetch,
    error::StoreError,
    progress::Progress,
    record::{now_utc, MetricPoint, RankingRecord},
    report::{summarize, MetricSummary},
    scrape,
    store::{MetricStore, RecordStore},
};

/// What one ranking cycle produced.
#[derive(Debug)]
pub struct CycleSummary {
    pub records: Vec<RankingRecord>,
    pub failed: usize,
}

/// Collect every target, then persist the whole batch (log + snapshot).
/// Per-target failures live in the records; only storage errors escape.
pub fn run_cycle(
    opts: &RunOptions,
    cfg: &TrackerConfig,
    fetch: &dyn Fetch,
    progress: Option<&mut dyn Progress>,
) -> Result<CycleSummary, StoreError> {
    let records = scrape::collect_rankings(cfg, fetch, opts.pacing, progress);

    let store = RecordStore::from_options(opts);
    store.append_records(&records)?;
    store.write_snapshot(&records)?;

    let failed = records.iter().filter(|r| r.rank_overall.is_none() && r.rank_console.is_none()).count();
    info!(
        saved = records.len(),
        failed,
        log = %store.log_path().display(),
        "saved {} records",
        records.len()
    );
    Ok(CycleSummary { records, failed })
}

/// Observe the scalar metric once and append it. `Ok(None)`: nothing was
/// observed (transport/parse failure), nothing appended.
pub fn run_metric(
    opts: &RunOptions,
    steam: &SteamSpec,
    fetch: &dyn Fetch,
) -> Result<Option<MetricPoint>, StoreError> {
    let reading = match scrape::collect_metric(steam, fetch) {
        Ok(r) => r,
        Err(e) => {
            warn!(platform = %steam.platform, error = %e, "metric not observed");
            return Ok(None);
        }
    };

    let ts = now_utc();
    let store = MetricStore::open(&opts.metrics_db_path(), &steam.platform, &steam.metric_type)?;
    let meta = json!({ "app_id": steam.app_id, "source": "steamspy_estimate", "kind": reading.numeric.kind() });
    store.append_reading(ts, &reading, Some(&meta))?;

    info!(platform = %steam.platform, metric = %steam.metric_type, value = reading.value, "metric saved");
    Ok(Some(MetricPoint { timestamp: ts, value: reading.value, raw: reading.raw_note() }))
}

/// Summary of the last `days` of the configured metric series.
pub fn metric_summary(
    opts: &RunOptions,
    steam: &SteamSpec,
    days: i64,
) -> Result<Option<MetricSummary>, StoreError> {
    let store = MetricStore::open(&opts.metrics_db_path(), &steam.platform, &steam.metric_type)?;
    let end = now_utc();
    let points = store.query_metric_range(end - ChronoDuration::days(days), end)?;
    Ok(summarize(&points))
}

/* ---------------- Daily schedule ---------------- */

/// Next occurrence of wall-clock `at` strictly after `now`.
pub fn next_run_after<Tz: TimeZone>(now: &DateTime<Tz>, at: NaiveTime) -> DateTime<Tz> {
    let tz = now.timezone();
    let mut day = now.date_naive();
    loop {
        // Nonexistent local times (DST gap) fall through to the next day.
        if let Some(t) = tz.from_local_datetime(&day.and_time(at)).earliest() {
            if t > *now {
                return t;
            }
        }
        day = match day.succ_opt() {
            Some(d) => d,
            None => return now.clone(),
        };
    }
}

fn one_day(opts: &RunOptions, cfg: &TrackerConfig, fetch: &dyn Fetch) {
    info!("daily collection started");
    if let Err(e) = run_cycle(opts, cfg, fetch, None) {
        error!(error = %e, "ranking cycle failed");
    }
    if let Some(steam) = &cfg.steam {
        if let Err(e) = run_metric(opts, steam, fetch) {
            error!(error = %e, "metric cycle failed");
        }
        if Local::now().weekday() == Weekday::Mon {
            match metric_summary(opts, steam, 7) {
                Ok(Some(s)) => info!(
                    first = s.first,
                    current = s.current,
                    growth = s.growth,
                    rate_pct = s.growth_rate_pct,
                    samples = s.samples,
                    "weekly summary"
                ),
                Ok(None) => warn!("weekly summary: no data"),
                Err(e) => error!(error = %e, "weekly summary failed"),
            }
        }
    }
    info!("daily collection finished");
}

/// Run once now, then every day at local time `at`, until the process is
/// interrupted.
pub fn run_daily(opts: &RunOptions, cfg: &TrackerConfig, fetch: &dyn Fetch, at: NaiveTime) -> ! {
    info!(at = %at.format("%H:%M"), "scheduler started");
    one_day(opts, cfg, fetch);
    loop {
        let now = Local::now();
        let next = next_run_after(&now, at);
        info!(next = %next.format("%Y-%m-%d %H:%M"), "waiting for next run");
        if let Ok(wait) = (next - now).to_std() {
            thread::sleep(wait);
        }
        one_day(opts, cfg, fetch);
    }
}
