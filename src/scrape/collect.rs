// src/scrape/collect.rs
use std::{thread, time::Duration};

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{debug, info, warn};

use crate::{
    config::{options::Pacing, SteamSpec, TargetKind, TargetSpec, TrackerConfig},
    core::net::Fetch,
    error::ExtractError,
    progress::Progress,
    record::{now_utc, RankingRecord},
    specs::{self, steam::MetricReading},
};

/// One target, one record. Never fails: every problem ends up in `error`.
pub fn observe(target: &TargetSpec, fetch: &dyn Fetch, now: DateTime<Utc>) -> RankingRecord {
    let record = RankingRecord::for_target(target, now);
    match extract(target, fetch) {
        Ok(ex) => ex.apply(record),
        Err(e) => record.failed(&e),
    }
}

fn extract(target: &TargetSpec, fetch: &dyn Fetch) -> Result<specs::Extraction, ExtractError> {
    if target.is_unconfigured() {
        return Err(ExtractError::Skipped(s!("item id not configured")));
    }
    let url = target.url();
    debug!(store = %target.key, %url, "fetching");
    let body = fetch.get(&url)?.into_body()?;
    match target.kind {
        TargetKind::Detail => specs::detail::extract(target, &body),
        TargetKind::Listing => specs::listing::extract(target, &body),
    }
}

/// Run every target once, in configuration order, pausing between targets.
pub fn collect_rankings(
    cfg: &TrackerConfig,
    fetch: &dyn Fetch,
    pacing: Pacing,
    progress: Option<&mut dyn Progress>,
) -> Vec<RankingRecord> {
    collect_with(cfg, fetch, pacing, &mut rand::thread_rng(), &mut thread::sleep, progress)
}

fn collect_with<R: Rng + ?Sized>(
    cfg: &TrackerConfig,
    fetch: &dyn Fetch,
    pacing: Pacing,
    rng: &mut R,
    sleep: &mut dyn FnMut(Duration),
    mut progress: Option<&mut dyn Progress>,
) -> Vec<RankingRecord> {
    let total = cfg.targets.len();
    if let Some(p) = progress.as_deref_mut() {
        p.begin(total);
    }

    let mut batch = Vec::with_capacity(total);
    for (i, target) in cfg.targets.iter().enumerate() {
        if let Some(p) = progress.as_deref_mut() {
            p.log(&format!("[{}/{}] {}", i + 1, total, target.label));
        }

        let record = observe(target, fetch, now_utc());
        log_outcome(&record);
        if let Some(p) = progress.as_deref_mut() {
            p.item_done(&record);
        }
        batch.push(record);

        if i + 1 < total {
            let pause = pacing.sample(rng);
            if !pause.is_zero() {
                debug!(ms = pause.as_millis() as u64, "pausing");
                sleep(pause);
            }
        }
    }

    if let Some(p) = progress.as_deref_mut() {
        p.finish();
    }
    batch
}

fn price_label(r: &RankingRecord) -> String {
    match &r.price {
        Some(p) if r.currency.is_empty() => s!(p),
        Some(p) => join!(p, " ", &r.currency),
        None => s!("-"),
    }
}

fn log_outcome(r: &RankingRecord) {
    let overall = r.rank_overall.map(|v| v.to_string()).unwrap_or_else(|| s!("-"));
    let category = r.rank_console.map(|v| v.to_string()).unwrap_or_else(|| s!("-"));
    let price = price_label(r);
    match &r.error {
        None => info!(store = %r.store_key, overall = %overall, category = %category, price = %price, "ranked"),
        Some(e) if r.rank_overall.is_some() || r.rank_console.is_some() => {
            info!(
                store = %r.store_key, overall = %overall, category = %category, price = %price, note = %e,
                "ranked (partial)"
            )
        }
        Some(e) => warn!(store = %r.store_key, error = %e, "no rank"),
    }
}

/// Fetch and read the scalar metric. Errors mean nothing was observed.
pub fn collect_metric(steam: &SteamSpec, fetch: &dyn Fetch) -> Result<MetricReading, ExtractError> {
    let url = steam.url();
    debug!(platform = %steam.platform, %url, "fetching metric");
    let body = fetch.get(&url)?.into_body()?;
    specs::steam::extract_owners(&body)
}
