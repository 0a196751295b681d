// src/cli.rs
use std::path::PathBuf;

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc};
use clap::{Args, Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, bail, eyre};

use crate::{
    config::{RunOptions, SteamSpec, TrackerConfig, consts::DEFAULT_DATA_DIR, options::Pacing},
    core::net::HttpFetcher,
    progress::{Progress, Tally},
    record::{RankingRecord, format_ts, now_utc, parse_ts},
    report::summarize,
    runner,
    store::{MetricStore, RecordStore, export_metric_csv},
};

#[derive(Debug, Parser)]
#[command(name = "rank_scrape", version, about = "Track store sales ranks and Steam owner estimates")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Directory holding the ranking log, snapshot and metric database
    #[arg(long, global = true, default_value = DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Target list (JSON); the builtin table is used when absent
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[arg(long, global = true)]
    pub pause_min_ms: Option<u64>,

    #[arg(long, global = true)]
    pub pause_max_ms: Option<u64>,

    /// -v debug, -vv trace (RUST_LOG wins)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Also append log lines to this file
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run one ranking cycle over every target
    Collect,
    /// Observe the Steam metric once and store it
    Metric,
    /// Print (or export) stored metric points in a time window
    Query {
        /// Start: RFC 3339 or YYYY-MM-DD (default: 30 days ago)
        #[arg(long)]
        from: Option<String>,
        /// End: RFC 3339 or YYYY-MM-DD, inclusive (default: now)
        #[arg(long)]
        to: Option<String>,
        /// Write `ts,value` CSV here instead of printing
        #[arg(long)]
        csv: Option<PathBuf>,
    },
    /// First / current / growth of the metric over the last N days
    Summary {
        #[arg(long, default_value_t = 7)]
        days: i64,
    },
    /// Print the latest snapshot
    Snapshot {
        /// Recompute it from the ranking log first
        #[arg(long)]
        rebuild: bool,
    },
    /// List configured targets
    Targets,
    /// Run now, then every day at a fixed local time
    Daily {
        /// HH:MM, 24h
        #[arg(long, default_value = "09:00")]
        at: String,
    },
}

impl GlobalArgs {
    pub fn run_options(&self) -> RunOptions {
        let defaults = Pacing::default();
        RunOptions {
            data_dir: self.data_dir.clone(),
            config_path: self.config.clone(),
            pacing: Pacing::new(
                self.pause_min_ms.unwrap_or(defaults.min_ms),
                self.pause_max_ms.unwrap_or(defaults.max_ms),
            ),
        }
    }
}

pub fn load_config(opts: &RunOptions) -> Result<TrackerConfig> {
    match &opts.config_path {
        Some(path) => TrackerConfig::load(path).wrap_err("loading target config"),
        None => Ok(TrackerConfig::builtin()),
    }
}

/// Accepts RFC 3339, or a bare date (start or end of that UTC day).
pub fn parse_bound(s: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Some(ts) = parse_ts(s) {
        return Ok(ts);
    }
    let date = NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| eyre!("'{s}' is neither RFC 3339 nor YYYY-MM-DD"))?;
    let time = if end_of_day {
        NaiveTime::from_hms_micro_opt(23, 59, 59, 999_999)
    } else {
        NaiveTime::from_hms_opt(0, 0, 0)
    }
    .ok_or_else(|| eyre!("bad time of day"))?;
    Ok(date.and_time(time).and_utc())
}

fn steam_of(cfg: &TrackerConfig) -> Result<&SteamSpec> {
    cfg.steam.as_ref().ok_or_else(|| eyre!("no steam metric configured"))
}

/// Prints one line per target as it completes.
struct CliProgress {
    tally: Tally,
}

impl Progress for CliProgress {
    fn begin(&mut self, total: usize) {
        self.tally.begin(total);
    }

    fn item_done(&mut self, r: &RankingRecord) {
        self.tally.item_done(r);
        println!("[{}/{}] {}", self.tally.done, self.tally.total, format_record(r));
    }

    fn finish(&mut self) {
        println!("{} targets, {} without a rank", self.tally.total, self.tally.failed);
    }
}

pub fn format_record(r: &RankingRecord) -> String {
    let rank = |v: Option<u32>| v.map(|n| format!("#{n}")).unwrap_or_else(|| s!("-"));
    let mut line = format!(
        "{:<12} overall {:>8}  {} {:>6}",
        r.store_key,
        rank(r.rank_overall),
        r.category_label,
        rank(r.rank_console)
    );
    if let Some(p) = &r.price {
        line.push_str(&format!("  {} {}", p, r.currency));
    }
    if let Some(e) = &r.error {
        line.push_str(&format!("  ({e})"));
    }
    line
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    crate::log::init(cli.global.verbose, cli.global.log_file.as_deref())?;

    let opts = cli.global.run_options();
    let cfg = load_config(&opts)?;

    match cli.command {
        Command::Collect => {
            let fetch = HttpFetcher::new()?;
            let mut progress = CliProgress { tally: Tally::default() };
            runner::run_cycle(&opts, &cfg, &fetch, Some(&mut progress))?;
        }
        Command::Metric => {
            let fetch = HttpFetcher::new()?;
            match runner::run_metric(&opts, steam_of(&cfg)?, &fetch)? {
                Some(p) => println!("{}  {}", format_ts(&p.timestamp), p.value),
                None => bail!("metric not observed (see log)"),
            }
        }
        Command::Query { from, to, csv } => {
            let steam = steam_of(&cfg)?;
            let end = match to {
                Some(t) => parse_bound(&t, true)?,
                None => now_utc(),
            };
            let start = match from {
                Some(f) => parse_bound(&f, false)?,
                None => end - Duration::days(30),
            };
            let store = MetricStore::open(&opts.metrics_db_path(), &steam.platform, &steam.metric_type)?;
            let points = store.query_metric_range(start, end)?;
            match csv {
                Some(path) => {
                    export_metric_csv(&path, &points)?;
                    println!("{} points -> {}", points.len(), path.display());
                }
                None => {
                    for p in &points {
                        match &p.raw {
                            Some(raw) => println!("{}  {}  ({raw})", format_ts(&p.timestamp), p.value),
                            None => println!("{}  {}", format_ts(&p.timestamp), p.value),
                        }
                    }
                }
            }
        }
        Command::Summary { days } => {
            let steam = steam_of(&cfg)?;
            let store = MetricStore::open(&opts.metrics_db_path(), &steam.platform, &steam.metric_type)?;
            let end = now_utc();
            let points = store.query_metric_range(end - Duration::days(days), end)?;
            match summarize(&points) {
                Some(s) => {
                    println!("{} {} over {days} days ({} samples)", steam.platform, steam.metric_type, s.samples);
                    println!("  first    {}", s.first);
                    println!("  current  {}", s.current);
                    println!("  growth   {:+} ({:+.2}%)", s.growth, s.growth_rate_pct);
                }
                None => println!("no data in the last {days} days"),
            }
        }
        Command::Snapshot { rebuild } => {
            let store = RecordStore::from_options(&opts);
            let snap = if rebuild { Some(store.rebuild_snapshot()?) } else { store.read_snapshot()? };
            match snap {
                Some(s) => {
                    println!("updated {}", format_ts(&s.updated_at));
                    for r in &s.results {
                        println!("  {}", format_record(r));
                    }
                }
                None => println!("no snapshot at {}", store.snapshot_path().display()),
            }
        }
        Command::Targets => {
            for t in &cfg.targets {
                let state = if t.is_unconfigured() { "unconfigured" } else { "active" };
                println!("{:<12} {:<10} {:<14} {}  {}", t.key, format!("{:?}", t.kind).to_lowercase(), t.region, state, t.url());
            }
            if let Some(steam) = &cfg.steam {
                println!("{:<12} {:<10} {}", steam.platform.to_lowercase(), steam.metric_type, steam.url());
            }
        }
        Command::Daily { at } => {
            let at = NaiveTime::parse_from_str(&at, "%H:%M").wrap_err_with(|| format!("--at '{at}'"))?;
            let fetch = HttpFetcher::new()?;
            runner::run_daily(&opts, &cfg, &fetch, at);
        }
    }
    Ok(())
}
