// src/config/consts.rs

// Net
pub const REQUEST_TIMEOUT_SECS: u64 = 20;

// Pacing between targets (uniform, per target)
pub const PAUSE_MIN_MS: u64 = 4_000;
pub const PAUSE_MAX_MS: u64 = 9_000;

// Local store
pub const DEFAULT_DATA_DIR: &str = "data";
pub const LOG_FILE: &str = "rankings.csv";
pub const SNAPSHOT_FILE: &str = "latest.json";
pub const METRICS_DB: &str = "metrics.db";
pub const STORE_SEP: char = ',';

/// Column header of the ranking log. Order is the on-disk contract.
pub const LOG_COLUMNS: [&str; 13] = [
    "timestamp",
    "store",
    "label",
    "region",
    "asin",
    "url",
    "rank_overall",
    "rank_console",
    "console_category",
    "price",
    "currency",
    "in_stock",
    "error",
];

/// Reduced schema for scalar series exports.
pub const METRIC_COLUMNS: [&str; 2] = ["ts", "value"];

// Items whose id still carries this prefix are never fetched.
pub const PLACEHOLDER_PREFIX: &str = "PLACEHOLDER";
