// src/config/options.rs
use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;

use super::consts::*;

/// Randomized pause inserted between targets.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Pacing {
    pub min_ms: u64,
    pub max_ms: u64,
}

impl Default for Pacing {
    fn default() -> Self {
        Self { min_ms: PAUSE_MIN_MS, max_ms: PAUSE_MAX_MS }
    }
}

impl Pacing {
    /// No pause at all (tests, one-off runs).
    pub fn none() -> Self {
        Self { min_ms: 0, max_ms: 0 }
    }

    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        // Swapped bounds are accepted rather than rejected.
        if min_ms <= max_ms { Self { min_ms, max_ms } } else { Self { min_ms: max_ms, max_ms: min_ms } }
    }

    /// Sample one pause, uniform in `[min_ms, max_ms]`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        if self.max_ms == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rng.gen_range(self.min_ms..=self.max_ms))
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub data_dir: PathBuf,
    pub config_path: Option<PathBuf>,
    pub pacing: Pacing,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            config_path: None,
            pacing: Pacing::default(),
        }
    }
}

impl RunOptions {
    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE)
    }

    pub fn snapshot_path(&self) -> PathBuf {
        self.data_dir.join(SNAPSHOT_FILE)
    }

    pub fn metrics_db_path(&self) -> PathBuf {
        self.data_dir.join(METRICS_DB)
    }
}
