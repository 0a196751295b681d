// src/progress.rs
use crate::record::RankingRecord;

/// Progress reporting for a collection cycle.
/// Frontends implement this to surface per-target status.
pub trait Progress {
    /// Called at the start with the number of targets.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// Called once per target, with the record it produced.
    fn item_done(&mut self, _record: &RankingRecord) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Counts outcomes; used by the CLI for its closing line.
#[derive(Debug, Default)]
pub struct Tally {
    pub total: usize,
    pub done: usize,
    pub failed: usize,
}

impl Progress for Tally {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        self.failed = 0;
    }

    fn item_done(&mut self, record: &RankingRecord) {
        self.done += 1;
        if record.rank_overall.is_none() && record.rank_console.is_none() {
            self.failed += 1;
        }
    }
}
