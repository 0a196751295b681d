// src/scrape/mod.rs
mod collect;

pub use collect::collect_metric;
pub use collect::collect_rankings;
pub use collect::observe;
