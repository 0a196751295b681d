// src/specs/mod.rs
//! # Extraction "specs"
//!
//! Each spec knows how to read one kind of page and turn it into measured
//! values. Where the ground truth lives is decided by the target descriptor
//! (label variants, selector priority lists, phrases); the code here only
//! walks those lists in order.
//!
//! ## What lives here
//! - **Pure parsing** of already-fetched content (HTML or JSON).
//! - **Fallback precedence**: the first selector/label that yields something wins.
//! - **Normalization** through `core::numeric` only.
//!
//! ## What does **not** live here
//! - Fetching, pacing, timestamps, persistence: see `scrape`, `store`, `runner`.
//!
//! ## Typical call chain
//! ```text
//! runner → scrape::collect_rankings → scrape::observe → specs::<kind>::extract
//!                                                    ↘ RankingRecord
//!        → store::RecordStore::append_records / write_snapshot
//! ```
//!
//! ## Testing notes
//! Specs are tested offline against small inline fixtures.

pub mod detail;
pub mod listing;
pub mod steam;

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use crate::error::{ExtractError, TransportError};
use crate::record::RankingRecord;

/// What a page yielded. `note` carries a partial miss (e.g. overall rank
/// found, category rank not) without discarding the rest.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Extraction {
    pub rank_overall: Option<u32>,
    pub rank_console: Option<u32>,
    pub price: Option<String>,
    pub in_stock: Option<bool>,
    pub note: Option<String>,
}

impl Extraction {
    pub fn apply(self, mut record: RankingRecord) -> RankingRecord {
        record.rank_overall = self.rank_overall;
        record.rank_console = self.rank_console;
        record.price = self.price;
        record.in_stock = self.in_stock;
        record.error = self.note;
        record
    }
}

static CAPTCHA: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("form[action*='validateCaptcha'], img[src*='captcha']").expect("static selector")
});

/// Robot-check pages come back as 200; treat them as a failed fetch.
pub(crate) fn check_blocked(root: ElementRef<'_>) -> Result<(), ExtractError> {
    if root.select(&CAPTCHA).next().is_some() {
        return Err(TransportError::Blocked(s!("captcha page served")).into());
    }
    Ok(())
}
