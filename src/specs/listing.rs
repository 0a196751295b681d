// src/specs/listing.rs
//! Rank from a category best-seller listing.
//!
//! Candidate items come from the first selector in `item_selectors` that
//! matches anything; listings are served with different markup per region and
//! session. An item's position in document order is its rank (1-based).

use std::sync::LazyLock;

use scraper::{ElementRef, Selector};

use super::{Extraction, check_blocked};
use crate::config::TargetSpec;
use crate::core::html::{self, element_text};
use crate::core::numeric::normalize_price;
use crate::core::sanitize::{find_any_ci, normalize_ws, to_lower};
use crate::error::ExtractError;

static IMG_ALT: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("img[alt]").expect("static selector"));
static LINK: LazyLock<Selector> = LazyLock::new(|| Selector::parse("a").expect("static selector"));

pub fn extract(target: &TargetSpec, raw: &str) -> Result<Extraction, ExtractError> {
    let doc = html::parse(raw);
    let root = doc.root_element();
    check_blocked(root)?;

    let item_sels = html::compile_all(&target.item_selectors).map_err(ExtractError::Parse)?;
    let price_sels = html::compile_all(&target.price_selectors).map_err(ExtractError::Parse)?;

    let (_, items) = html::select_first_nonempty(root, &item_sels)
        .ok_or_else(|| ExtractError::Parse(s!("no listing items matched any selector")))?;

    for (i, item) in items.iter().copied().enumerate() {
        if find_any_ci(&item_title(item), &target.match_keywords).is_none() {
            continue;
        }
        let rank = u32::try_from(i + 1)
            .map_err(|_| ExtractError::Value(format!("position {} out of range", i + 1)))?;
        return Ok(Extraction {
            rank_overall: None,
            rank_console: Some(rank),
            price: html::first_text(item, &price_sels).and_then(|t| normalize_price(&t)),
            in_stock: find_any_ci(&element_text(item), &target.stock_phrases).map(|_| true),
            note: None,
        });
    }

    Err(ExtractError::NotFound { scanned: items.len() })
}

/// Image alt text plus link text, lower-cased.
pub fn item_title(item: ElementRef<'_>) -> String {
    let mut parts: Vec<String> = item
        .select(&IMG_ALT)
        .filter_map(|img| img.value().attr("alt"))
        .map(String::from)
        .collect();
    parts.extend(item.select(&LINK).map(element_text));
    to_lower(&normalize_ws(&parts.join(" ")))
}
