// src/specs/detail.rs
//! Rank from a product detail page.
//!
//! The best-sellers block is located by its label text, tried in the order the
//! target lists them (localized label first, English fallback). All `#<n>`
//! tokens after the label are read: the first is the overall rank, and the
//! category rank is the first token whose trailing text names one of the
//! category keywords.
//!
//! Layouts seen in the wild:
//! - table: `<th>Best Sellers Rank</th><td>#1,234 in Video Games ( … ) #56 in …</td>`,
//!   with the label sometimes wrapped in a `<span>` inside the `<th>`
//! - bullets: `<li><span><span class="a-text-bold">Best Sellers Rank:</span> #1,234 in … </span></li>`
//! - flat: `<span>Best Sellers Rank #1,234 in Video Games (#56 in PC Accessories)</span>`

use std::sync::LazyLock;

use regex::Regex;
use scraper::{ElementRef, Selector};

use super::{Extraction, check_blocked};
use crate::config::TargetSpec;
use crate::core::html::{self, element_text, enclosing_element, next_sibling_element, parent_element};
use crate::core::numeric::{normalize_price, parse_int};
use crate::core::sanitize::{find_any_ci, to_lower};
use crate::error::ExtractError;

static RANK_TOKEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"#\s*([\d,]+)").expect("static regex"));

static AVAILABILITY: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("#availability").expect("static selector"));

#[derive(Debug, Default, PartialEq, Eq)]
pub struct Ranks {
    pub overall: Option<u32>,
    pub category: Option<u32>,
}

pub fn extract(target: &TargetSpec, raw: &str) -> Result<Extraction, ExtractError> {
    let doc = html::parse(raw);
    let root = doc.root_element();
    check_blocked(root)?;

    let price_sels = html::compile_all(&target.price_selectors).map_err(ExtractError::Parse)?;
    let keywords = target.effective_category_keywords();

    let (label, text) = locate_rank_text(root, &target.rank_labels)?;
    let ranks = parse_rank_tokens(&text, &keywords)?;
    if ranks.overall.is_none() {
        return Err(ExtractError::Parse(format!("no rank after '{label}'")));
    }

    let note = match (ranks.category, keywords.is_empty()) {
        (None, false) => Some(format!("not found: no rank in {}", keywords.join(" / "))),
        _ => None,
    };

    Ok(Extraction {
        rank_overall: ranks.overall,
        rank_console: ranks.category,
        price: html::first_text(root, &price_sels).and_then(|t| normalize_price(&t)),
        in_stock: root
            .select(&AVAILABILITY)
            .next()
            .map(|el| find_any_ci(&element_text(el), &target.stock_phrases).is_some()),
        note,
    })
}

/// First label (priority order) whose block carries rank tokens.
fn locate_rank_text<'l>(
    root: ElementRef<'_>,
    labels: &'l [String],
) -> Result<(&'l str, String), ExtractError> {
    let mut seen_label: Option<&str> = None;
    for label in labels {
        for el in html::elements_with_text(root, label) {
            seen_label.get_or_insert(label.as_str());
            let text = rank_text(el, label);
            if RANK_TOKEN.is_match(&text) {
                return Ok((label.as_str(), text));
            }
        }
    }
    Err(ExtractError::Parse(match seen_label {
        Some(l) => format!("no rank after '{l}'"),
        None => s!("best sellers rank label not found"),
    }))
}

fn rank_text(label_el: ElementRef<'_>, label: &str) -> String {
    let own = element_text(label_el);
    let own_tail = after_label(&own, label);
    if RANK_TOKEN.is_match(own_tail) {
        return s!(own_tail);
    }
    // Label cell (possibly wrapped: `<th><span>label</span></th>`) → value cell.
    if let Some(cell) = enclosing_element(label_el, &["th", "td"]) {
        let cell_text = element_text(cell);
        if !RANK_TOKEN.is_match(after_label(&cell_text, label)) {
            if let Some(value) = next_sibling_element(cell) {
                return element_text(value);
            }
        }
    }
    match parent_element(label_el) {
        Some(parent) => {
            let text = element_text(parent);
            s!(after_label(&text, label))
        }
        None => own,
    }
}

/// Text following the label; the whole text when the label can't be sliced
/// out safely.
fn after_label<'a>(text: &'a str, label: &str) -> &'a str {
    let lower = to_lower(text);
    let needle = to_lower(label.trim());
    if lower.len() != text.len() || needle.is_empty() {
        return text;
    }
    lower
        .find(&needle)
        .and_then(|i| text.get(i + needle.len()..))
        .unwrap_or(text)
}

/// All `#<n>` tokens in `text`. The category rank is the first token whose
/// trailing segment (up to the next token) mentions a keyword.
pub fn parse_rank_tokens(text: &str, keywords: &[String]) -> Result<Ranks, ExtractError> {
    let mut tokens: Vec<(usize, usize, u32)> = Vec::new();
    for caps in RANK_TOKEN.captures_iter(text) {
        let (Some(whole), Some(num)) = (caps.get(0), caps.get(1)) else { continue };
        let Some(n) = parse_int(num.as_str()) else { continue };
        let n = u32::try_from(n)
            .map_err(|_| ExtractError::Value(format!("rank {} out of range", num.as_str())))?;
        tokens.push((whole.start(), whole.end(), n));
    }

    let category = tokens.iter().enumerate().find_map(|(i, &(_, end, n))| {
        let seg_end = tokens.get(i + 1).map(|t| t.0).unwrap_or(text.len());
        find_any_ci(&text[end..seg_end], keywords).map(|_| n)
    });

    Ok(Ranks { overall: tokens.first().map(|t| t.2), category })
}
