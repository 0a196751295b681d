// src/core/numeric.rs
//! The one numeric normalization rule.
//!
//! Ranks, counts and prices all go through here: thousands separators are
//! stripped before conversion, and callers get a tagged [`Numeric`] instead of
//! re-implementing the int / string / range triage themselves.

use serde_json::Value;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Numeric {
    Integer(u64),
    /// `"low .. high"` estimate; stands for its floor midpoint.
    Range { low: u64, high: u64 },
    Unparseable(String),
}

impl Numeric {
    /// Point value, if there is one.
    pub fn value(&self) -> Option<u64> {
        match self {
            Numeric::Integer(v) => Some(*v),
            Numeric::Range { low, high } => Some(midpoint(*low, *high)),
            Numeric::Unparseable(_) => None,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Numeric::Integer(_) => "integer",
            Numeric::Range { .. } => "range",
            Numeric::Unparseable(_) => "unparseable",
        }
    }
}

fn midpoint(low: u64, high: u64) -> u64 {
    ((low as u128 + high as u128) / 2) as u64
}

/// Thousands separators: commas plus any whitespace (NBSP, narrow NBSP).
fn is_separator(c: char) -> bool {
    c == ',' || c.is_whitespace()
}

pub fn strip_separators(raw: &str) -> String {
    raw.chars().filter(|&c| !is_separator(c)).collect()
}

/// Separator-stripped digits to integer. `None` on anything else.
pub fn parse_int(raw: &str) -> Option<u64> {
    let digits = strip_separators(raw);
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}

pub fn normalize(raw: &str) -> Numeric {
    let t = raw.trim();
    if let Some(v) = parse_int(t) {
        return Numeric::Integer(v);
    }
    if let Some((lo, hi)) = t.split_once("..") {
        if let (Some(low), Some(high)) = (parse_int(lo), parse_int(hi)) {
            return Numeric::Range { low, high };
        }
    }
    Numeric::Unparseable(s!(t))
}

/// Same rule for a decoded JSON field (numbers pass straight through).
pub fn normalize_json(v: &Value) -> Numeric {
    match v {
        Value::Number(n) => match (n.as_u64(), n.as_f64()) {
            (Some(u), _) => Numeric::Integer(u),
            (None, Some(f)) if f.is_finite() && f >= 0.0 => Numeric::Integer(f.floor() as u64),
            _ => Numeric::Unparseable(n.to_string()),
        },
        Value::String(s) => normalize(s),
        other => Numeric::Unparseable(other.to_string()),
    }
}

/// Monetary amount as a decimal string. A last ',' followed by exactly two
/// digits is a decimal comma (`59,99 €`, `1.299,99`); every other ',' and
/// '.' before it is a separator. A trailing '.' is dropped (whole-part spans
/// render as "69.").
pub fn normalize_price(raw: &str) -> Option<String> {
    let kept: String = raw.chars().filter(|c| c.is_ascii_digit() || matches!(c, '.' | ',')).collect();
    if !kept.bytes().any(|b| b.is_ascii_digit()) {
        return None;
    }
    if let Some((whole, cents)) = kept.rsplit_once(',') {
        if cents.len() == 2 && cents.bytes().all(|b| b.is_ascii_digit()) {
            let whole: String = whole.chars().filter(char::is_ascii_digit).collect();
            let whole = if whole.is_empty() { "0" } else { whole.as_str() };
            return Some(join!(whole, ".", cents));
        }
    }
    let dotted: String = kept.chars().filter(|c| *c != ',').collect();
    let dotted = dotted.trim_end_matches('.');
    if dotted.is_empty() {
        return None;
    }
    Some(s!(dotted))
}
