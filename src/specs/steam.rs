// src/specs/steam.rs
//! SteamSpy owner estimate.
//!
//! The `owners` field comes back as a number, a number string, or a
//! `"low .. high"` band. It always yields a point value; when that value had
//! to be derived the source text is kept alongside it.

use serde_json::Value;
use tracing::{info, warn};

use crate::core::numeric::{Numeric, normalize_json};
use crate::error::ExtractError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricReading {
    pub value: u64,
    pub numeric: Numeric,
    /// Field text as received (`"<missing>"` when absent).
    pub raw: String,
}

impl MetricReading {
    /// Value differs from what the source literally said.
    pub fn is_substituted(&self) -> bool {
        !matches!(self.numeric, Numeric::Integer(_))
    }

    /// Zero stored because nothing usable was observed.
    pub fn is_anomaly(&self) -> bool {
        matches!(self.numeric, Numeric::Unparseable(_))
    }

    /// Raw text worth persisting next to the value.
    pub fn raw_note(&self) -> Option<String> {
        if self.is_substituted() { Some(self.raw.clone()) } else { None }
    }
}

pub fn extract_owners(body: &str) -> Result<MetricReading, ExtractError> {
    let doc: Value = serde_json::from_str(body)
        .map_err(|e| ExtractError::Parse(format!("steamspy body is not JSON: {e}")))?;
    if !doc.is_object() {
        return Err(ExtractError::Parse(s!("steamspy body is not an object")));
    }

    let Some(field) = doc.get("owners") else {
        warn!("steamspy: owners field missing, storing 0");
        return Ok(MetricReading {
            value: 0,
            numeric: Numeric::Unparseable(s!("<missing>")),
            raw: s!("<missing>"),
        });
    };

    let raw = match field {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    let numeric = normalize_json(field);
    let value = match &numeric {
        Numeric::Integer(v) => *v,
        Numeric::Range { .. } => {
            let mid = numeric.value().unwrap_or(0);
            info!(raw = %raw, value = mid, "steamspy: owners range, using midpoint");
            mid
        }
        Numeric::Unparseable(_) => {
            warn!(raw = %raw, "steamspy: owners value unparseable, storing 0");
            0
        }
    };

    Ok(MetricReading { value, numeric, raw })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_number() {
        let r = extract_owners(r#"{"appid": 3321460, "owners": 15000}"#).unwrap();
        assert_eq!(r.value, 15000);
        assert!(!r.is_substituted());
        assert_eq!(r.raw_note(), None);
    }

    #[test]
    fn separated_string() {
        let r = extract_owners(r#"{"owners": "12,345"}"#).unwrap();
        assert_eq!(r.value, 12345);
        assert_eq!(r.numeric, Numeric::Integer(12345));
    }

    #[test]
    fn range_uses_midpoint_and_keeps_raw() {
        let r = extract_owners(r#"{"owners": "0 .. 20,000"}"#).unwrap();
        assert_eq!(r.value, 10000);
        assert!(r.is_substituted());
        assert!(!r.is_anomaly());
        assert_eq!(r.raw_note().as_deref(), Some("0 .. 20,000"));
    }

    #[test]
    fn unusable_owners_store_zero_with_anomaly() {
        let r = extract_owners(r#"{"owners": "unknown"}"#).unwrap();
        assert_eq!(r.value, 0);
        assert!(r.is_anomaly());
        assert_eq!(r.raw, "unknown");

        let r = extract_owners(r#"{"name": "x"}"#).unwrap();
        assert_eq!(r.value, 0);
        assert_eq!(r.raw_note().as_deref(), Some("<missing>"));
    }

    #[test]
    fn non_json_is_a_parse_error() {
        let err = extract_owners("<html>rate limited</html>").unwrap_err();
        assert_eq!(err.kind(), "parse");
        assert_eq!(extract_owners("[1,2]").unwrap_err().kind(), "parse");
    }
}
