// src/error.rs
//! Error taxonomy.
//!
//! Everything under [`ExtractError`] is recovered per target: it is rendered
//! into the record's `error` column as `"<classification>: <detail>"` and the
//! cycle moves on. [`StoreError`] and [`ConfigError`] abort the run.

use std::path::PathBuf;

use thiserror::Error;

/// Fetch failed or returned something that is not page content.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("HTTP {0}")]
    Status(u16),

    #[error("timed out: {0}")]
    Timeout(String),

    #[error("{0}")]
    Network(String),

    /// 200 OK, but the body is a bot-check page.
    #[error("blocked: {0}")]
    Blocked(String),
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ExtractError {
    #[error("transport: {0}")]
    Transport(#[from] TransportError),

    #[error("parse: {0}")]
    Parse(String),

    /// Subject absent among the scanned candidates (not a parse failure).
    #[error("not in top {scanned}")]
    NotFound { scanned: usize },

    #[error("value: {0}")]
    Value(String),

    #[error("skipped: {0}")]
    Skipped(String),
}

impl ExtractError {
    /// Short classification used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::Transport(_) => "transport",
            ExtractError::Parse(_) => "parse",
            ExtractError::NotFound { .. } => "not_found",
            ExtractError::Value(_) => "value",
            ExtractError::Skipped(_) => "skipped",
        }
    }
}

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("snapshot json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("metric table: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("{path} line {line}: {reason}")]
    Malformed {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io { path: path.into(), source }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("reading {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parsing {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("duplicate store key '{0}'")]
    DuplicateKey(String),

    #[error("target '{key}': {reason}")]
    Invalid { key: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_strings_carry_classification() {
        let e = ExtractError::from(TransportError::Status(503));
        assert_eq!(e.to_string(), "transport: HTTP 503");
        assert_eq!(ExtractError::Parse(s!("no items")).to_string(), "parse: no items");
        assert_eq!(ExtractError::NotFound { scanned: 100 }.to_string(), "not in top 100");
        assert_eq!(e.kind(), "transport");
    }
}
