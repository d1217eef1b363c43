//! Delimited text record format shared by all entities
//!
//! One entity per line, fields joined by `|`. There is no escaping: a `|`
//! inside a free-text field shifts every following field and corrupts the
//! record.

use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::calendar::Date;

/// Field separator
pub const DELIMITER: char = '|';

/// How malformed input is treated while loading
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoadMode {
    /// Malformed records become zero-valued entities, unparseable numeric
    /// fields fall back to their defaults
    #[default]
    Lenient,
    /// Any malformed record or field fails the load
    Strict,
}

/// Why a single record could not be parsed
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    #[error("expected {expected} fields, found {found}")]
    FieldCount { expected: &'static str, found: usize },

    #[error("field '{field}' has invalid value '{value}'")]
    InvalidField { field: &'static str, value: String },
}

impl RecordError {
    pub(crate) fn invalid(field: &'static str, value: &str) -> Self {
        RecordError::InvalidField {
            field,
            value: value.to_string(),
        }
    }
}

/// An entity with a canonical `|`-delimited text form
pub trait Record: Default + Sized {
    /// Entity name used in log messages
    const KIND: &'static str;

    /// Parse one trimmed, non-blank line
    ///
    /// `today` fills date fields that are absent from the record.
    fn parse_record(line: &str, today: Date, mode: LoadMode) -> Result<Self, RecordError>;

    /// Render the full canonical field set in canonical order
    fn to_record(&self) -> String;

    /// Lenient parse: a malformed record yields the zero-valued entity
    fn from_record(line: &str, today: Date) -> Self {
        Self::parse_record(line, today, LoadMode::Lenient).unwrap_or_else(|err| {
            warn!("Malformed {} record '{}': {}; using empty value", Self::KIND, line, err);
            Self::default()
        })
    }
}

pub fn split_fields(line: &str) -> Vec<&str> {
    line.split(DELIMITER).collect()
}

pub fn join_fields(fields: &[String]) -> String {
    let mut out = String::new();
    for (i, field) in fields.iter().enumerate() {
        if i > 0 {
            out.push(DELIMITER);
        }
        out.push_str(field);
    }
    out
}

/// Non-negative integer made only of ASCII digits
///
/// Signs, whitespace and values that overflow `u32` are rejected.
pub fn parse_count(text: &str) -> Option<u32> {
    if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Finite decimal value
pub fn parse_amount(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Shortest text that parses back to the same `f64`
pub fn format_amount(value: f64) -> String {
    format!("{}", value)
}
