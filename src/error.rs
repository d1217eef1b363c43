//! Crate-wide error type

use std::path::PathBuf;
use thiserror::Error;

use crate::billing::BillingError;
use crate::model::RecordError;

/// Errors surfaced by the ledger's repositories and queries
#[derive(Debug, Error)]
pub enum LedgerError {
    /// Reading or rewriting a backing file failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A record failed to parse while loading in strict mode.
    #[error("malformed record at {path}:{line}: {source}")]
    MalformedRecord {
        path: PathBuf,
        line: usize,
        #[source]
        source: RecordError,
    },

    /// The JSON config file could not be parsed.
    #[error("invalid config file {path}: {source}")]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("client {0} not found")]
    ClientNotFound(u32),

    #[error("policy {0} not found")]
    PolicyNotFound(String),

    /// Referential guard: a client cannot be removed while policies reference it.
    #[error("client {0} still has policies")]
    ClientHasPolicies(u32),

    /// Referential guard: a policy cannot be removed while payments reference it.
    #[error("policy {0} still has payments")]
    PolicyHasPayments(String),

    /// Amounts and premiums must be finite to survive a write and reload.
    #[error("{field} must be a finite number, got {value}")]
    NonFiniteAmount { field: &'static str, value: f64 },

    /// The largest id in the file leaves no room for another.
    #[error("no {0} ids left above the current maximum")]
    IdsExhausted(&'static str),

    #[error(transparent)]
    Billing(#[from] BillingError),
}

pub type Result<T> = std::result::Result<T, LedgerError>;
