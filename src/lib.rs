//! Policy Ledger - clients, insurance policies and premium payments
//!
//! This library provides:
//! - Strict `YYYY-MM-DD` calendar arithmetic with month-end clamping
//! - Client, policy and payment records in a `|`-delimited flat file format
//! - Repositories that load once and rewrite their file on every change
//! - Billing queries: amount paid, months covered, next due date, balance
//! - Referential guards between clients, policies and payments
//! - Expiry and unpaid-premium reports
//!
//! The backing files are not locked. Run a single process per data directory.

pub mod billing;
pub mod calendar;
pub mod config;
pub mod error;
pub mod ledger;
pub mod model;
pub mod reports;
pub mod store;

// Re-export commonly used types
pub use billing::{BillingError, PolicyStatement};
pub use calendar::{Clock, Date, FixedClock, SharedClock, SystemClock};
pub use config::LedgerConfig;
pub use error::{LedgerError, Result};
pub use ledger::{Ledger, PolicyStatus};
pub use model::{Client, LoadMode, Payment, Policy};
pub use reports::{Report, ReportKind};
pub use store::{ClientPatch, PolicyPatch};
