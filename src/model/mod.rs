//! Entity records: clients, policies and payments

mod client;
mod payment;
mod policy;
pub mod record;

pub use client::Client;
pub use payment::Payment;
pub use policy::{Policy, POLICY_ID_PREFIX};
pub use record::{LoadMode, Record, RecordError};
