//! Repositories: in-memory collections backed one-to-one by flat files

mod client;
mod file;
mod payment;
mod policy;

pub use client::{ClientPatch, ClientRepository};
pub use file::RecordFile;
pub use payment::PaymentRepository;
pub use policy::{PolicyPatch, PolicyRepository};
