//! Payment repository backed by `payments.txt`

use std::fmt;
use std::path::Path;

use log::{info, warn};

use super::file::RecordFile;
use crate::billing::{sort_history, total_paid};
use crate::calendar::{Date, SharedClock};
use crate::error::{LedgerError, Result};
use crate::model::{LoadMode, Payment};

/// In-memory payments plus the file that backs them
///
/// Payments are append-only apart from the bulk removal of a policy's
/// payments.
pub struct PaymentRepository {
    payments: Vec<Payment>,
    file: RecordFile,
    clock: SharedClock,
}

impl fmt::Debug for PaymentRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaymentRepository")
            .field("payments", &self.payments)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl PaymentRepository {
    pub fn open<P: AsRef<Path>>(path: P, mode: LoadMode, clock: SharedClock) -> Result<Self> {
        let file = RecordFile::new(path);
        let payments = file.load(mode, clock.today())?;
        Ok(Self {
            payments,
            file,
            clock,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.file.save(&self.payments)
    }

    /// Record a payment and persist
    ///
    /// A missing or unparseable date is replaced by today. A NaN or infinite
    /// amount is rejected. The policy id is not checked here.
    pub fn record(&mut self, policy_id: &str, amount: f64, date: &str) -> Result<Payment> {
        if !amount.is_finite() {
            return Err(LedgerError::NonFiniteAmount {
                field: "amount",
                value: amount,
            });
        }
        let date = Date::parse(date).unwrap_or_else(|| {
            let today = self.clock.today();
            if !date.is_empty() {
                warn!("Payment date '{}' is not YYYY-MM-DD, using {}", date, today);
            }
            today
        });
        let payment = Payment::new(policy_id, amount, date);
        self.payments.push(payment.clone());
        self.save()?;
        info!("Recorded payment of {} on {}", amount, policy_id);
        Ok(payment)
    }

    /// Payment history of one policy, oldest first
    pub fn find_by_policy_id(&self, policy_id: &str) -> Vec<Payment> {
        let mut history: Vec<Payment> = self
            .payments
            .iter()
            .filter(|p| p.policy_id == policy_id)
            .cloned()
            .collect();
        sort_history(&mut history);
        history
    }

    pub fn total_paid(&self, policy_id: &str) -> f64 {
        total_paid(policy_id, &self.payments)
    }

    pub fn has_payments(&self, policy_id: &str) -> bool {
        self.payments.iter().any(|p| p.policy_id == policy_id)
    }

    /// Drop all payments of a policy; the file is only rewritten if
    /// something was removed
    pub fn remove_for_policy(&mut self, policy_id: &str) -> Result<usize> {
        let before = self.payments.len();
        self.payments.retain(|p| p.policy_id != policy_id);
        let removed = before - self.payments.len();
        if removed > 0 {
            self.save()?;
            info!("Removed {} payments of {}", removed, policy_id);
        }
        Ok(removed)
    }

    pub fn all(&self) -> &[Payment] {
        &self.payments
    }

    pub fn len(&self) -> usize {
        self.payments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payments.is_empty()
    }
}
