//! Balance, installment and due-date calculations
//!
//! All functions are pure: they read a policy and a payment list and never
//! touch the repositories.

use std::cmp::Ordering;

use thiserror::Error;

use crate::calendar::Date;
use crate::model::{Payment, Policy};

/// Why a date could not be derived for a policy
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BillingError {
    /// Months paid already cover the full term
    #[error("no further dues")]
    NoFurtherDues,

    #[error("invalid start date '{0}'")]
    InvalidStartDate(String),
}

/// Balances at or below this count as settled
pub const SETTLED_EPSILON: f64 = 1e-9;

/// Sum of the amounts of every payment made against `policy_id`
pub fn total_paid(policy_id: &str, payments: &[Payment]) -> f64 {
    payments
        .iter()
        .filter(|p| p.policy_id == policy_id)
        .map(|p| p.amount)
        .sum()
}

/// Whole installments covered by `total_paid`
///
/// Gross amount divided by premium, rounded down. Payment order and dates
/// play no part; a non-positive premium counts as zero months.
pub fn months_paid(monthly_premium: f64, total_paid: f64) -> u32 {
    if monthly_premium <= 0.0 {
        return 0;
    }
    (total_paid / monthly_premium).floor().max(0.0) as u32
}

fn start_date(policy: &Policy) -> Result<Date, BillingError> {
    policy
        .start()
        .ok_or_else(|| BillingError::InvalidStartDate(policy.start_date.clone()))
}

fn months(n: u32) -> i32 {
    i32::try_from(n).unwrap_or(i32::MAX)
}

/// Date of the first unpaid installment: start + (months paid + 1) months
pub fn next_due_date(policy: &Policy, payments: &[Payment]) -> Result<Date, BillingError> {
    let start = start_date(policy)?;
    let paid = months_paid(policy.monthly_premium, total_paid(&policy.policy_id, payments));
    if paid >= policy.duration_months {
        return Err(BillingError::NoFurtherDues);
    }
    Ok(start.add_months(months(paid).saturating_add(1)))
}

/// Premium still owed over the full term, never negative
pub fn remaining_balance(policy: &Policy, payments: &[Payment]) -> f64 {
    (policy.total_due() - total_paid(&policy.policy_id, payments)).max(0.0)
}

/// Start date plus the term
pub fn policy_end_date(policy: &Policy) -> Result<Date, BillingError> {
    Ok(start_date(policy)?.add_months(months(policy.duration_months)))
}

/// Order payments oldest first
///
/// Payments whose date does not parse go after every dated payment, ordered
/// among themselves by raw text. Equal keys keep their collection order.
pub fn sort_history(payments: &mut [Payment]) {
    payments.sort_by(|a, b| match (a.parsed_date(), b.parsed_date()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.date.cmp(&b.date),
    });
}
