//! Per-policy billing summary

use serde::{Deserialize, Serialize};

use super::engine::{
    months_paid, next_due_date, remaining_balance, total_paid, BillingError, SETTLED_EPSILON,
};
use crate::calendar::Date;
use crate::model::{Payment, Policy};

/// Everything the status screen shows for one policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PolicyStatement {
    pub policy_id: String,
    pub client_id: u32,
    pub policy_type: String,
    pub monthly_premium: f64,
    pub duration_months: u32,
    pub start_date: String,

    /// Premium over the full term
    pub total_due: f64,
    pub total_paid: f64,
    pub months_paid: u32,

    /// `None` once fully paid or when the start date is unusable
    pub next_due_date: Option<Date>,
    pub remaining_balance: f64,
}

impl PolicyStatement {
    /// Build the statement from a policy and the payment collection
    pub fn compute(policy: &Policy, payments: &[Payment]) -> Self {
        let paid = total_paid(&policy.policy_id, payments);
        Self {
            policy_id: policy.policy_id.clone(),
            client_id: policy.client_id,
            policy_type: policy.policy_type.clone(),
            monthly_premium: policy.monthly_premium,
            duration_months: policy.duration_months,
            start_date: policy.start_date.clone(),
            total_due: policy.total_due(),
            total_paid: paid,
            months_paid: months_paid(policy.monthly_premium, paid),
            next_due_date: next_due_date(policy, payments).ok(),
            remaining_balance: remaining_balance(policy, payments),
        }
    }

    /// Nothing is owed over the term
    ///
    /// Decided by the remaining balance, the same rule the unpaid report
    /// uses. A zero-premium policy is therefore fully paid even though no
    /// installment has been covered and it still has a next due date.
    pub fn is_fully_paid(&self) -> bool {
        self.remaining_balance <= SETTLED_EPSILON
    }

    /// Why there is no next due date, if there is none
    pub fn no_due_reason(&self) -> Option<BillingError> {
        if self.next_due_date.is_some() {
            return None;
        }
        if Date::parse(&self.start_date).is_none() {
            Some(BillingError::InvalidStartDate(self.start_date.clone()))
        } else {
            Some(BillingError::NoFurtherDues)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn policy(start: &str) -> Policy {
        Policy {
            policy_id: "P1001".to_string(),
            policy_type: "Health".to_string(),
            monthly_premium: 100.0,
            duration_months: 12,
            client_id: 1001,
            start_date: start.to_string(),
        }
    }

    #[test]
    fn test_statement_in_progress() {
        let payments = vec![
            Payment::new("P1001", 100.0, Date::from_ymd(2024, 1, 1).unwrap()),
            Payment::new("P1001", 150.0, Date::from_ymd(2024, 2, 1).unwrap()),
        ];
        let statement = PolicyStatement::compute(&policy("2024-01-01"), &payments);

        assert_relative_eq!(statement.total_due, 1200.0);
        assert_relative_eq!(statement.total_paid, 250.0);
        assert_eq!(statement.months_paid, 2);
        assert_eq!(statement.next_due_date, Date::from_ymd(2024, 3, 1));
        assert_relative_eq!(statement.remaining_balance, 950.0);
        assert!(!statement.is_fully_paid());
        assert_eq!(statement.no_due_reason(), None);
    }

    #[test]
    fn test_statement_fully_paid() {
        let payments = vec![Payment::new("P1001", 1200.0, Date::from_ymd(2024, 1, 1).unwrap())];
        let statement = PolicyStatement::compute(&policy("2024-01-01"), &payments);

        assert!(statement.is_fully_paid());
        assert_eq!(statement.next_due_date, None);
        assert_eq!(statement.no_due_reason(), Some(BillingError::NoFurtherDues));
    }

    #[test]
    fn test_zero_premium_is_fully_paid() {
        let mut free = policy("2024-01-01");
        free.monthly_premium = 0.0;
        let statement = PolicyStatement::compute(&free, &[]);

        assert_eq!(statement.months_paid, 0);
        assert_relative_eq!(statement.remaining_balance, 0.0);
        assert!(statement.is_fully_paid());
        assert_eq!(statement.next_due_date, Date::from_ymd(2024, 2, 1));
    }

    #[test]
    fn test_statement_bad_start() {
        let statement = PolicyStatement::compute(&policy("soon"), &[]);
        assert_eq!(statement.next_due_date, None);
        assert_eq!(
            statement.no_due_reason(),
            Some(BillingError::InvalidStartDate("soon".to_string()))
        );
        assert_relative_eq!(statement.remaining_balance, 1200.0);
    }
}
