//! Billing engine: amounts paid, installments covered, due dates and balances

mod engine;
mod statement;

pub use engine::{
    months_paid, next_due_date, policy_end_date, remaining_balance, sort_history, total_paid,
    BillingError, SETTLED_EPSILON,
};
pub use statement::PolicyStatement;
