//! Premium payment records

use serde::{Deserialize, Serialize};

use super::record::{
    format_amount, join_fields, parse_amount, split_fields, LoadMode, Record, RecordError,
};
use crate::calendar::Date;

/// A premium payment applied to a policy
///
/// Payments are never edited once recorded.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Payment {
    pub policy_id: String,
    pub amount: f64,
    /// Payment date as stored
    pub date: String,
}

impl Payment {
    pub fn new(policy_id: &str, amount: f64, date: Date) -> Self {
        Self {
            policy_id: policy_id.to_string(),
            amount,
            date: date.to_string(),
        }
    }

    /// Parsed payment date, if the stored text is a valid date
    pub fn parsed_date(&self) -> Option<Date> {
        Date::parse(&self.date)
    }
}

impl Record for Payment {
    const KIND: &'static str = "payment";

    /// `policyId|amount|date`, exactly three fields
    fn parse_record(line: &str, _today: Date, mode: LoadMode) -> Result<Self, RecordError> {
        let fields = split_fields(line);
        if fields.len() != 3 {
            return Err(RecordError::FieldCount {
                expected: "3",
                found: fields.len(),
            });
        }

        let amount = match parse_amount(fields[1]) {
            Some(v) => v,
            None if mode == LoadMode::Strict => {
                return Err(RecordError::invalid("amount", fields[1]))
            }
            None => 0.0,
        };
        if mode == LoadMode::Strict && Date::parse(fields[2]).is_none() {
            return Err(RecordError::invalid("date", fields[2]));
        }

        Ok(Self {
            policy_id: fields[0].to_string(),
            amount,
            date: fields[2].to_string(),
        })
    }

    fn to_record(&self) -> String {
        join_fields(&[
            self.policy_id.clone(),
            format_amount(self.amount),
            self.date.clone(),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> Date {
        Date::from_ymd(2024, 6, 15).unwrap()
    }

    #[test]
    fn test_payment_round_trip() {
        let payment = Payment::new("P1001", 99.95, Date::from_ymd(2024, 2, 1).unwrap());
        let line = payment.to_record();
        assert_eq!(line, "P1001|99.95|2024-02-01");
        assert_eq!(Payment::from_record(&line, today()), payment);
    }

    #[test]
    fn test_negative_amount_accepted() {
        let payment = Payment::from_record("P1001|-20|2024-02-01", today());
        assert_eq!(payment.amount, -20.0);
    }

    #[test]
    fn test_malformed_payment_is_zero_valued() {
        assert_eq!(Payment::from_record("P1001|100", today()), Payment::default());
        assert_eq!(Payment::from_record("P1001|100|2024-01-01|x", today()), Payment::default());
    }

    #[test]
    fn test_lenient_keeps_bad_date_text() {
        let payment = Payment::from_record("P1001|abc|yesterday", today());
        assert_eq!(payment.amount, 0.0);
        assert_eq!(payment.date, "yesterday");
        assert!(payment.parsed_date().is_none());
    }

    #[test]
    fn test_strict_rejects_bad_date() {
        let err =
            Payment::parse_record("P1001|10|yesterday", today(), LoadMode::Strict).unwrap_err();
        assert_eq!(err, RecordError::invalid("date", "yesterday"));
    }
}
