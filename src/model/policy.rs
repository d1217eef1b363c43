//! Policy records

use serde::{Deserialize, Serialize};

use super::record::{
    format_amount, join_fields, parse_amount, parse_count, split_fields, LoadMode, Record,
    RecordError,
};
use crate::calendar::Date;

/// Prefix of every repository-assigned policy identifier
pub const POLICY_ID_PREFIX: char = 'P';

/// An insurance policy owned by a client
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Policy {
    /// `P<n>`, assigned by the repository
    pub policy_id: String,

    /// Free text (Life, Health, Auto, ...)
    pub policy_type: String,

    pub monthly_premium: f64,

    /// Term length in months
    pub duration_months: u32,

    /// Owning client; not checked against the client repository here
    pub client_id: u32,

    /// Start date as stored; hand-edited files may hold unparseable text
    pub start_date: String,
}

impl Policy {
    pub fn new(
        policy_id: &str,
        policy_type: &str,
        monthly_premium: f64,
        duration_months: u32,
        client_id: u32,
        start_date: Date,
    ) -> Self {
        Self {
            policy_id: policy_id.to_string(),
            policy_type: policy_type.to_string(),
            monthly_premium,
            duration_months,
            client_id,
            start_date: start_date.to_string(),
        }
    }

    /// Parsed start date, if the stored text is a valid date
    pub fn start(&self) -> Option<Date> {
        Date::parse(&self.start_date)
    }

    /// Premium due over the full term
    pub fn total_due(&self) -> f64 {
        self.monthly_premium * self.duration_months as f64
    }

    /// Numeric part of a `P<n>` identifier (either case of prefix)
    pub fn id_number(&self) -> Option<u32> {
        let rest = self
            .policy_id
            .strip_prefix(POLICY_ID_PREFIX)
            .or_else(|| self.policy_id.strip_prefix('p'))?;
        parse_count(rest)
    }
}

impl Record for Policy {
    const KIND: &'static str = "policy";

    /// `policyId|type|premium|duration|clientId[|startDate]`
    ///
    /// Fewer than five fields is malformed and anything after the sixth is
    /// dropped. Blank or unparseable numbers
    /// default to zero unless loading strictly; a missing start date is
    /// filled with `today`.
    fn parse_record(line: &str, today: Date, mode: LoadMode) -> Result<Self, RecordError> {
        let fields = split_fields(line);
        if fields.len() < 5 {
            return Err(RecordError::FieldCount {
                expected: "5 or 6",
                found: fields.len(),
            });
        }

        let strict = mode == LoadMode::Strict;
        let monthly_premium = match parse_amount(fields[2]) {
            Some(v) => v,
            None if strict => return Err(RecordError::invalid("premium", fields[2])),
            None => 0.0,
        };
        let duration_months = match parse_count(fields[3]) {
            Some(v) => v,
            None if strict => return Err(RecordError::invalid("duration", fields[3])),
            None => 0,
        };
        let client_id = match parse_count(fields[4]) {
            Some(v) => v,
            None if strict => return Err(RecordError::invalid("clientId", fields[4])),
            None => 0,
        };
        let start_date = match fields.get(5) {
            Some(text) if strict && Date::parse(text).is_none() => {
                return Err(RecordError::invalid("startDate", text))
            }
            Some(text) => text.to_string(),
            None => today.to_string(),
        };

        Ok(Self {
            policy_id: fields[0].to_string(),
            policy_type: fields[1].to_string(),
            monthly_premium,
            duration_months,
            client_id,
            start_date,
        })
    }

    fn to_record(&self) -> String {
        join_fields(&[
            self.policy_id.clone(),
            self.policy_type.clone(),
            format_amount(self.monthly_premium),
            self.duration_months.to_string(),
            self.client_id.to_string(),
            self.start_date.clone(),
        ])
    }
}
