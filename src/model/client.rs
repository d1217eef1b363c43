//! Client records

use serde::{Deserialize, Serialize};

use super::record::{join_fields, parse_count, split_fields, LoadMode, Record, RecordError};
use crate::calendar::Date;

/// A policyholder
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Client {
    /// Repository-assigned identifier (1001 and up)
    pub id: u32,
    pub name: String,
    pub age: u32,
    /// Phone number or e-mail
    pub contact: String,
    pub address: String,
}

impl Client {
    pub fn new(id: u32, name: &str, age: u32, contact: &str, address: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            age,
            contact: contact.to_string(),
            address: address.to_string(),
        }
    }
}

impl Record for Client {
    const KIND: &'static str = "client";

    /// `id|name|age|contact|address`, exactly five fields
    fn parse_record(line: &str, _today: Date, _mode: LoadMode) -> Result<Self, RecordError> {
        let fields = split_fields(line);
        if fields.len() != 5 {
            return Err(RecordError::FieldCount {
                expected: "5",
                found: fields.len(),
            });
        }
        let id = parse_count(fields[0]).ok_or_else(|| RecordError::invalid("id", fields[0]))?;
        let age = parse_count(fields[2]).ok_or_else(|| RecordError::invalid("age", fields[2]))?;

        Ok(Self {
            id,
            name: fields[1].to_string(),
            age,
            contact: fields[3].to_string(),
            address: fields[4].to_string(),
        })
    }

    fn to_record(&self) -> String {
        join_fields(&[
            self.id.to_string(),
            self.name.clone(),
            self.age.to_string(),
            self.contact.clone(),
            self.address.clone(),
        ])
    }
}
