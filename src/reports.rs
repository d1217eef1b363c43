//! Ledger-wide reports
//!
//! Each report kind produces structured rows; turning them into console
//! tables is left to the caller. Rows can also be exported as CSV.

use std::io::Write;

use serde::Serialize;

use crate::billing::{policy_end_date, remaining_balance, SETTLED_EPSILON};
use crate::calendar::Date;
use crate::ledger::Ledger;
use crate::model::{Client, Policy};

/// Which report to run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    AllClients,
    AllPolicies,
    /// Policies whose term ends between today and today + `months`
    ExpiringWithin { months: i32 },
    /// Policies with premium still owed
    UnpaidPremiums,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExpiringRow {
    pub policy_id: String,
    pub client_id: u32,
    pub client_name: String,
    pub end_date: Date,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnpaidRow {
    pub client_id: u32,
    pub client_name: String,
    pub policy_id: String,
    pub remaining: f64,
}

/// Output of a report run
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "report", rename_all = "snake_case")]
pub enum Report {
    Clients { rows: Vec<Client> },
    Policies { rows: Vec<Policy> },
    Expiring { window_end: Date, rows: Vec<ExpiringRow> },
    Unpaid { rows: Vec<UnpaidRow> },
}

impl ReportKind {
    /// Run the report against the ledger's current state
    pub fn generate(&self, ledger: &Ledger) -> Report {
        match *self {
            ReportKind::AllClients => Report::Clients {
                rows: ledger.clients().all().to_vec(),
            },
            ReportKind::AllPolicies => Report::Policies {
                rows: ledger.policies().all().to_vec(),
            },
            ReportKind::ExpiringWithin { months } => expiring(ledger, ledger.today(), months),
            ReportKind::UnpaidPremiums => unpaid(ledger),
        }
    }
}

fn expiring(ledger: &Ledger, today: Date, months: i32) -> Report {
    let window_end = today.add_months(months);
    let rows = ledger
        .policies()
        .all()
        .iter()
        .filter_map(|policy| {
            // Unparseable start dates have no end date and are left out
            let end_date = policy_end_date(policy).ok()?;
            (today <= end_date && end_date <= window_end).then(|| ExpiringRow {
                policy_id: policy.policy_id.clone(),
                client_id: policy.client_id,
                client_name: ledger.client_name(policy.client_id).to_string(),
                end_date,
            })
        })
        .collect();
    Report::Expiring { window_end, rows }
}

fn unpaid(ledger: &Ledger) -> Report {
    let payments = ledger.payments().all();
    let rows = ledger
        .policies()
        .all()
        .iter()
        .filter_map(|policy| {
            let remaining = remaining_balance(policy, payments);
            (remaining > SETTLED_EPSILON).then(|| UnpaidRow {
                client_id: policy.client_id,
                client_name: ledger.client_name(policy.client_id).to_string(),
                policy_id: policy.policy_id.clone(),
                remaining,
            })
        })
        .collect();
    Report::Unpaid { rows }
}

impl Report {
    pub fn len(&self) -> usize {
        match self {
            Report::Clients { rows } => rows.len(),
            Report::Policies { rows } => rows.len(),
            Report::Expiring { rows, .. } => rows.len(),
            Report::Unpaid { rows } => rows.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Write the rows as CSV with a header line, even when there are no rows
    pub fn write_csv<W: Write>(&self, writer: W) -> csv::Result<()> {
        let mut csv_writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(writer);
        match self {
            Report::Clients { rows } => {
                csv_writer.write_record(["id", "name", "age", "contact", "address"])?;
                for row in rows {
                    csv_writer.serialize(row)?;
                }
            }
            Report::Policies { rows } => {
                csv_writer.write_record([
                    "policy_id",
                    "policy_type",
                    "monthly_premium",
                    "duration_months",
                    "client_id",
                    "start_date",
                ])?;
                for row in rows {
                    csv_writer.serialize(row)?;
                }
            }
            Report::Expiring { rows, .. } => {
                csv_writer.write_record(["policy_id", "client_id", "client_name", "end_date"])?;
                for row in rows {
                    csv_writer.serialize(row)?;
                }
            }
            Report::Unpaid { rows } => {
                csv_writer.write_record(["client_id", "client_name", "policy_id", "remaining"])?;
                for row in rows {
                    csv_writer.serialize(row)?;
                }
            }
        }
        csv_writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::{FixedClock, SharedClock};
    use crate::config::LedgerConfig;
    use crate::ledger::UNKNOWN_CLIENT;
    use approx::assert_relative_eq;
    use std::fs;
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};

    fn open(dir: &TempDir) -> Ledger {
        let clock: SharedClock = Rc::new(FixedClock(Date::from_ymd(2024, 6, 15).unwrap()));
        Ledger::open(&LedgerConfig::in_dir(dir.path()), clock).unwrap()
    }

    fn seeded(dir: &TempDir) -> Ledger {
        fs::write(
            dir.path().join("clients.txt"),
            "1001|Ada|36|555|Here\n1002|Alan|41|556|There\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("policies.txt"),
            concat!(
                "P1001|Life|100|12|1001|2023-06-15\n", // ends today
                "P1002|Auto|50|6|1002|2024-03-01\n",   // ends 2024-09-01
                "P1003|Home|10|12|1001|2024-01-01\n",  // ends 2025-01-01
                "P1004|Boat|20|6|4242|2024-06-01\n",   // ends 2024-12-01, no client
                "P1005|Pet|5|12|1002|whenever\n",
            ),
        )
        .unwrap();
        fs::write(
            dir.path().join("payments.txt"),
            "P1001|1200|2024-01-01\nP1002|100|2024-03-01\n",
        )
        .unwrap();
        open(dir)
    }

    #[test]
    fn test_expiring_window_is_inclusive() {
        let dir = tempdir().unwrap();
        let ledger = seeded(&dir);

        let report = ReportKind::ExpiringWithin { months: 6 }.generate(&ledger);
        let Report::Expiring { window_end, rows } = report else {
            panic!("wrong report kind");
        };
        assert_eq!(window_end, Date::from_ymd(2024, 12, 15).unwrap());

        let ids: Vec<&str> = rows.iter().map(|r| r.policy_id.as_str()).collect();
        assert_eq!(ids, vec!["P1001", "P1002", "P1004"]);
        assert_eq!(rows[2].client_name, UNKNOWN_CLIENT);
        assert_eq!(rows[0].client_name, "Ada");
    }

    #[test]
    fn test_unpaid_skips_settled_policies() {
        let dir = tempdir().unwrap();
        let ledger = seeded(&dir);

        let Report::Unpaid { rows } = ReportKind::UnpaidPremiums.generate(&ledger) else {
            panic!("wrong report kind");
        };
        let ids: Vec<&str> = rows.iter().map(|r| r.policy_id.as_str()).collect();
        assert_eq!(ids, vec!["P1002", "P1003", "P1004", "P1005"]);
        assert_relative_eq!(rows[0].remaining, 200.0);
        assert_eq!(rows[2].client_name, UNKNOWN_CLIENT);
    }

    #[test]
    fn test_empty_report_still_has_header() {
        let dir = tempdir().unwrap();
        let mut out = Vec::new();
        ReportKind::AllClients.generate(&open(&dir)).write_csv(&mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "id,name,age,contact,address\n");
    }

    #[test]
    fn test_listing_reports() {
        let dir = tempdir().unwrap();
        let ledger = seeded(&dir);
        assert_eq!(ReportKind::AllClients.generate(&ledger).len(), 2);
        assert_eq!(ReportKind::AllPolicies.generate(&ledger).len(), 5);

        let empty_dir = tempdir().unwrap();
        assert!(ReportKind::AllClients.generate(&open(&empty_dir)).is_empty());
    }

    #[test]
    fn test_csv_export() {
        let dir = tempdir().unwrap();
        let ledger = seeded(&dir);

        let mut out = Vec::new();
        ReportKind::UnpaidPremiums.generate(&ledger).write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();
        assert_eq!(lines.next(), Some("client_id,client_name,policy_id,remaining"));
        let first: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(&first[..3], &["1002", "Alan", "P1002"]);
        assert_relative_eq!(first[3].parse::<f64>().unwrap(), 200.0);
        assert_eq!(lines.count(), 3);

        let mut out = Vec::new();
        ReportKind::ExpiringWithin { months: 3 }.generate(&ledger).write_csv(&mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(
            text,
            concat!(
                "policy_id,client_id,client_name,end_date\n",
                "P1001,1001,Ada,2024-06-15\n",
                "P1002,1002,Alan,2024-09-01\n",
            )
        );
    }
}
