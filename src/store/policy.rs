//! Policy repository backed by `policies.txt`

use std::fmt;
use std::path::Path;

use log::{info, warn};

use super::file::RecordFile;
use crate::calendar::{Date, SharedClock};
use crate::error::{LedgerError, Result};
use crate::model::record::{parse_amount, parse_count};
use crate::model::{LoadMode, Policy, POLICY_ID_PREFIX};

const POLICY_ID_FLOOR: u32 = 1000;

/// Partial policy update; an empty field keeps the current value
#[derive(Debug, Clone, Default)]
pub struct PolicyPatch {
    pub policy_type: String,
    /// Applied only if it parses as a non-negative decimal
    pub premium: String,
    /// Applied only if made of digits
    pub duration_months: String,
    /// Applied only if it is a valid `YYYY-MM-DD` date
    pub start_date: String,
}

/// In-memory policies plus the file that backs them
pub struct PolicyRepository {
    policies: Vec<Policy>,
    file: RecordFile,
    clock: SharedClock,
}

impl fmt::Debug for PolicyRepository {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyRepository")
            .field("policies", &self.policies)
            .field("file", &self.file)
            .finish_non_exhaustive()
    }
}

impl PolicyRepository {
    /// Load all policies from `path`; records without a start date get today
    pub fn open<P: AsRef<Path>>(path: P, mode: LoadMode, clock: SharedClock) -> Result<Self> {
        let file = RecordFile::new(path);
        let policies = file.load(mode, clock.today())?;
        Ok(Self {
            policies,
            file,
            clock,
        })
    }

    pub fn save(&self) -> Result<()> {
        self.file.save(&self.policies)
    }

    /// `P` followed by one more than the largest numeric id, never below P1001
    ///
    /// Ids that are not `P<digits>` do not take part. Fails once a record
    /// holds `P4294967295`.
    pub fn next_policy_id(&self) -> Result<String> {
        let next = self
            .policies
            .iter()
            .filter_map(Policy::id_number)
            .fold(POLICY_ID_FLOOR, u32::max)
            .checked_add(1)
            .ok_or(LedgerError::IdsExhausted("policy"))?;
        Ok(format!("{}{}", POLICY_ID_PREFIX, next))
    }

    /// Create a policy with the next id and persist
    ///
    /// A start date that does not parse is replaced by today. A NaN or
    /// infinite premium is rejected.
    pub fn add(
        &mut self,
        client_id: u32,
        policy_type: &str,
        monthly_premium: f64,
        duration_months: u32,
        start_date: &str,
    ) -> Result<Policy> {
        if !monthly_premium.is_finite() {
            return Err(LedgerError::NonFiniteAmount {
                field: "premium",
                value: monthly_premium,
            });
        }
        let policy_id = self.next_policy_id()?;
        let start = Date::parse(start_date).unwrap_or_else(|| {
            let today = self.clock.today();
            warn!("Start date '{}' is not YYYY-MM-DD, using {}", start_date, today);
            today
        });
        let policy = Policy::new(
            &policy_id,
            policy_type,
            monthly_premium,
            duration_months,
            client_id,
            start,
        );
        self.policies.push(policy.clone());
        self.save()?;
        info!("Added policy {} for client {}", policy.policy_id, client_id);
        Ok(policy)
    }

    pub fn find_by_policy_id(&self, policy_id: &str) -> Option<&Policy> {
        self.policies.iter().find(|p| p.policy_id == policy_id)
    }

    /// Mutable handle into the live collection; call [`Self::save`] afterwards
    pub fn find_by_policy_id_mut(&mut self, policy_id: &str) -> Option<&mut Policy> {
        self.policies.iter_mut().find(|p| p.policy_id == policy_id)
    }

    pub fn find_by_client_id(&self, client_id: u32) -> Vec<&Policy> {
        self.policies
            .iter()
            .filter(|p| p.client_id == client_id)
            .collect()
    }

    pub fn has_policies_for(&self, client_id: u32) -> bool {
        self.policies.iter().any(|p| p.client_id == client_id)
    }

    /// Apply the non-empty, valid fields of `patch` and persist
    pub fn update(&mut self, policy_id: &str, patch: &PolicyPatch) -> Result<()> {
        let policy = self
            .find_by_policy_id_mut(policy_id)
            .ok_or_else(|| LedgerError::PolicyNotFound(policy_id.to_string()))?;

        if !patch.policy_type.is_empty() {
            policy.policy_type = patch.policy_type.clone();
        }
        if let Some(premium) = parse_amount(&patch.premium).filter(|p| *p >= 0.0) {
            policy.monthly_premium = premium;
        }
        if let Some(months) = parse_count(&patch.duration_months) {
            policy.duration_months = months;
        }
        if let Some(start) = Date::parse(&patch.start_date) {
            policy.start_date = start.to_string();
        }
        self.save()
    }

    /// Remove every policy with this id unless `has_payments` is set
    pub fn remove(&mut self, policy_id: &str, has_payments: bool) -> Result<usize> {
        if has_payments {
            return Err(LedgerError::PolicyHasPayments(policy_id.to_string()));
        }
        let before = self.policies.len();
        self.policies.retain(|p| p.policy_id != policy_id);
        let removed = before - self.policies.len();
        if removed == 0 {
            return Err(LedgerError::PolicyNotFound(policy_id.to_string()));
        }
        self.save()?;
        info!("Removed policy {}", policy_id);
        Ok(removed)
    }

    pub fn all(&self) -> &[Policy] {
        &self.policies
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::FixedClock;
    use std::fs;
    use std::rc::Rc;
    use tempfile::{tempdir, TempDir};

    fn clock() -> SharedClock {
        Rc::new(FixedClock(Date::from_ymd(2024, 6, 15).unwrap()))
    }

    fn open(dir: &TempDir) -> PolicyRepository {
        let path = dir.path().join("policies.txt");
        PolicyRepository::open(path, LoadMode::Lenient, clock()).unwrap()
    }

    #[test]
    fn test_policy_ids_are_max_based() {
        let dir = tempdir().unwrap();
        let mut repo = open(&dir);
        assert_eq!(repo.next_policy_id().unwrap(), "P1001");

        assert_eq!(repo.add(1001, "Life", 100.0, 12, "2024-01-01").unwrap().policy_id, "P1001");
        assert_eq!(repo.add(1001, "Auto", 50.0, 6, "2024-01-01").unwrap().policy_id, "P1002");
        repo.remove("P1001", false).unwrap();
        assert_eq!(repo.add(1002, "Home", 75.0, 24, "2024-01-01").unwrap().policy_id, "P1003");
    }

    #[test]
    fn test_next_id_skips_foreign_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policies.txt");
        fs::write(
            &path,
            "X9999|Life|1|1|1001|2024-01-01\np2000|Life|1|1|1001|2024-01-01\n",
        )
        .unwrap();

        let repo = PolicyRepository::open(&path, LoadMode::Lenient, clock()).unwrap();
        assert_eq!(repo.next_policy_id().unwrap(), "P2001");
    }

    #[test]
    fn test_invalid_start_falls_back_to_today() {
        let dir = tempdir().unwrap();
        let mut repo = open(&dir);
        let policy = repo.add(1001, "Life", 100.0, 12, "next tuesday").unwrap();
        assert_eq!(policy.start_date, "2024-06-15");
    }

    #[test]
    fn test_find_by_client() {
        let dir = tempdir().unwrap();
        let mut repo = open(&dir);
        repo.add(1001, "Life", 100.0, 12, "2024-01-01").unwrap();
        repo.add(1002, "Auto", 50.0, 6, "2024-01-01").unwrap();
        repo.add(1001, "Home", 75.0, 24, "2024-01-01").unwrap();

        let ids: Vec<&str> = repo
            .find_by_client_id(1001)
            .iter()
            .map(|p| p.policy_id.as_str())
            .collect();
        assert_eq!(ids, vec!["P1001", "P1003"]);
        assert!(repo.has_policies_for(1002));
        assert!(!repo.has_policies_for(1003));
    }

    #[test]
    fn test_partial_update() {
        let dir = tempdir().unwrap();
        let mut repo = open(&dir);
        repo.add(1001, "Life", 100.0, 12, "2024-01-01").unwrap();

        let patch = PolicyPatch {
            premium: "-5".to_string(),
            duration_months: "18".to_string(),
            start_date: "2024-02-30".to_string(),
            ..Default::default()
        };
        repo.update("P1001", &patch).unwrap();

        let policy = repo.find_by_policy_id("P1001").unwrap();
        assert_eq!(policy.policy_type, "Life");
        assert_eq!(policy.monthly_premium, 100.0);
        assert_eq!(policy.duration_months, 18);
        assert_eq!(policy.start_date, "2024-01-01");

        let patch = PolicyPatch {
            policy_type: "Term Life".to_string(),
            premium: "120.5".to_string(),
            start_date: "2024-03-01".to_string(),
            ..Default::default()
        };
        repo.update("P1001", &patch).unwrap();
        let reloaded = open(&dir);
        let policy = reloaded.find_by_policy_id("P1001").unwrap();
        assert_eq!(policy.policy_type, "Term Life");
        assert_eq!(policy.monthly_premium, 120.5);
        assert_eq!(policy.duration_months, 18);
        assert_eq!(policy.start_date, "2024-03-01");
    }

    #[test]
    fn test_remove_guard() {
        let dir = tempdir().unwrap();
        let mut repo = open(&dir);
        repo.add(1001, "Life", 100.0, 12, "2024-01-01").unwrap();

        assert!(matches!(repo.remove("P1001", true), Err(LedgerError::PolicyHasPayments(_))));
        assert!(matches!(repo.remove("P9999", false), Err(LedgerError::PolicyNotFound(_))));
        assert_eq!(repo.remove("P1001", false).unwrap(), 1);
        assert!(repo.is_empty());
    }

    #[test]
    fn test_add_rejects_non_finite_premium() {
        let dir = tempdir().unwrap();
        let mut repo = open(&dir);

        for premium in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
            let err = repo.add(1001, "Life", premium, 12, "2024-01-01").unwrap_err();
            assert!(matches!(err, LedgerError::NonFiniteAmount { field: "premium", .. }));
        }
        assert!(repo.is_empty());
        assert!(!dir.path().join("policies.txt").exists());
    }

    #[test]
    fn test_add_fails_when_ids_run_out() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("policies.txt");
        fs::write(&path, "P4294967295|Life|1|1|1001|2024-01-01\n").unwrap();

        let mut repo = PolicyRepository::open(&path, LoadMode::Lenient, clock()).unwrap();
        assert!(matches!(repo.next_policy_id(), Err(LedgerError::IdsExhausted(_))));
        let err = repo.add(1001, "Auto", 50.0, 6, "2024-01-01").unwrap_err();
        assert!(matches!(err, LedgerError::IdsExhausted(_)));
        assert_eq!(repo.len(), 1);
    }

    #[test]
    fn test_debug_lists_records() {
        let dir = tempdir().unwrap();
        let mut repo = open(&dir);
        repo.add(1001, "Life", 100.0, 12, "2024-01-01").unwrap();

        let text = format!("{:?}", repo);
        assert!(text.starts_with("PolicyRepository {"));
        assert!(text.contains("P1001"));
    }
}
