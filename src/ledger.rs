//! The three repositories behind one handle, with the referential rules
//! between them
//!
//! Clients own policies and policies own payments, by identifier only. A
//! parent cannot be removed while children reference it and nothing is ever
//! deleted in cascade.

use log::info;
use serde::Serialize;

use crate::billing::{self, PolicyStatement};
use crate::calendar::{Date, SharedClock};
use crate::config::LedgerConfig;
use crate::error::{LedgerError, Result};
use crate::model::{Client, Payment, Policy};
use crate::store::{
    ClientPatch, ClientRepository, PaymentRepository, PolicyPatch, PolicyRepository,
};

/// Name shown for a policy whose client no longer exists
pub const UNKNOWN_CLIENT: &str = "[Unknown]";

/// Status of one policy together with its owner's name
#[derive(Debug, Clone, Serialize)]
pub struct PolicyStatus {
    pub client_name: String,
    #[serde(flatten)]
    pub statement: PolicyStatement,
}

pub struct Ledger {
    clients: ClientRepository,
    policies: PolicyRepository,
    payments: PaymentRepository,
    clock: SharedClock,
}

impl Ledger {
    /// Load all three record files
    pub fn open(config: &LedgerConfig, clock: SharedClock) -> Result<Self> {
        let mode = config.load_mode;
        let clients = ClientRepository::open(config.clients_path(), mode, &clock)?;
        let policies = PolicyRepository::open(config.policies_path(), mode, clock.clone())?;
        let payments = PaymentRepository::open(config.payments_path(), mode, clock.clone())?;
        info!(
            "Opened ledger in {}: {} clients, {} policies, {} payments",
            config.data_dir.display(),
            clients.len(),
            policies.len(),
            payments.len()
        );
        Ok(Self {
            clients,
            policies,
            payments,
            clock,
        })
    }

    pub fn today(&self) -> Date {
        self.clock.today()
    }

    pub fn clients(&self) -> &ClientRepository {
        &self.clients
    }

    /// For update-through-handle flows; call `save` on the repository after
    pub fn clients_mut(&mut self) -> &mut ClientRepository {
        &mut self.clients
    }

    pub fn policies(&self) -> &PolicyRepository {
        &self.policies
    }

    pub fn policies_mut(&mut self) -> &mut PolicyRepository {
        &mut self.policies
    }

    pub fn payments(&self) -> &PaymentRepository {
        &self.payments
    }

    // Clients

    pub fn add_client(
        &mut self,
        name: &str,
        age: u32,
        contact: &str,
        address: &str,
    ) -> Result<Client> {
        self.clients.add(name, age, contact, address)
    }

    pub fn client(&self, id: u32) -> Option<&Client> {
        self.clients.find_by_id(id)
    }

    pub fn find_clients_by_name(&self, keyword: &str) -> Vec<&Client> {
        self.clients.find_by_name(keyword)
    }

    pub fn update_client(&mut self, id: u32, patch: &ClientPatch) -> Result<()> {
        self.clients.update(id, patch)
    }

    /// Fails while any policy references the client
    pub fn remove_client(&mut self, id: u32) -> Result<usize> {
        let has_policies = self.policies.has_policies_for(id);
        self.clients.remove(id, has_policies)
    }

    /// Owner's name, or `[Unknown]` if the client is gone
    pub fn client_name(&self, client_id: u32) -> &str {
        self.clients
            .find_by_id(client_id)
            .map(|c| c.name.as_str())
            .unwrap_or(UNKNOWN_CLIENT)
    }

    // Policies

    /// Create a policy for an existing client
    pub fn add_policy(
        &mut self,
        client_id: u32,
        policy_type: &str,
        monthly_premium: f64,
        duration_months: u32,
        start_date: &str,
    ) -> Result<Policy> {
        if self.clients.find_by_id(client_id).is_none() {
            return Err(LedgerError::ClientNotFound(client_id));
        }
        self.policies
            .add(client_id, policy_type, monthly_premium, duration_months, start_date)
    }

    pub fn policy(&self, policy_id: &str) -> Option<&Policy> {
        self.policies.find_by_policy_id(policy_id)
    }

    pub fn policies_for_client(&self, client_id: u32) -> Vec<&Policy> {
        self.policies.find_by_client_id(client_id)
    }

    pub fn update_policy(&mut self, policy_id: &str, patch: &PolicyPatch) -> Result<()> {
        self.policies.update(policy_id, patch)
    }

    /// Fails while any payment references the policy
    pub fn remove_policy(&mut self, policy_id: &str) -> Result<usize> {
        let has_payments = self.payments.has_payments(policy_id);
        self.policies.remove(policy_id, has_payments)
    }

    // Payments

    /// Record a payment against an existing policy
    pub fn record_payment(&mut self, policy_id: &str, amount: f64, date: &str) -> Result<Payment> {
        if self.policies.find_by_policy_id(policy_id).is_none() {
            return Err(LedgerError::PolicyNotFound(policy_id.to_string()));
        }
        self.payments.record(policy_id, amount, date)
    }

    /// Payments of a policy, oldest first
    pub fn payment_history(&self, policy_id: &str) -> Vec<Payment> {
        self.payments.find_by_policy_id(policy_id)
    }

    // Billing

    pub fn total_paid(&self, policy_id: &str) -> f64 {
        self.payments.total_paid(policy_id)
    }

    pub fn months_paid(&self, policy_id: &str) -> Result<u32> {
        let policy = self.require_policy(policy_id)?;
        Ok(billing::months_paid(policy.monthly_premium, self.total_paid(policy_id)))
    }

    pub fn next_due_date(&self, policy_id: &str) -> Result<Date> {
        let policy = self.require_policy(policy_id)?;
        Ok(billing::next_due_date(policy, self.payments.all())?)
    }

    pub fn remaining_balance(&self, policy_id: &str) -> Result<f64> {
        let policy = self.require_policy(policy_id)?;
        Ok(billing::remaining_balance(policy, self.payments.all()))
    }

    pub fn policy_end_date(&self, policy_id: &str) -> Result<Date> {
        let policy = self.require_policy(policy_id)?;
        billing::policy_end_date(policy).map_err(LedgerError::from)
    }

    pub fn statement(&self, policy_id: &str) -> Result<PolicyStatus> {
        let policy = self.require_policy(policy_id)?;
        Ok(PolicyStatus {
            client_name: self.client_name(policy.client_id).to_string(),
            statement: PolicyStatement::compute(policy, self.payments.all()),
        })
    }

    fn require_policy(&self, policy_id: &str) -> Result<&Policy> {
        self.policies
            .find_by_policy_id(policy_id)
            .ok_or_else(|| LedgerError::PolicyNotFound(policy_id.to_string()))
    }
}
