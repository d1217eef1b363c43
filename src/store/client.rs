//! Client repository backed by `clients.txt`

use std::path::Path;

use log::info;

use super::file::RecordFile;
use crate::calendar::SharedClock;
use crate::error::{LedgerError, Result};
use crate::model::record::parse_count;
use crate::model::{Client, LoadMode};

/// First identifier handed out by an empty repository, minus one
const CLIENT_ID_FLOOR: u32 = 1000;

/// Partial client update; an empty field keeps the current value
#[derive(Debug, Clone, Default)]
pub struct ClientPatch {
    pub name: String,
    /// Applied only if made of digits
    pub age: String,
    pub contact: String,
    pub address: String,
}

/// In-memory clients plus the file that backs them
#[derive(Debug)]
pub struct ClientRepository {
    clients: Vec<Client>,
    file: RecordFile,
}

impl ClientRepository {
    /// Load all clients from `path`
    pub fn open<P: AsRef<Path>>(path: P, mode: LoadMode, clock: &SharedClock) -> Result<Self> {
        let file = RecordFile::new(path);
        let clients = file.load(mode, clock.today())?;
        Ok(Self { clients, file })
    }

    /// Rewrite the backing file from the in-memory collection
    ///
    /// Must be called after mutating through [`Self::find_by_id_mut`].
    pub fn save(&self) -> Result<()> {
        self.file.save(&self.clients)
    }

    /// One more than the largest existing id, never below 1001
    ///
    /// Fails once a record holds `u32::MAX`.
    pub fn next_id(&self) -> Result<u32> {
        self.clients
            .iter()
            .map(|c| c.id)
            .fold(CLIENT_ID_FLOOR, u32::max)
            .checked_add(1)
            .ok_or(LedgerError::IdsExhausted("client"))
    }

    /// Create a client with the next id and persist
    ///
    /// If the rewrite fails the client stays in memory and the error is
    /// returned.
    pub fn add(&mut self, name: &str, age: u32, contact: &str, address: &str) -> Result<Client> {
        let client = Client::new(self.next_id()?, name, age, contact, address);
        self.clients.push(client.clone());
        self.save()?;
        info!("Added client {}", client.id);
        Ok(client)
    }

    pub fn find_by_id(&self, id: u32) -> Option<&Client> {
        self.clients.iter().find(|c| c.id == id)
    }

    /// Mutable handle into the live collection; changes are not persisted
    /// until [`Self::save`] is called
    pub fn find_by_id_mut(&mut self, id: u32) -> Option<&mut Client> {
        self.clients.iter_mut().find(|c| c.id == id)
    }

    /// Case-insensitive substring match on the name, in collection order
    pub fn find_by_name(&self, keyword: &str) -> Vec<&Client> {
        let needle = keyword.to_lowercase();
        self.clients
            .iter()
            .filter(|c| c.name.to_lowercase().contains(&needle))
            .collect()
    }

    /// Apply the non-empty fields of `patch` and persist
    ///
    /// An age that is not a plain non-negative integer is ignored; the update
    /// still succeeds.
    pub fn update(&mut self, id: u32, patch: &ClientPatch) -> Result<()> {
        let client = self
            .find_by_id_mut(id)
            .ok_or(LedgerError::ClientNotFound(id))?;

        if !patch.name.is_empty() {
            client.name = patch.name.clone();
        }
        if let Some(age) = parse_count(&patch.age) {
            client.age = age;
        }
        if !patch.contact.is_empty() {
            client.contact = patch.contact.clone();
        }
        if !patch.address.is_empty() {
            client.address = patch.address.clone();
        }
        self.save()
    }

    /// Remove every client with this id
    ///
    /// `has_policies` is the caller's referential guard: when set, nothing is
    /// removed.
    pub fn remove(&mut self, id: u32, has_policies: bool) -> Result<usize> {
        if has_policies {
            return Err(LedgerError::ClientHasPolicies(id));
        }
        let before = self.clients.len();
        self.clients.retain(|c| c.id != id);
        let removed = before - self.clients.len();
        if removed == 0 {
            return Err(LedgerError::ClientNotFound(id));
        }
        self.save()?;
        info!("Removed client {}", id);
        Ok(removed)
    }

    pub fn all(&self) -> &[Client] {
        &self.clients
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
