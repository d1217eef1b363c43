//! Where the ledger keeps its files and how it reads them

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{LedgerError, Result};
use crate::model::LoadMode;

fn default_data_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_clients_file() -> String {
    "clients.txt".to_string()
}

fn default_policies_file() -> String {
    "policies.txt".to_string()
}

fn default_payments_file() -> String {
    "payments.txt".to_string()
}

/// File locations and load behavior for one ledger
///
/// Any key missing from a JSON config file takes its default.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Directory holding the three record files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    #[serde(default = "default_clients_file")]
    pub clients_file: String,

    #[serde(default = "default_policies_file")]
    pub policies_file: String,

    #[serde(default = "default_payments_file")]
    pub payments_file: String,

    /// Lenient keeps loading past malformed records
    #[serde(default)]
    pub load_mode: LoadMode,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            clients_file: default_clients_file(),
            policies_file: default_policies_file(),
            payments_file: default_payments_file(),
            load_mode: LoadMode::default(),
        }
    }
}

impl LedgerConfig {
    /// Default file names inside `data_dir`
    pub fn in_dir<P: AsRef<Path>>(data_dir: P) -> Self {
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            ..Self::default()
        }
    }

    /// Read a JSON config file
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| LedgerError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&text).map_err(|source| LedgerError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn clients_path(&self) -> PathBuf {
        self.data_dir.join(&self.clients_file)
    }

    pub fn policies_path(&self) -> PathBuf {
        self.data_dir.join(&self.policies_file)
    }

    pub fn payments_path(&self) -> PathBuf {
        self.data_dir.join(&self.payments_file)
    }
}
