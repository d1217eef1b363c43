//! Flat file backing a repository
//!
//! The whole file is read once at startup and rewritten on every mutation.
//! There is no locking and no partial-write recovery: two processes sharing
//! a file, or a crash in the middle of a rewrite, can corrupt it.

use std::fs::{self, File};
use std::io::{BufRead, BufReader, BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};

use crate::calendar::Date;
use crate::error::{LedgerError, Result};
use crate::model::{LoadMode, Record};

/// Path of one entity type's record file
#[derive(Debug, Clone)]
pub struct RecordFile {
    path: PathBuf,
}

impl RecordFile {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load every record in file order
    ///
    /// A missing file is an empty collection. Lines are trimmed and blank
    /// lines skipped; duplicates are kept as-is.
    pub fn load<T: Record>(&self, mode: LoadMode, today: Date) -> Result<Vec<T>> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                info!("No {} file at {}, starting empty", T::KIND, self.path.display());
                return Ok(Vec::new());
            }
            Err(err) => return Err(self.io_error(err)),
        };

        let mut records = Vec::new();
        for (index, line) in BufReader::new(file).lines().enumerate() {
            let line = line.map_err(|err| self.io_error(err))?;
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let record = match mode {
                LoadMode::Lenient => T::from_record(line, today),
                LoadMode::Strict => T::parse_record(line, today, mode).map_err(|source| {
                    LedgerError::MalformedRecord {
                        path: self.path.clone(),
                        line: index + 1,
                        source,
                    }
                })?,
            };
            records.push(record);
        }

        info!("Loaded {} {} records from {}", records.len(), T::KIND, self.path.display());
        Ok(records)
    }

    /// Rewrite the whole file, one record per line
    pub fn save<T: Record>(&self, records: &[T]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|err| self.io_error(err))?;
        }
        let file = File::create(&self.path).map_err(|err| self.io_error(err))?;
        let mut writer = BufWriter::new(file);
        for record in records {
            writeln!(writer, "{}", record.to_record()).map_err(|err| self.io_error(err))?;
        }
        writer.flush().map_err(|err| self.io_error(err))?;

        debug!("Rewrote {} with {} {} records", self.path.display(), records.len(), T::KIND);
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> LedgerError {
        LedgerError::Io {
            path: self.path.clone(),
            source,
        }
    }
}
