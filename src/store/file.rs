//! JSON file store.
//!
//! Layout inside the data directory:
//!
//! - `locks.json`: every lock record, rewritten atomically on each change
//! - `events.ndjson`: append-only audit log

use super::LockStore;
use super::record::LockRecord;
use crate::error::{LatchError, Result};
use crate::events::Event;
use crate::fs::{append_line, atomic_write};
use crate::lock::{Location, Lock};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct LockFile {
    version: u32,
    #[serde(default)]
    locks: Vec<LockRecord>,
}

/// Lock records in `locks.json` under a data directory.
#[derive(Debug)]
pub struct JsonFileStore {
    dir: PathBuf,
    records: BTreeMap<Location, LockRecord>,
}

impl JsonFileStore {
    /// Use `dir` as the data directory. Nothing is read until [`LockStore::load`].
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            records: BTreeMap::new(),
        }
    }

    pub fn locks_path(&self) -> PathBuf {
        self.dir.join("locks.json")
    }

    pub fn events_path(&self) -> PathBuf {
        self.dir.join("events.ndjson")
    }

    fn read_file(&self) -> Result<Vec<LockRecord>> {
        let path = self.locks_path();
        if !path.exists() {
            return Ok(Vec::new());
        }

        let content = std::fs::read_to_string(&path).map_err(|e| {
            LatchError::StoreFailure(format!("failed to read '{}': {}", path.display(), e))
        })?;

        let file: LockFile = serde_json::from_str(&content).map_err(|e| {
            LatchError::StoreFailure(format!("failed to parse '{}': {}", path.display(), e))
        })?;

        if file.version != FORMAT_VERSION {
            return Err(LatchError::StoreFailure(format!(
                "'{}' has unsupported format version {}",
                path.display(),
                file.version
            )));
        }

        Ok(file.locks)
    }

    fn flush(&self) -> Result<()> {
        let file = LockFile {
            version: FORMAT_VERSION,
            locks: self.records.values().cloned().collect(),
        };
        let json = serde_json::to_string_pretty(&file).map_err(|e| {
            LatchError::StoreFailure(format!("failed to serialize lock records: {}", e))
        })?;
        atomic_write(self.locks_path(), json.as_bytes())
    }
}

impl LockStore for JsonFileStore {
    fn load(&mut self) -> Result<Vec<Lock>> {
        let records = self.read_file()?;
        self.records = records
            .iter()
            .map(|record| (record.location.clone(), record.clone()))
            .collect();
        records.into_iter().map(Lock::try_from).collect()
    }

    fn save(&mut self, locks: &[Lock]) -> Result<()> {
        self.records = locks
            .iter()
            .map(|lock| (lock.location().clone(), LockRecord::from(lock)))
            .collect();
        self.flush()
    }

    fn upsert(&mut self, lock: &Lock) -> Result<()> {
        self.records
            .insert(lock.location().clone(), LockRecord::from(lock));
        self.flush()
    }

    fn delete(&mut self, location: &Location) -> Result<()> {
        if self.records.remove(location).is_some() {
            self.flush()?;
        }
        Ok(())
    }

    fn delete_many(&mut self, locations: &[Location]) -> Result<()> {
        let before = self.records.len();
        for location in locations {
            self.records.remove(location);
        }
        if self.records.len() != before {
            self.flush()?;
        }
        Ok(())
    }

    fn append_event(&mut self, event: &Event) -> Result<()> {
        append_line(self.events_path(), &event.to_ndjson_line()?)
    }
}
