//! Data directory resolution for latch.
//!
//! Everything latch keeps on disk lives in one directory (default `.latch/`):
//!
//! - `config.yaml`: configuration, written by `latch init`
//! - `locks.json`: lock records
//! - `events.ndjson`: audit log

use crate::config::Config;
use crate::error::{LatchError, Result};
use crate::manager::LockManager;
use crate::store::JsonFileStore;
use std::path::PathBuf;

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".latch";

/// Paths of one latch data directory.
#[derive(Debug, Clone)]
pub struct DataContext {
    pub data_dir: PathBuf,
}

impl DataContext {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    pub fn config_path(&self) -> PathBuf {
        self.data_dir.join("config.yaml")
    }

    pub fn store(&self) -> JsonFileStore {
        JsonFileStore::new(&self.data_dir)
    }

    /// Check if the data directory has been initialized.
    pub fn is_initialized(&self) -> bool {
        self.config_path().is_file()
    }

    /// Ensure the data directory is initialized.
    ///
    /// # Returns
    ///
    /// * `Ok(())` - `config.yaml` exists
    /// * `Err(LatchError::UserError)` - Not initialized (exit code 1)
    pub fn ensure_initialized(&self) -> Result<()> {
        if !self.is_initialized() {
            return Err(LatchError::UserError(format!(
                "latch is not initialized in '{}'.\n\n\
                 Run `latch init` to create the data directory.",
                self.data_dir.display()
            )));
        }
        Ok(())
    }

    pub fn load_config(&self) -> Result<Config> {
        Config::load(self.config_path())
    }

    /// Load the config and every stored lock.
    pub fn open_manager(&self) -> Result<LockManager> {
        self.ensure_initialized()?;
        let config = self.load_config()?;
        LockManager::open(config, Box::new(self.store()))
    }
}
