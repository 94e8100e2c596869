//! The lock manager.
//!
//! [`LockManager`] is the only way to read or change locks. It owns the lock
//! table, the bypass set, the remembered `PasswordOnce` unlocks, the pending
//! interactions and the store handle.
//!
//! # Locking
//!
//! The table sits behind one `RwLock`: lookups share it, every mutation runs
//! inside a single write section. Locks are always taken in this order:
//!
//! 1. `bypassing` (read, released before anything else is taken)
//! 2. `table`
//! 3. `session_unlocks`
//! 4. `store` (taken before the table guard drops)
//!
//! Password hashing happens before the table lock is taken.

mod change;
mod index;
mod lockables;
mod operations;
mod persist;
mod view;
mod world;


pub use lockables::Lockables;
pub use view::{LimitReport, LockView, Usage};
pub use world::Outcome;

use crate::config::Config;
use crate::error::{LatchError, Result};
use crate::interaction::PendingInteractions;
use crate::lock::{ActorId, LockId};
use crate::store::{LockStore, MemoryStore};
use index::LockTable;
use parking_lot::{Mutex, RwLock};
use regex::Regex;
use std::collections::HashSet;

/// The single authority over locks.
pub struct LockManager {
    config: Config,
    name_regex: Regex,
    table: RwLock<LockTable>,
    bypassing: RwLock<HashSet<ActorId>>,
    session_unlocks: RwLock<HashSet<(ActorId, LockId)>>,
    pending: PendingInteractions,
    lockables: RwLock<Lockables>,
    store: Mutex<Box<dyn LockStore>>,
}

impl LockManager {
    /// A manager backed by an empty in-memory store.
    pub fn new(config: Config) -> Result<Self> {
        Self::open(config, Box::new(MemoryStore::new()))
    }

    /// Load every lock from `store` and index it.
    ///
    /// Records whose name collides with another lock of the same owner are
    /// renamed and written back.
    pub fn open(config: Config, mut store: Box<dyn LockStore>) -> Result<Self> {
        config.validate()?;
        let name_regex = config.name_regex()?;
        let lockables = Lockables::new(&config.lockable_objects)?;

        let mut locks = store.load()?;
        locks.sort_by(|a, b| {
            a.created_at()
                .cmp(&b.created_at())
                .then_with(|| a.location().cmp(b.location()))
        });

        let mut table = LockTable::default();
        let mut renamed = 0usize;
        for mut lock in locks {
            if table.id_at(lock.location()).is_some() {
                tracing::warn!(location = %lock.location(), "skipping second lock at location");
                continue;
            }
            if !table.is_unique_name(lock.owner(), lock.name(), None) {
                let fresh = table.unique_name(lock.owner(), lock.name(), None);
                tracing::warn!(
                    owner = %lock.owner(),
                    name = lock.name(),
                    renamed_to = %fresh,
                    "duplicate lock name on load"
                );
                lock.set_name(fresh);
                renamed += 1;
            }
            table.insert(lock);
        }

        if renamed > 0 {
            let all: Vec<_> = table.iter().map(|(_, lock)| lock.clone()).collect();
            store.save(&all)?;
        }
        tracing::info!(locks = table.len(), renamed, "lock table loaded");

        Ok(Self {
            config,
            name_regex,
            table: RwLock::new(table),
            bypassing: RwLock::new(HashSet::new()),
            session_unlocks: RwLock::new(HashSet::new()),
            pending: PendingInteractions::new(),
            lockables: RwLock::new(lockables),
            store: Mutex::new(store),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Names given by actors must be non-blank and match `name_pattern`.
    fn check_name(&self, name: &str) -> Result<()> {
        let name = name.trim();
        if name.is_empty() || !self.name_regex.is_match(name) {
            return Err(LatchError::InvalidState(format!(
                "'{}' is not a valid lock name",
                name
            )));
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn assert_consistent(&self) {
        self.table.read().assert_consistent();
    }
}

impl std::fmt::Debug for LockManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LockManager")
            .field("locks", &self.table.read().len())
            .field("bypassing", &self.bypassing.read().len())
            .field("pending", &self.pending.armed_count())
            .finish_non_exhaustive()
    }
}
