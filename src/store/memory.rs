//! In-memory store.

use super::LockStore;
use super::record::LockRecord;
use crate::error::{LatchError, Result};
use crate::events::Event;
use crate::lock::{Location, Lock};
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::Arc;

#[derive(Debug, Default)]
struct Inner {
    records: BTreeMap<Location, LockRecord>,
    events: Vec<Event>,
    fail_writes: bool,
}

/// A store that keeps records in memory.
///
/// Clones share the same records, so a caller can keep a handle after giving
/// one to the manager.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with `locks`.
    pub fn with_locks<'a>(locks: impl IntoIterator<Item = &'a Lock>) -> Self {
        let store = Self::new();
        {
            let mut inner = store.inner.lock();
            for lock in locks {
                inner
                    .records
                    .insert(lock.location().clone(), LockRecord::from(lock));
            }
        }
        store
    }

    /// Make every later write fail with `StoreFailure`.
    pub fn set_fail_writes(&self, fail: bool) {
        self.inner.lock().fail_writes = fail;
    }

    pub fn record(&self, location: &Location) -> Option<LockRecord> {
        self.inner.lock().records.get(location).cloned()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn events(&self) -> Vec<Event> {
        self.inner.lock().events.clone()
    }

    fn write<T>(&self, apply: impl FnOnce(&mut Inner) -> T) -> Result<T> {
        let mut inner = self.inner.lock();
        if inner.fail_writes {
            return Err(LatchError::StoreFailure(
                "memory store is rejecting writes".to_string(),
            ));
        }
        Ok(apply(&mut inner))
    }
}

impl LockStore for MemoryStore {
    fn load(&mut self) -> Result<Vec<Lock>> {
        let records: Vec<LockRecord> = self.inner.lock().records.values().cloned().collect();
        records.into_iter().map(Lock::try_from).collect()
    }

    fn save(&mut self, locks: &[Lock]) -> Result<()> {
        self.write(|inner| {
            inner.records = locks
                .iter()
                .map(|lock| (lock.location().clone(), LockRecord::from(lock)))
                .collect();
        })
    }

    fn upsert(&mut self, lock: &Lock) -> Result<()> {
        self.write(|inner| {
            inner
                .records
                .insert(lock.location().clone(), LockRecord::from(lock));
        })
    }

    fn delete(&mut self, location: &Location) -> Result<()> {
        self.write(|inner| {
            inner.records.remove(location);
        })
    }

    fn append_event(&mut self, event: &Event) -> Result<()> {
        self.write(|inner| inner.events.push(event.clone()))
    }
}
