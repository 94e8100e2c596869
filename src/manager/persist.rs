//! Mirroring committed mutations into the store.
//!
//! The caller commits in memory under the table's write guard, then takes the
//! store mutex before releasing that guard. Store writes therefore happen in
//! commit order without any I/O under the table lock.

use crate::error::Result;
use crate::events::Event;
use crate::lock::{Location, Lock};
use crate::store::LockStore;
use parking_lot::MutexGuard;

/// One write to mirror.
#[derive(Debug)]
pub(crate) enum StoreWrite {
    Upsert(Lock),
    Delete(Location),
    DeleteMany(Vec<Location>),
}

/// The write and audit event produced by one committed mutation.
#[derive(Debug)]
pub(crate) struct Commit {
    write: StoreWrite,
    event: Option<Event>,
}

impl Commit {
    pub fn upsert(lock: Lock) -> Self {
        Self::of(StoreWrite::Upsert(lock))
    }

    pub fn delete(location: Location) -> Self {
        Self::of(StoreWrite::Delete(location))
    }

    pub fn delete_many(locations: Vec<Location>) -> Self {
        Self::of(StoreWrite::DeleteMany(locations))
    }

    fn of(write: StoreWrite) -> Self {
        Self { write, event: None }
    }

    pub fn with_event(mut self, event: Event) -> Self {
        self.event = Some(event);
        self
    }

    /// Apply the write, then append the event.
    ///
    /// A failed write skips the event and is returned as-is; the in-memory
    /// state stays committed.
    pub fn apply(self, mut store: MutexGuard<'_, Box<dyn LockStore>>) -> Result<()> {
        let store = &mut **store;
        let written = match &self.write {
            StoreWrite::Upsert(lock) => store.upsert(lock),
            StoreWrite::Delete(location) => store.delete(location),
            StoreWrite::DeleteMany(locations) => store.delete_many(locations),
        };
        let result = written.and_then(|()| match &self.event {
            Some(event) => store.append_event(event),
            None => Ok(()),
        });

        if let Err(err) = &result {
            tracing::warn!(
                action = ?self.event.as_ref().map(|e| e.action),
                error = %err,
                "store write failed; keeping in-memory state"
            );
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::EventAction;
    use crate::store::MemoryStore;
    use crate::test_support::loc;
    use parking_lot::Mutex;

    fn boxed(store: &MemoryStore) -> Mutex<Box<dyn LockStore>> {
        let boxed: Box<dyn LockStore> = Box::new(store.clone());
        Mutex::new(boxed)
    }

    #[test]
    fn write_then_event() {
        let store = MemoryStore::new();
        let handle = boxed(&store);

        Commit::delete(loc(1))
            .with_event(Event::new(EventAction::Delete))
            .apply(handle.lock())
            .unwrap();
        assert_eq!(store.events().len(), 1);

        Commit::delete_many(vec![loc(1), loc(2)])
            .apply(handle.lock())
            .unwrap();
        assert_eq!(store.events().len(), 1, "no event attached");
    }

    #[test]
    fn failed_write_skips_event() {
        let store = MemoryStore::new();
        let handle = boxed(&store);
        store.set_fail_writes(true);

        let err = Commit::delete(loc(1))
            .with_event(Event::new(EventAction::Delete))
            .apply(handle.lock())
            .unwrap_err();
        assert!(matches!(err, crate::error::LatchError::StoreFailure(_)));

        store.set_fail_writes(false);
        assert!(store.events().is_empty());
    }
}
