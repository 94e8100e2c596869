//! Persistence boundary.
//!
//! The manager only needs [`LockStore`]: load everything at startup, then
//! mirror each committed mutation. Writes happen after the in-memory state is
//! already consistent; a failing write is reported as
//! [`LatchError::StoreFailure`](crate::error::LatchError::StoreFailure) but
//! never rolls the in-memory state back.

mod file;
mod memory;
mod record;


pub use file::JsonFileStore;
pub use memory::MemoryStore;
pub use record::{CredentialRecord, LockRecord};

use crate::error::Result;
use crate::events::Event;
use crate::lock::{Location, Lock};

/// Durable home of lock records.
pub trait LockStore: Send {
    /// Read every stored lock.
    fn load(&mut self) -> Result<Vec<Lock>>;

    /// Replace the stored set with `locks`.
    fn save(&mut self, locks: &[Lock]) -> Result<()>;

    /// Insert or replace the record at the lock's location.
    fn upsert(&mut self, lock: &Lock) -> Result<()>;

    /// Remove the record at `location`, if any.
    fn delete(&mut self, location: &Location) -> Result<()>;

    /// Remove several records as one write where the store allows it.
    fn delete_many(&mut self, locations: &[Location]) -> Result<()> {
        locations.iter().try_for_each(|location| self.delete(location))
    }

    /// Record an audit event. Stores without an audit log ignore it.
    fn append_event(&mut self, _event: &Event) -> Result<()> {
        Ok(())
    }
}
