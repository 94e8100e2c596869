//! The lock entity.

use super::credential::{Credential, HashParams};
use super::types::{ActorId, Location, LockType};
use crate::error::{LatchError, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeSet;

/// A protection record bound to exactly one world location.
///
/// Values handed out by the manager are snapshots; mutating one does not
/// change the manager's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lock {
    location: Location,
    object: String,
    owner: ActorId,
    lock_type: LockType,
    name: String,
    access_list: BTreeSet<ActorId>,
    credential: Option<Credential>,
    protect_from_redstone: bool,
    created_at: DateTime<Utc>,
    last_accessed_at: DateTime<Utc>,
}

impl Lock {
    /// Build a lock with no credential and an empty access list.
    ///
    /// Password types need a credential via [`Lock::change_password`] before
    /// the manager accepts them.
    pub fn new(
        owner: ActorId,
        location: Location,
        object: impl Into<String>,
        lock_type: LockType,
        name: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            location,
            object: object.into(),
            owner,
            lock_type,
            name: name.into(),
            access_list: BTreeSet::new(),
            credential: None,
            protect_from_redstone: false,
            created_at: now,
            last_accessed_at: now,
        }
    }

    /// Reassemble a lock from a stored record.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_record(
        owner: ActorId,
        location: Location,
        object: String,
        lock_type: LockType,
        name: String,
        access_list: BTreeSet<ActorId>,
        credential: Option<Credential>,
        protect_from_redstone: bool,
        created_at: DateTime<Utc>,
        last_accessed_at: DateTime<Utc>,
    ) -> Self {
        let mut lock = Self {
            location,
            object,
            owner,
            lock_type,
            name,
            access_list,
            credential,
            protect_from_redstone,
            created_at,
            last_accessed_at,
        };
        let owner = lock.owner.clone();
        lock.access_list.remove(&owner);
        lock
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    pub fn owner(&self) -> &ActorId {
        &self.owner
    }

    pub fn lock_type(&self) -> LockType {
        self.lock_type
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn access_list(&self) -> &BTreeSet<ActorId> {
        &self.access_list
    }

    pub fn credential(&self) -> Option<&Credential> {
        self.credential.as_ref()
    }

    pub fn protects_from_redstone(&self) -> bool {
        self.protect_from_redstone
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn last_accessed_at(&self) -> DateTime<Utc> {
        self.last_accessed_at
    }

    pub fn is_owner(&self, actor: &ActorId) -> bool {
        &self.owner == actor
    }

    /// Owner, access list member, or anyone at all for donation locks.
    pub fn has_access(&self, actor: &ActorId) -> bool {
        self.is_owner(actor)
            || self.access_list.contains(actor)
            || self.lock_type == LockType::Donation
    }

    /// Check a password. Locks without a credential never match.
    pub fn verify(&self, password: &str) -> bool {
        self.credential
            .as_ref()
            .is_some_and(|credential| credential.verify(password))
    }

    /// Replace the credential under a fresh salt and revoke all granted access.
    pub fn change_password(&mut self, password: &str, params: HashParams) -> Result<()> {
        if !self.lock_type.is_password() {
            return Err(LatchError::InvalidState(format!(
                "{} locks do not take a password",
                self.lock_type
            )));
        }
        self.set_credential(Credential::derive(password, params)?);
        Ok(())
    }

    /// Install an already derived credential. Clears the access list.
    pub(crate) fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
        self.access_list.clear();
    }

    /// Returns false when the actor is the owner or already listed.
    pub fn grant_access(&mut self, actor: &ActorId) -> bool {
        if self.is_owner(actor) {
            return false;
        }
        self.access_list.insert(actor.clone())
    }

    pub fn revoke_access(&mut self, actor: &ActorId) -> bool {
        self.access_list.remove(actor)
    }

    pub(crate) fn clear_access(&mut self) -> usize {
        let revoked = self.access_list.len();
        self.access_list.clear();
        revoked
    }

    /// Switching to a non-password type drops the credential.
    pub(crate) fn set_type(&mut self, lock_type: LockType) {
        self.lock_type = lock_type;
        if !lock_type.is_password() {
            self.credential = None;
        }
    }

    pub(crate) fn set_name(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    /// The new owner loses any explicit access entry.
    pub(crate) fn set_owner(&mut self, owner: ActorId) {
        self.access_list.remove(&owner);
        self.owner = owner;
    }

    pub(crate) fn set_protect_from_redstone(&mut self, protect: bool) {
        self.protect_from_redstone = protect;
    }

    pub(crate) fn touch(&mut self, at: DateTime<Utc>) {
        self.last_accessed_at = at;
    }

    /// Check the credential/type and owner/access-list invariants.
    pub(crate) fn check_invariants(&self) -> Result<()> {
        match (self.lock_type.is_password(), self.credential.is_some()) {
            (true, false) => {
                return Err(LatchError::InvalidState(format!(
                    "{} locks need a password",
                    self.lock_type
                )));
            }
            (false, true) => {
                return Err(LatchError::InvalidState(format!(
                    "{} locks cannot carry a password",
                    self.lock_type
                )));
            }
            _ => {}
        }
        if self.access_list.contains(&self.owner) {
            return Err(LatchError::InvalidState(
                "the owner cannot be on the access list".to_string(),
            ));
        }
        Ok(())
    }
}
