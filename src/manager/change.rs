//! Applying a [`LockChange`] to an existing lock.

use super::LockManager;
use super::index::LockTable;
use super::persist::Commit;
use crate::error::{LatchError, Result};
use crate::events::{Event, EventAction};
use crate::interaction::LockChange;
use crate::lock::{ActorId, Credential, Location, Lock, LockId};
use crate::policy::{self, AccessRequest, Decision, Operation};
use parking_lot::RwLockWriteGuard;
use serde_json::{Value, json};

impl LockManager {
    /// Apply `change` to the lock at `location` on behalf of `actor`.
    ///
    /// Deltas apply in a fixed order to a working copy: type, password, name,
    /// owner, membership, redstone. A new password clears the access list
    /// before any additions from the same change. Nothing is stored unless
    /// the whole change is valid.
    pub fn apply_change(
        &self,
        actor: &ActorId,
        location: &Location,
        change: &LockChange,
    ) -> Result<Lock> {
        if change.is_empty() {
            return Err(LatchError::InvalidState("nothing to change".to_string()));
        }
        if let Some(name) = &change.name {
            self.check_name(name)?;
        }
        let credential = change
            .password
            .as_ref()
            .map(|password| Credential::derive(password.expose(), self.config.password_hashing))
            .transpose()?;
        let bypassing = self.is_bypassing(actor);

        let table = self.table.write();
        let id = table
            .id_at(location)
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;
        let current = table
            .get(id)
            .cloned()
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;

        let decision = policy::evaluate(&AccessRequest {
            actor,
            lock: &current,
            bypassing,
            operation: Operation::Modify,
            unlocked_once: false,
        });
        if let Decision::Deny(reason) = decision {
            tracing::debug!(actor = %actor, location = %location, ?reason, "change denied");
            return Err(reason.into());
        }

        let mut working = current.clone();
        if let Some(lock_type) = change.lock_type {
            working.set_type(lock_type);
        }
        if let Some(credential) = credential {
            if !working.lock_type().is_password() {
                return Err(LatchError::InvalidState(format!(
                    "{} locks do not take a password",
                    working.lock_type()
                )));
            }
            working.set_credential(credential);
        }
        if let Some(name) = &change.name {
            working.set_name(name.trim());
        }
        if let Some(owner) = &change.owner {
            working.set_owner(owner.clone());
        }
        for member in &change.members_to_add {
            working.grant_access(member);
        }
        for member in &change.members_to_remove {
            working.revoke_access(member);
        }
        if let Some(protect) = change.protect_from_redstone {
            working.set_protect_from_redstone(protect);
        }

        self.commit_replace(table, id, &current, working, Some(actor))
    }

    /// Validate `working` against the table and swap it in for `current`.
    ///
    /// Checks the receiving quota when the owner or type changes, resolves
    /// name collisions in the receiving owner's set, then stores the result.
    pub(super) fn commit_replace(
        &self,
        mut table: RwLockWriteGuard<'_, LockTable>,
        id: LockId,
        current: &Lock,
        mut working: Lock,
        actor: Option<&ActorId>,
    ) -> Result<Lock> {
        let transfers = working.owner() != current.owner();
        let retypes = working.lock_type() != current.lock_type();
        if transfers || retypes {
            self.quota_check(&table, working.owner(), working.lock_type(), Some(id))?;
        }

        let name = table.unique_name(working.owner(), working.name(), Some(id));
        working.set_name(name);
        working.check_invariants()?;

        if &working == current {
            return Ok(working);
        }

        let rekeyed = current.credential() != working.credential() || retypes;
        table.replace(id, working.clone());
        if rekeyed {
            self.forget_unlocks(&[id]);
        }

        let changed = changed_fields(current, &working);
        tracing::debug!(
            location = %working.location(),
            name = working.name(),
            fields = ?changed,
            "lock changed"
        );

        let mut event = Event::new(EventAction::Change)
            .with_location(working.location())
            .with_details(json!({
                "name": working.name(),
                "owner": working.owner(),
                "type": working.lock_type(),
                "changed": changed,
            }));
        if let Some(actor) = actor {
            event = event.with_actor(actor);
        }

        let store = self.store.lock();
        drop(table);
        Commit::upsert(working.clone()).with_event(event).apply(store)?;
        Ok(working)
    }
}

fn changed_fields(before: &Lock, after: &Lock) -> Value {
    let mut fields = Vec::new();
    if before.lock_type() != after.lock_type() {
        fields.push("type");
    }
    if before.credential() != after.credential() {
        fields.push("password");
    }
    if before.name() != after.name() {
        fields.push("name");
    }
    if before.owner() != after.owner() {
        fields.push("owner");
    }
    if before.access_list() != after.access_list() {
        fields.push("access_list");
    }
    if before.protects_from_redstone() != after.protects_from_redstone() {
        fields.push("protect_from_redstone");
    }
    json!(fields)
}
