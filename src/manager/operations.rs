//! Lock table operations: lookup, creation, access lists, deletion, sweeps,
//! bypass and pending interactions.

use super::LockManager;
use super::index::LockTable;
use super::persist::Commit;
use super::view::{LimitReport, Usage};
use crate::config::OnceUnlockMode;
use crate::error::{LatchError, Result};
use crate::events::{Event, EventAction};
use crate::interaction::{CreateSpec, Interaction, PendingState};
use crate::lock::{ActorId, Location, Lock, LockId, LockType};
use crate::policy::{self, AccessRequest, Decision, Operation};
use chrono::{DateTime, Duration, Utc};
use serde_json::json;

impl LockManager {
    // =========================================================================
    // Lookup
    // =========================================================================

    /// A snapshot of the lock at `location`.
    pub fn get_lock(&self, location: &Location) -> Option<Lock> {
        self.table.read().lock_at(location).cloned()
    }

    pub fn lock_count(&self) -> usize {
        self.table.read().len()
    }

    /// Locks of one owner, or all locks, ordered by owner then name.
    pub fn list_locks(&self, owner: Option<&ActorId>) -> Vec<Lock> {
        let table = self.table.read();
        let mut locks: Vec<Lock> = match owner {
            Some(owner) => table.owned_by(owner).cloned().collect(),
            None => table.iter().map(|(_, lock)| lock.clone()).collect(),
        };
        locks.sort_by(|a, b| {
            a.owner()
                .cmp(b.owner())
                .then_with(|| a.name().to_lowercase().cmp(&b.name().to_lowercase()))
        });
        locks
    }

    pub fn find_by_name(&self, owner: &ActorId, name: &str) -> Option<Lock> {
        let table = self.table.read();
        table
            .id_by_name(owner, name)
            .and_then(|id| table.get(id))
            .cloned()
    }

    pub fn is_unique_name(&self, owner: &ActorId, name: &str) -> bool {
        self.table.read().is_unique_name(owner, name, None)
    }

    // =========================================================================
    // Quotas
    // =========================================================================

    /// True when `owner` may not take on another lock of `lock_type`.
    pub fn is_player_at_lock_limit(&self, owner: &ActorId, lock_type: LockType) -> bool {
        self.quota_check(&self.table.read(), owner, lock_type, None)
            .is_err()
    }

    pub fn limits(&self, owner: &ActorId) -> LimitReport {
        let table = self.table.read();
        let limits = &self.config.limits;
        LimitReport {
            owner: owner.clone(),
            total: Usage {
                used: table.count_owned(owner, None, None),
                limit: limits.total,
            },
            per_type: LockType::ALL
                .into_iter()
                .map(|lock_type| {
                    let usage = Usage {
                        used: table.count_owned(owner, Some(lock_type), None),
                        limit: limits.for_type(lock_type),
                    };
                    (lock_type, usage)
                })
                .collect(),
        }
    }

    /// Fails with `QuotaExceeded` when `owner` receiving one more lock of
    /// `lock_type` would break a limit. `exclude` is a lock that is moving
    /// within the same owner and must not count twice.
    pub(super) fn quota_check(
        &self,
        table: &LockTable,
        owner: &ActorId,
        lock_type: LockType,
        exclude: Option<LockId>,
    ) -> Result<()> {
        let limits = &self.config.limits;
        let over_total = limits
            .total
            .is_some_and(|limit| table.count_owned(owner, None, exclude) >= limit);
        let over_type = limits
            .for_type(lock_type)
            .is_some_and(|limit| table.count_owned(owner, Some(lock_type), exclude) >= limit);

        if over_total || over_type {
            return Err(LatchError::QuotaExceeded {
                owner: owner.clone(),
                lock_type,
            });
        }
        Ok(())
    }

    // =========================================================================
    // Creation
    // =========================================================================

    /// Protect the object at `location` for `owner`.
    ///
    /// Without a name the lock is called after the object (`Chest1`,
    /// `Chest2`, ...). A requested name already used by the owner gets a
    /// numeric suffix instead of failing.
    pub fn create_lock(
        &self,
        owner: &ActorId,
        location: &Location,
        object: &str,
        spec: &CreateSpec,
    ) -> Result<Lock> {
        if !self.is_lockable(object) {
            return Err(LatchError::InvalidState(format!(
                "{} objects cannot be locked",
                object
            )));
        }
        if let Some(name) = &spec.name {
            self.check_name(name)?;
        }

        let mut lock = Lock::new(
            owner.clone(),
            location.clone(),
            object,
            spec.lock_type,
            spec.name.as_deref().map(str::trim).unwrap_or_default(),
        );
        lock.set_protect_from_redstone(self.config.protect_from_redstone);
        match (&spec.password, spec.lock_type.is_password()) {
            (Some(password), true) => {
                lock.change_password(password.expose(), self.config.password_hashing)?
            }
            (None, true) => {
                return Err(LatchError::InvalidState(format!(
                    "{} locks need a password",
                    spec.lock_type
                )));
            }
            (Some(_), false) => {
                return Err(LatchError::InvalidState(format!(
                    "{} locks do not take a password",
                    spec.lock_type
                )));
            }
            (None, false) => {}
        }

        let mut table = self.table.write();
        if table.id_at(location).is_some() {
            return Err(LatchError::DuplicateLock(location.clone()));
        }
        self.quota_check(&table, owner, spec.lock_type, None)?;

        let name = match &spec.name {
            Some(name) => table.unique_name(owner, name, None),
            None => table.generate_name(owner, object),
        };
        lock.set_name(name);
        table.insert(lock.clone());

        tracing::debug!(
            owner = %owner,
            location = %location,
            name = lock.name(),
            lock_type = %lock.lock_type(),
            "lock created"
        );

        let event = Event::new(EventAction::Create)
            .with_actor(owner)
            .with_location(location)
            .with_details(json!({
                "name": lock.name(),
                "type": lock.lock_type(),
                "object": lock.object(),
            }));
        let store = self.store.lock();
        drop(table);
        Commit::upsert(lock.clone()).with_event(event).apply(store)?;
        Ok(lock)
    }

    // =========================================================================
    // Attribute updates
    // =========================================================================

    /// Replace the lock known as `old_name` of `old_owner` with `lock`.
    ///
    /// The location must stay the same. A transfer or type change checks the
    /// receiving quota first; a name collision in the receiving owner's set is
    /// resolved by renaming. Returns the stored version.
    pub fn update_lock_attributes(
        &self,
        old_owner: &ActorId,
        old_name: &str,
        lock: Lock,
    ) -> Result<Lock> {
        lock.check_invariants()?;

        let mut table = self.table.write();
        let id = table
            .id_by_name(old_owner, old_name)
            .ok_or_else(|| LatchError::NotFound(lock.location().clone()))?;
        let current = table
            .get(id)
            .cloned()
            .ok_or_else(|| LatchError::NotFound(lock.location().clone()))?;
        if current.location() != lock.location() {
            return Err(LatchError::InvalidState(format!(
                "lock '{}' is at {}, not {}",
                current.name(),
                current.location(),
                lock.location()
            )));
        }

        self.commit_replace(table, id, &current, lock, None)
    }

    // =========================================================================
    // Access lists
    // =========================================================================

    /// Returns false when the actor was already listed.
    pub fn add_lock_access(&self, location: &Location, member: &ActorId) -> Result<bool> {
        self.edit_access(location, "granted", member, |lock| {
            if lock.is_owner(member) {
                return Err(LatchError::InvalidState(format!(
                    "{} owns this lock already",
                    member
                )));
            }
            Ok(usize::from(lock.grant_access(member)))
        })
        .map(|changed| changed > 0)
    }

    /// Returns false when the actor was not listed.
    pub fn remove_lock_access(&self, location: &Location, member: &ActorId) -> Result<bool> {
        self.edit_access(location, "revoked", member, |lock| {
            Ok(usize::from(lock.revoke_access(member)))
        })
        .map(|changed| changed > 0)
    }

    /// Empty the access list, returning how many entries were removed.
    pub fn remove_all_lock_access(&self, location: &Location) -> Result<usize> {
        let mut table = self.table.write();
        let id = table
            .id_at(location)
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;
        let mut lock = table
            .get(id)
            .cloned()
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;

        let revoked = lock.clear_access();
        if revoked == 0 {
            return Ok(0);
        }
        table.replace(id, lock.clone());

        let event = Event::new(EventAction::Access)
            .with_location(location)
            .with_details(json!({ "cleared": revoked }));
        let store = self.store.lock();
        drop(table);
        Commit::upsert(lock).with_event(event).apply(store)?;
        Ok(revoked)
    }

    fn edit_access(
        &self,
        location: &Location,
        verb: &str,
        member: &ActorId,
        edit: impl FnOnce(&mut Lock) -> Result<usize>,
    ) -> Result<usize> {
        let mut table = self.table.write();
        let id = table
            .id_at(location)
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;
        let mut lock = table
            .get(id)
            .cloned()
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;

        let changed = edit(&mut lock)?;
        if changed == 0 {
            return Ok(0);
        }
        table.replace(id, lock.clone());
        tracing::debug!(location = %location, member = %member, verb, "access list changed");

        let event = Event::new(EventAction::Access)
            .with_location(location)
            .with_details(json!({ verb: member }));
        let store = self.store.lock();
        drop(table);
        Commit::upsert(lock).with_event(event).apply(store)?;
        Ok(changed)
    }

    // =========================================================================
    // Deletion
    // =========================================================================

    /// Delete the lock at `location` without any ownership check.
    pub fn delete_lock(&self, location: &Location) -> Result<Lock> {
        self.remove_at(location, None, EventAction::Delete)
    }

    /// Delete the lock at `location` on behalf of `actor`, who must own it or
    /// be bypassing.
    pub fn remove_lock(&self, actor: &ActorId, location: &Location) -> Result<Lock> {
        self.remove_at(location, Some(actor), EventAction::Delete)
    }

    /// The world reports that the protected object no longer exists.
    pub fn on_object_removed(&self, location: &Location) -> Result<Option<Lock>> {
        match self.remove_at(location, None, EventAction::Remove) {
            Ok(lock) => Ok(Some(lock)),
            Err(LatchError::NotFound(_)) => Ok(None),
            Err(err) => Err(err),
        }
    }

    fn remove_at(
        &self,
        location: &Location,
        requester: Option<&ActorId>,
        action: EventAction,
    ) -> Result<Lock> {
        let bypassing = requester.is_some_and(|actor| self.is_bypassing(actor));

        let mut table = self.table.write();
        let id = table
            .id_at(location)
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;

        if let Some(actor) = requester
            && let Some(lock) = table.get(id)
        {
            let decision = policy::evaluate(&AccessRequest {
                actor,
                lock,
                bypassing,
                operation: Operation::Delete,
                unlocked_once: false,
            });
            if let Decision::Deny(reason) = decision {
                tracing::debug!(actor = %actor, location = %location, ?reason, "delete denied");
                return Err(reason.into());
            }
        }

        let lock = table
            .remove(id)
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;
        self.forget_unlocks(&[id]);
        tracing::debug!(location = %location, name = lock.name(), %action, "lock removed");

        let mut event = Event::new(action)
            .with_location(location)
            .with_details(json!({ "name": lock.name(), "owner": lock.owner() }));
        if let Some(actor) = requester {
            event = event.with_actor(actor);
        }
        let store = self.store.lock();
        drop(table);
        Commit::delete(location.clone()).with_event(event).apply(store)?;
        Ok(lock)
    }

    /// Delete every lock `owner` holds, as one batch.
    pub fn purge(&self, owner: &ActorId) -> Result<Vec<Lock>> {
        let mut table = self.table.write();
        let ids = table.owned_ids(owner);
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let removed: Vec<Lock> = ids.iter().filter_map(|id| table.remove(*id)).collect();
        self.forget_unlocks(&ids);
        tracing::debug!(owner = %owner, count = removed.len(), "locks purged");

        let locations: Vec<Location> = removed.iter().map(|l| l.location().clone()).collect();
        let event = Event::new(EventAction::Purge).with_details(json!({
            "owner": owner,
            "removed": locations.iter().map(ToString::to_string).collect::<Vec<_>>(),
        }));
        let store = self.store.lock();
        drop(table);
        Commit::delete_many(locations).with_event(event).apply(store)?;
        Ok(removed)
    }

    /// Locks not accessed within the last `days` days.
    pub fn stale_locks(&self, days: u32) -> Vec<Lock> {
        let Some(cutoff) = stale_cutoff(days) else {
            return Vec::new();
        };
        let mut stale: Vec<Lock> = self
            .table
            .read()
            .iter()
            .filter(|(_, lock)| lock.last_accessed_at() < cutoff)
            .map(|(_, lock)| lock.clone())
            .collect();
        stale.sort_by(|a, b| a.location().cmp(b.location()));
        stale
    }

    /// Delete every lock not accessed within the last `days` days, as one
    /// batch.
    pub fn clean_older_than(&self, days: u32) -> Result<Vec<Lock>> {
        let Some(cutoff) = stale_cutoff(days) else {
            return Ok(Vec::new());
        };

        let mut table = self.table.write();
        let ids: Vec<LockId> = table
            .iter()
            .filter(|(_, lock)| lock.last_accessed_at() < cutoff)
            .map(|(id, _)| id)
            .collect();
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let mut removed: Vec<Lock> = ids.iter().filter_map(|id| table.remove(*id)).collect();
        removed.sort_by(|a, b| a.location().cmp(b.location()));
        self.forget_unlocks(&ids);
        tracing::debug!(days, count = removed.len(), "stale locks cleaned");

        let locations: Vec<Location> = removed.iter().map(|l| l.location().clone()).collect();
        let event = Event::new(EventAction::Clean).with_details(json!({
            "days": days,
            "removed": locations.iter().map(ToString::to_string).collect::<Vec<_>>(),
        }));
        let store = self.store.lock();
        drop(table);
        Commit::delete_many(locations).with_event(event).apply(store)?;
        Ok(removed)
    }

    // =========================================================================
    // Access bookkeeping
    // =========================================================================

    /// Refresh the lock's last access time.
    pub fn touch(&self, location: &Location) -> Result<()> {
        let mut table = self.table.write();
        let id = table
            .id_at(location)
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;
        let mut lock = table
            .get(id)
            .cloned()
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;
        lock.touch(Utc::now());
        table.replace(id, lock.clone());

        let store = self.store.lock();
        drop(table);
        Commit::upsert(lock).apply(store)
    }

    /// Whether `actor` has a remembered `PasswordOnce` unlock for lock `id`.
    pub(super) fn has_unlocked(&self, actor: &ActorId, id: LockId) -> bool {
        self.session_unlocks
            .read()
            .contains(&(actor.clone(), id))
    }

    /// Remember a first `PasswordOnce` unlock the way the config asks.
    ///
    /// Nothing is recorded when the lock changed credential since the
    /// password was checked.
    pub(super) fn record_unlock(&self, actor: &ActorId, checked: &Lock) -> Result<()> {
        let mut table = self.table.write();
        let Some(id) = table.id_at(checked.location()) else {
            return Ok(());
        };
        let Some(current) = table.get(id) else {
            return Ok(());
        };
        if current.credential() != checked.credential() {
            return Ok(());
        }

        match self.config.once_unlock {
            OnceUnlockMode::Session => {
                self.session_unlocks.write().insert((actor.clone(), id));
                Ok(())
            }
            OnceUnlockMode::Durable => {
                let mut lock = current.clone();
                if !lock.grant_access(actor) {
                    return Ok(());
                }
                table.replace(id, lock.clone());

                let event = Event::new(EventAction::Access)
                    .with_actor(actor)
                    .with_location(lock.location())
                    .with_details(json!({ "granted": actor, "by": "password" }));
                let store = self.store.lock();
                drop(table);
                Commit::upsert(lock).with_event(event).apply(store)
            }
        }
    }

    pub(super) fn forget_unlocks(&self, ids: &[LockId]) {
        self.session_unlocks
            .write()
            .retain(|(_, id)| !ids.contains(id));
    }

    // =========================================================================
    // Bypass
    // =========================================================================

    pub fn set_bypassing(&self, actor: &ActorId) {
        self.bypassing.write().insert(actor.clone());
        tracing::debug!(actor = %actor, "bypass enabled");
    }

    /// Returns false when the actor was not bypassing.
    pub fn remove_bypassing(&self, actor: &ActorId) -> bool {
        let removed = self.bypassing.write().remove(actor);
        if removed {
            tracing::debug!(actor = %actor, "bypass disabled");
        }
        removed
    }

    pub fn is_bypassing(&self, actor: &ActorId) -> bool {
        self.bypassing.read().contains(actor)
    }

    /// Flip bypass for `actor`, returning the new state.
    pub fn toggle_bypass(&self, actor: &ActorId) -> bool {
        if self.remove_bypassing(actor) {
            false
        } else {
            self.set_bypassing(actor);
            true
        }
    }

    // =========================================================================
    // Pending interactions
    // =========================================================================

    /// Arm `interaction`, returning the one it replaced.
    pub fn set_interaction_data(&self, interaction: Interaction) -> Option<Interaction> {
        tracing::debug!(
            actor = %interaction.actor,
            kind = interaction.kind.label(),
            persist = interaction.persist,
            "interaction armed"
        );
        self.pending.arm(interaction)
    }

    /// Take the armed interaction; it stays armed when persisting.
    pub fn consume_interaction_data(&self, actor: &ActorId) -> Option<Interaction> {
        self.pending.consume(actor)
    }

    pub fn clear_interaction_data(&self, actor: &ActorId) -> bool {
        self.pending.clear(actor)
    }

    /// Flip persistence; `None` when nothing is armed.
    pub fn toggle_persist(&self, actor: &ActorId) -> Option<bool> {
        self.pending.toggle_persist(actor)
    }

    pub fn interaction_state(&self, actor: &ActorId) -> PendingState {
        self.pending.state(actor)
    }

    // =========================================================================
    // Sessions
    // =========================================================================

    /// Forget everything held for an actor's session.
    pub fn on_disconnect(&self, actor: &ActorId) {
        self.remove_bypassing(actor);
        self.pending.clear(actor);
        self.session_unlocks
            .write()
            .retain(|(holder, _)| holder != actor);
        tracing::debug!(actor = %actor, "session ended");
    }

    // =========================================================================
    // Lockable objects and redstone
    // =========================================================================

    pub fn is_lockable(&self, object: &str) -> bool {
        self.lockables.read().is_lockable(object)
    }

    /// Returns false when the pattern was already present.
    pub fn add_lockable(&self, pattern: &str) -> Result<bool> {
        self.lockables.write().add(pattern)
    }

    /// Returns false when the pattern was not present.
    pub fn remove_lockable(&self, pattern: &str) -> Result<bool> {
        self.lockables.write().remove(pattern)
    }

    pub fn lockables(&self) -> Vec<String> {
        self.lockables.read().patterns().to_vec()
    }

    /// Whether automated activation of the object at `location` is blocked.
    pub fn blocks_redstone(&self, location: &Location) -> bool {
        self.table
            .read()
            .lock_at(location)
            .is_some_and(Lock::protects_from_redstone)
    }
}

/// Locks last accessed before this instant are stale. `None` when the
/// threshold reaches past the earliest representable time, so nothing is.
fn stale_cutoff(days: u32) -> Option<DateTime<Utc>> {
    Duration::try_days(i64::from(days)).and_then(|age| Utc::now().checked_sub_signed(age))
}
