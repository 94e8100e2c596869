//! World events: an actor physically interacting with a location.

use super::LockManager;
use super::view::LockView;
use crate::error::{LatchError, Result};
use crate::interaction::InteractionKind;
use crate::lock::{ActorId, Location, Lock};
use crate::policy::{self, AccessRequest, Decision, Grant, Operation};

/// Result of one world interaction.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// Nothing protects the location.
    Unprotected,
    /// Plain entry to a protected object was allowed.
    Entered(Grant),
    Created(Lock),
    Changed(Lock),
    Deleted(Lock),
    Unlocked { lock: Lock, grant: Grant },
    Displayed(LockView),
    /// The armed operation or the entry failed.
    Denied(LatchError),
}

impl Outcome {
    /// Whether the physical action (opening the chest, using the door) goes
    /// ahead.
    pub fn proceeds(&self) -> bool {
        matches!(
            self,
            Outcome::Unprotected
                | Outcome::Entered(_)
                | Outcome::Created(_)
                | Outcome::Unlocked { .. }
        )
    }

    pub fn error(&self) -> Option<&LatchError> {
        match self {
            Outcome::Denied(err) => Some(err),
            _ => None,
        }
    }
}

impl LockManager {
    /// `actor` interacted with the `object` at `location`.
    ///
    /// An armed interaction is consumed and applied to the location; it is
    /// spent even when it fails, unless persisting. With nothing armed the
    /// event is a plain entry attempt.
    pub fn on_interact(&self, actor: &ActorId, location: &Location, object: &str) -> Outcome {
        let Some(interaction) = self.pending.consume(actor) else {
            return self.enter(actor, location);
        };
        tracing::debug!(
            actor = %actor,
            location = %location,
            kind = interaction.kind.label(),
            persist = interaction.persist,
            "applying interaction"
        );

        let result = match &interaction.kind {
            InteractionKind::Display => self.display(actor, location).map(Outcome::Displayed),
            InteractionKind::Unlock { password } => self
                .unlock(actor, location, password.expose())
                .map(|(lock, grant)| Outcome::Unlocked { lock, grant }),
            InteractionKind::Change(change) => self
                .apply_change(actor, location, change)
                .map(Outcome::Changed),
            InteractionKind::Create(spec) => self
                .create_lock(actor, location, object, spec)
                .map(Outcome::Created),
            InteractionKind::Delete => self.remove_lock(actor, location).map(Outcome::Deleted),
        };
        result.unwrap_or_else(Outcome::Denied)
    }

    /// Plain entry with no armed interaction.
    pub fn enter(&self, actor: &ActorId, location: &Location) -> Outcome {
        let bypassing = self.is_bypassing(actor);
        let decision = {
            let table = self.table.read();
            let Some(id) = table.id_at(location) else {
                return Outcome::Unprotected;
            };
            let Some(lock) = table.get(id) else {
                return Outcome::Unprotected;
            };
            policy::evaluate(&AccessRequest {
                actor,
                lock,
                bypassing,
                operation: Operation::Enter,
                unlocked_once: self.has_unlocked(actor, id),
            })
        };

        match decision {
            Decision::Allow(grant) => {
                self.touch_quietly(location);
                Outcome::Entered(grant)
            }
            Decision::Deny(reason) => {
                tracing::debug!(actor = %actor, location = %location, ?reason, "entry denied");
                Outcome::Denied(reason.into())
            }
        }
    }

    /// Try `password` on the lock at `location`.
    ///
    /// A first correct password on a `PasswordOnce` lock is remembered. As
    /// with the access time, a store failure while remembering it is logged
    /// and the unlock still succeeds.
    pub fn unlock(
        &self,
        actor: &ActorId,
        location: &Location,
        password: &str,
    ) -> Result<(Lock, Grant)> {
        let bypassing = self.is_bypassing(actor);
        let (lock, unlocked_once) = {
            let table = self.table.read();
            let id = table
                .id_at(location)
                .ok_or_else(|| LatchError::NotFound(location.clone()))?;
            let lock = table
                .get(id)
                .cloned()
                .ok_or_else(|| LatchError::NotFound(location.clone()))?;
            (lock, self.has_unlocked(actor, id))
        };

        let grant = policy::evaluate(&AccessRequest {
            actor,
            lock: &lock,
            bypassing,
            operation: Operation::Unlock(password),
            unlocked_once,
        })
        .into_result()
        .inspect_err(|err| {
            tracing::debug!(actor = %actor, location = %location, error = %err, "unlock denied");
        })?;

        if grant == Grant::FirstUnlock
            && let Err(err) = self.record_unlock(actor, &lock)
        {
            tracing::debug!(actor = %actor, location = %location, error = %err, "unlock not stored");
        }
        self.touch_quietly(location);
        Ok((self.get_lock(location).unwrap_or(lock), grant))
    }

    /// What `actor` may see of the lock at `location`.
    ///
    /// The access list is only shown to the owner and bypassing actors.
    pub fn display(&self, actor: &ActorId, location: &Location) -> Result<LockView> {
        let bypassing = self.is_bypassing(actor);
        let table = self.table.read();
        let lock = table
            .lock_at(location)
            .ok_or_else(|| LatchError::NotFound(location.clone()))?;
        Ok(LockView::of(lock, bypassing || lock.is_owner(actor)))
    }

    /// Touch after an allowed entry. A store failure is already logged and
    /// does not turn the entry into a denial.
    fn touch_quietly(&self, location: &Location) {
        if let Err(err) = self.touch(location) {
            tracing::debug!(location = %location, error = %err, "access time not stored");
        }
    }
}
