//! Access policy.
//!
//! [`evaluate`] is a pure function of the actor, the lock, the actor's bypass
//! flag and the attempted operation. It never mutates anything; recording a
//! `PasswordOnce` unlock is the caller's job when the decision says so.
//!
//! Rules, first match wins:
//!
//! 1. Bypassing actors are always allowed.
//! 2. Modify and delete need the owner.
//! 3. Donation locks admit everyone.
//! 4. Private locks admit the owner and the access list.
//! 5. `PasswordAlways` needs the password on every unlock; plain entry is
//!    limited to the owner and the access list.
//! 6. `PasswordOnce` needs the password once per actor, then admits them.

use crate::error::LatchError;
use crate::lock::{ActorId, Lock, LockType};

/// What the actor is trying to do to the lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation<'a> {
    /// Open or use the protected object without a password.
    Enter,
    /// Open the object with a password.
    Unlock(&'a str),
    /// Change the lock's attributes.
    Modify,
    /// Remove the lock.
    Delete,
}

/// Everything the policy looks at.
#[derive(Debug, Clone, Copy)]
pub struct AccessRequest<'a> {
    pub actor: &'a ActorId,
    pub lock: &'a Lock,
    pub bypassing: bool,
    pub operation: Operation<'a>,
    /// The actor already unlocked this `PasswordOnce` lock.
    pub unlocked_once: bool,
}

/// Why access was granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    Bypass,
    Owner,
    Member,
    Public,
    /// Password matched; nothing to remember.
    Password,
    /// Password matched on a `PasswordOnce` lock; the unlock must be recorded.
    FirstUnlock,
    /// Earlier `PasswordOnce` unlock by this actor.
    Remembered,
}

/// Why access was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotOwner,
    NoAccess,
    PasswordRequired,
    WrongPassword,
}

impl From<DenyReason> for LatchError {
    fn from(reason: DenyReason) -> Self {
        match reason {
            DenyReason::NotOwner => LatchError::NotOwner,
            DenyReason::NoAccess => LatchError::NoAccess,
            DenyReason::PasswordRequired => LatchError::PasswordRequired,
            DenyReason::WrongPassword => LatchError::WrongPassword,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow(Grant),
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow(_))
    }

    /// Convert into a result, mapping denials onto [`LatchError`].
    pub fn into_result(self) -> Result<Grant, LatchError> {
        match self {
            Decision::Allow(grant) => Ok(grant),
            Decision::Deny(reason) => Err(reason.into()),
        }
    }
}

/// Decide whether the request is allowed.
pub fn evaluate(request: &AccessRequest<'_>) -> Decision {
    let AccessRequest {
        actor,
        lock,
        bypassing,
        operation,
        unlocked_once,
    } = *request;

    if bypassing {
        return Decision::Allow(Grant::Bypass);
    }

    if matches!(operation, Operation::Modify | Operation::Delete) {
        return if lock.is_owner(actor) {
            Decision::Allow(Grant::Owner)
        } else {
            Decision::Deny(DenyReason::NotOwner)
        };
    }

    match lock.lock_type() {
        LockType::Donation => Decision::Allow(Grant::Public),
        LockType::Private => member_grant(lock, actor)
            .map(Decision::Allow)
            .unwrap_or(Decision::Deny(DenyReason::NoAccess)),
        LockType::PasswordAlways => match operation {
            Operation::Unlock(password) => check_password(lock, password, Grant::Password),
            _ => member_grant(lock, actor)
                .map(Decision::Allow)
                .unwrap_or(Decision::Deny(DenyReason::PasswordRequired)),
        },
        LockType::PasswordOnce => match operation {
            Operation::Unlock(password) => {
                let grant = if unlocked_once || lock.has_access(actor) {
                    Grant::Remembered
                } else {
                    Grant::FirstUnlock
                };
                check_password(lock, password, grant)
            }
            _ => {
                if let Some(grant) = member_grant(lock, actor) {
                    Decision::Allow(grant)
                } else if unlocked_once {
                    Decision::Allow(Grant::Remembered)
                } else {
                    Decision::Deny(DenyReason::PasswordRequired)
                }
            }
        },
    }
}

fn member_grant(lock: &Lock, actor: &ActorId) -> Option<Grant> {
    if lock.is_owner(actor) {
        Some(Grant::Owner)
    } else if lock.access_list().contains(actor) {
        Some(Grant::Member)
    } else {
        None
    }
}

fn check_password(lock: &Lock, password: &str, grant: Grant) -> Decision {
    if lock.verify(password) {
        Decision::Allow(grant)
    } else {
        Decision::Deny(DenyReason::WrongPassword)
    }
}
