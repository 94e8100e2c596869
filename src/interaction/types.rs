//! Interaction payloads.

use crate::lock::{ActorId, LockType};
use std::fmt;

/// A plaintext password held only until it is hashed or checked.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    pub fn new(password: impl Into<String>) -> Self {
        Self(password.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(***)")
    }
}

/// What to create on the next unprotected object the actor touches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSpec {
    pub lock_type: LockType,
    /// Generated from the object kind when absent.
    pub name: Option<String>,
    /// Required for password types, rejected otherwise.
    pub password: Option<Password>,
}

impl CreateSpec {
    pub fn new(lock_type: LockType) -> Self {
        Self {
            lock_type,
            name: None,
            password: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(Password::new(password));
        self
    }
}

/// Attribute changes for an existing lock. Only the provided fields apply.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LockChange {
    pub lock_type: Option<LockType>,
    pub password: Option<Password>,
    pub name: Option<String>,
    pub owner: Option<ActorId>,
    pub members_to_add: Vec<ActorId>,
    pub members_to_remove: Vec<ActorId>,
    pub protect_from_redstone: Option<bool>,
}

impl LockChange {
    /// True when nothing would change.
    pub fn is_empty(&self) -> bool {
        self.lock_type.is_none()
            && self.password.is_none()
            && self.name.is_none()
            && self.owner.is_none()
            && self.members_to_add.is_empty()
            && self.members_to_remove.is_empty()
            && self.protect_from_redstone.is_none()
    }
}

/// The operation to apply on the next qualifying world event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InteractionKind {
    Display,
    Unlock { password: Password },
    Change(LockChange),
    Create(CreateSpec),
    Delete,
}

impl InteractionKind {
    pub fn label(&self) -> &'static str {
        match self {
            InteractionKind::Display => "display",
            InteractionKind::Unlock { .. } => "unlock",
            InteractionKind::Change(_) => "change",
            InteractionKind::Create(_) => "create",
            InteractionKind::Delete => "delete",
        }
    }
}

/// A pending operation armed by one actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interaction {
    pub actor: ActorId,
    pub kind: InteractionKind,
    /// Re-arm after each use instead of clearing.
    pub persist: bool,
}

impl Interaction {
    pub fn new(actor: ActorId, kind: InteractionKind) -> Self {
        Self {
            actor,
            kind,
            persist: false,
        }
    }

    pub fn persisting(mut self, persist: bool) -> Self {
        self.persist = persist;
        self
    }

    pub fn display(actor: ActorId) -> Self {
        Self::new(actor, InteractionKind::Display)
    }

    pub fn unlock(actor: ActorId, password: impl Into<String>) -> Self {
        Self::new(
            actor,
            InteractionKind::Unlock {
                password: Password::new(password),
            },
        )
    }

    pub fn change(actor: ActorId, change: LockChange) -> Self {
        Self::new(actor, InteractionKind::Change(change))
    }

    pub fn create(actor: ActorId, spec: CreateSpec) -> Self {
        Self::new(actor, InteractionKind::Create(spec))
    }

    pub fn delete(actor: ActorId) -> Self {
        Self::new(actor, InteractionKind::Delete)
    }
}
