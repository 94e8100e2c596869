//! Read-only views returned to commands.

use crate::lock::{ActorId, Location, Lock, LockType};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// What an actor sees when displaying a lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LockView {
    pub location: Location,
    pub object: String,
    pub owner: ActorId,
    pub name: String,
    pub lock_type: LockType,
    pub protect_from_redstone: bool,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
    /// Only filled in for the owner and bypassing actors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub access_list: Option<Vec<ActorId>>,
}

impl LockView {
    pub(crate) fn of(lock: &Lock, show_access: bool) -> Self {
        Self {
            location: lock.location().clone(),
            object: lock.object().to_string(),
            owner: lock.owner().clone(),
            name: lock.name().to_string(),
            lock_type: lock.lock_type(),
            protect_from_redstone: lock.protects_from_redstone(),
            created_at: lock.created_at(),
            last_accessed_at: lock.last_accessed_at(),
            access_list: show_access.then(|| lock.access_list().iter().cloned().collect()),
        }
    }
}

/// Locks held against a configured limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Usage {
    pub used: u32,
    pub limit: Option<u32>,
}

impl Usage {
    pub fn is_full(&self) -> bool {
        self.limit.is_some_and(|limit| self.used >= limit)
    }

    /// Locks still available, `None` when unlimited.
    pub fn remaining(&self) -> Option<u32> {
        self.limit.map(|limit| limit.saturating_sub(self.used))
    }
}

/// An owner's lock counts against the configured limits.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LimitReport {
    pub owner: ActorId,
    pub total: Usage,
    pub per_type: Vec<(LockType, Usage)>,
}

impl LimitReport {
    pub fn usage(&self, lock_type: LockType) -> Usage {
        self.per_type
            .iter()
            .find(|(t, _)| *t == lock_type)
            .map(|(_, usage)| *usage)
            .unwrap_or(Usage {
                used: 0,
                limit: None,
            })
    }

    /// True when a new lock of `lock_type` would exceed a limit.
    pub fn is_at_limit(&self, lock_type: LockType) -> bool {
        self.total.is_full() || self.usage(lock_type).is_full()
    }
}
