//! Configuration types and defaults for latch.
//!
//! This module defines enums, limit tables, and default value functions
//! used by the Config struct.

use crate::lock::LockType;
use serde::{Deserialize, Serialize};

/// How a `PasswordOnce` unlock is remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum OnceUnlockMode {
    /// Remembered per actor and lock until the actor disconnects or the
    /// process restarts (default).
    #[default]
    Session,
    /// The actor is added to the lock's access list, which is persisted. A
    /// password change revokes it like any other grant.
    Durable,
}

/// Maximum number of locks an owner may hold at once.
///
/// A missing value means no limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LockLimits {
    /// Limit across all lock types.
    pub total: Option<u32>,
    pub private: Option<u32>,
    pub password_always: Option<u32>,
    pub password_once: Option<u32>,
    pub donation: Option<u32>,
}

impl Default for LockLimits {
    fn default() -> Self {
        Self {
            total: Some(64),
            private: Some(24),
            password_always: Some(24),
            password_once: Some(24),
            donation: Some(24),
        }
    }
}

impl LockLimits {
    /// No limits at all.
    pub fn unlimited() -> Self {
        Self {
            total: None,
            private: None,
            password_always: None,
            password_once: None,
            donation: None,
        }
    }

    /// The per-type limit for `lock_type`.
    pub fn for_type(&self, lock_type: LockType) -> Option<u32> {
        match lock_type {
            LockType::Private => self.private,
            LockType::PasswordAlways => self.password_always,
            LockType::PasswordOnce => self.password_once,
            LockType::Donation => self.donation,
        }
    }
}

/// Default glob patterns for lockable objects.
pub fn default_lockable_objects() -> Vec<String> {
    [
        "*chest",
        "*barrel",
        "*shulker_box",
        "*furnace",
        "*smoker",
        "hopper",
        "dispenser",
        "dropper",
        "*door",
        "*trapdoor",
        "*fence_gate",
        "*sign",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

// Default value functions for serde
pub(crate) fn default_name_pattern() -> String {
    r"^[A-Za-z0-9_\-]{1,32}$".to_string()
}
