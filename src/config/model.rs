//! Config struct definition and default implementation.

use super::types::*;
use crate::lock::{ActorId, HashParams};
use serde::{Deserialize, Serialize};

/// Configuration for latch.
///
/// This struct represents the contents of `config.yaml` in the data directory.
/// Unknown fields in the YAML are ignored for forward compatibility.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // =========================================================================
    // Ownership settings
    // =========================================================================
    /// Per-owner lock limits.
    pub limits: LockLimits,

    /// Regex a user-supplied lock name must match.
    #[serde(default = "default_name_pattern")]
    pub name_pattern: String,

    // =========================================================================
    // Access settings
    // =========================================================================
    /// How `PasswordOnce` unlocks are remembered.
    pub once_unlock: OnceUnlockMode,

    /// Default redstone protection for new locks.
    pub protect_from_redstone: bool,

    /// Glob patterns naming the object kinds that may be locked.
    #[serde(default = "default_lockable_objects")]
    pub lockable_objects: Vec<String>,

    /// Actors allowed to run admin commands in sessions.
    pub admins: Vec<ActorId>,

    // =========================================================================
    // Credential settings
    // =========================================================================
    /// Argon2 parameters for new passwords.
    pub password_hashing: HashParams,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            limits: LockLimits::default(),
            name_pattern: default_name_pattern(),
            once_unlock: OnceUnlockMode::default(),
            protect_from_redstone: false,
            lockable_objects: default_lockable_objects(),
            admins: Vec::new(),
            password_hashing: HashParams::default(),
        }
    }
}
