//! Identifier and enum types shared across the lock model.

use crate::error::{LatchError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identity of an actor (player) issuing commands or touching objects.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(String);

impl ActorId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ActorId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for ActorId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A block position in a named world. Exactly one lock may exist per location.
///
/// The textual form is `world:x,y,z`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Location {
    pub world: String,
    pub x: i64,
    pub y: i64,
    pub z: i64,
}

impl Location {
    pub fn new(world: impl Into<String>, x: i64, y: i64, z: i64) -> Self {
        Self {
            world: world.into(),
            x,
            y,
            z,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{},{},{}", self.world, self.x, self.y, self.z)
    }
}

impl FromStr for Location {
    type Err = LatchError;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = || {
            LatchError::UserError(format!(
                "invalid location '{}': expected world:x,y,z",
                s
            ))
        };

        let (world, coords) = s.rsplit_once(':').ok_or_else(invalid)?;
        if world.is_empty() {
            return Err(invalid());
        }

        let parts: Vec<i64> = coords
            .split(',')
            .map(|p| p.trim().parse::<i64>())
            .collect::<std::result::Result<_, _>>()
            .map_err(|_| invalid())?;

        match parts.as_slice() {
            [x, y, z] => Ok(Location::new(world, *x, *y, *z)),
            _ => Err(invalid()),
        }
    }
}

/// How a lock decides who may enter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LockType {
    /// Owner and access list only.
    Private,
    /// A password is needed on every entry.
    PasswordAlways,
    /// A password is needed on the first entry only.
    PasswordOnce,
    /// Anyone may enter.
    Donation,
}

impl LockType {
    pub const ALL: [LockType; 4] = [
        LockType::Private,
        LockType::PasswordAlways,
        LockType::PasswordOnce,
        LockType::Donation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LockType::Private => "private",
            LockType::PasswordAlways => "password_always",
            LockType::PasswordOnce => "password_once",
            LockType::Donation => "donation",
        }
    }

    /// Password types must carry a credential; the others must not.
    pub fn is_password(&self) -> bool {
        matches!(self, LockType::PasswordAlways | LockType::PasswordOnce)
    }
}

impl fmt::Display for LockType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LockType {
    type Err = LatchError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "private" => Ok(LockType::Private),
            "password_always" | "password" => Ok(LockType::PasswordAlways),
            "password_once" => Ok(LockType::PasswordOnce),
            "donation" => Ok(LockType::Donation),
            _ => Err(LatchError::UserError(format!(
                "unknown lock type '{}' (expected private, password_always, password_once, donation)",
                s
            ))),
        }
    }
}

/// Stable arena key of a lock inside the manager. Never reused within a process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LockId(pub(crate) u64);
