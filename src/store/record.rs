//! On-disk record layout, mirroring the lock entity.

use crate::error::{LatchError, Result};
use crate::lock::{ActorId, Credential, HashParams, Location, Lock, LockType};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Serialized form of a [`Lock`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub location: Location,
    pub object: String,
    pub owner: ActorId,
    pub lock_type: LockType,
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeSet::is_empty")]
    pub access_list: BTreeSet<ActorId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credential: Option<CredentialRecord>,
    #[serde(default)]
    pub protect_from_redstone: bool,
    pub created_at: DateTime<Utc>,
    pub last_accessed_at: DateTime<Utc>,
}

/// Salt and hash are base64 encoded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub salt: String,
    pub hash: String,
    #[serde(default)]
    pub params: HashParams,
}

impl From<&Lock> for LockRecord {
    fn from(lock: &Lock) -> Self {
        Self {
            location: lock.location().clone(),
            object: lock.object().to_string(),
            owner: lock.owner().clone(),
            lock_type: lock.lock_type(),
            name: lock.name().to_string(),
            access_list: lock.access_list().clone(),
            credential: lock.credential().map(|credential| CredentialRecord {
                salt: STANDARD.encode(credential.salt()),
                hash: STANDARD.encode(credential.hash()),
                params: credential.params(),
            }),
            protect_from_redstone: lock.protects_from_redstone(),
            created_at: lock.created_at(),
            last_accessed_at: lock.last_accessed_at(),
        }
    }
}

impl TryFrom<LockRecord> for Lock {
    type Error = LatchError;

    fn try_from(record: LockRecord) -> Result<Self> {
        let credential = match record.credential {
            Some(stored) => {
                let decode = |field: &str, value: &str| {
                    STANDARD.decode(value).map_err(|e| {
                        LatchError::StoreFailure(format!(
                            "lock at {} has an unreadable credential {}: {}",
                            record.location, field, e
                        ))
                    })
                };
                let salt = decode("salt", &stored.salt)?;
                let hash = decode("hash", &stored.hash)?;
                Some(Credential::from_parts(salt, hash, stored.params))
            }
            None => None,
        };

        let lock = Lock::from_record(
            record.owner,
            record.location,
            record.object,
            record.lock_type,
            record.name,
            record.access_list,
            credential,
            record.protect_from_redstone,
            record.created_at,
            record.last_accessed_at,
        );

        lock.check_invariants().map_err(|e| {
            LatchError::StoreFailure(format!(
                "stored lock at {} is inconsistent: {}",
                lock.location(),
                e
            ))
        })?;

        Ok(lock)
    }
}
