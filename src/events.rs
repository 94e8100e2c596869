//! Audit events for lock mutations.
//!
//! Every mutation that reaches the store is also recorded as an [`Event`] and
//! handed to [`LockStore::append_event`](crate::store::LockStore::append_event).
//! The file store appends them to `events.ndjson` (one JSON object per line).
//!
//! # Event Format
//!
//! - `ts`: RFC3339 timestamp
//! - `action`: what happened (create, change, delete, purge, ...)
//! - `actor`: the actor responsible, absent for sweeps and world removals
//! - `host`: the machine that applied the change
//! - `location`: the lock's location, absent for batch operations
//! - `details`: freeform object with action-specific details

use crate::error::{LatchError, Result};
use crate::lock::{ActorId, Location};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::OnceLock;

/// Actions that can be logged as events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// Lock created
    Create,
    /// Type, password, name, owner or flags changed
    Change,
    /// Access list changed outside a change request
    Access,
    /// Lock deleted by an actor
    Delete,
    /// Protected object disappeared from the world
    Remove,
    /// All locks of an owner deleted
    Purge,
    /// Locks idle past the threshold deleted
    Clean,
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EventAction::Create => "create",
            EventAction::Change => "change",
            EventAction::Access => "access",
            EventAction::Delete => "delete",
            EventAction::Remove => "remove",
            EventAction::Purge => "purge",
            EventAction::Clean => "clean",
        };
        f.write_str(name)
    }
}

/// An event record for the audit log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    pub ts: DateTime<Utc>,

    pub action: EventAction,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub actor: Option<ActorId>,

    pub host: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    pub details: Value,
}

impl Event {
    /// Create a new event stamped with the current time and host.
    pub fn new(action: EventAction) -> Self {
        Self {
            ts: Utc::now(),
            action,
            actor: None,
            host: host_string().to_string(),
            location: None,
            details: Value::Object(serde_json::Map::new()),
        }
    }

    pub fn with_actor(mut self, actor: &ActorId) -> Self {
        self.actor = Some(actor.clone());
        self
    }

    pub fn with_location(mut self, location: &Location) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = details;
        self
    }

    /// Serialize the event to a single-line JSON string.
    pub fn to_ndjson_line(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            LatchError::StoreFailure(format!("failed to serialize event to JSON: {}", e))
        })
    }
}

fn host_string() -> &'static str {
    static HOST: OnceLock<String> = OnceLock::new();
    HOST.get_or_init(|| {
        hostname::get()
            .map(|h| h.to_string_lossy().to_string())
            .unwrap_or_else(|_| "unknown".to_string())
    })
}
