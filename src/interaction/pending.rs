//! Per-actor pending interaction table.

use super::types::Interaction;
use crate::lock::ActorId;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Observable state of one actor's entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PendingState {
    Idle,
    Armed(Interaction),
}

/// `Idle | Armed(Interaction)` per actor.
///
/// Entries are independent; no operation touches more than one actor.
#[derive(Debug, Default)]
pub struct PendingInteractions {
    armed: Mutex<HashMap<ActorId, Interaction>>,
}

impl PendingInteractions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Arm `interaction` for its actor, returning whatever it replaced.
    pub fn arm(&self, interaction: Interaction) -> Option<Interaction> {
        self.armed
            .lock()
            .insert(interaction.actor.clone(), interaction)
    }

    /// Take the armed interaction for an event.
    ///
    /// A persisting interaction stays armed and a copy is returned.
    pub fn consume(&self, actor: &ActorId) -> Option<Interaction> {
        let mut armed = self.armed.lock();
        if armed.get(actor)?.persist {
            armed.get(actor).cloned()
        } else {
            armed.remove(actor)
        }
    }

    pub fn clear(&self, actor: &ActorId) -> bool {
        self.armed.lock().remove(actor).is_some()
    }

    /// Flip persistence for the armed interaction.
    ///
    /// Turning persistence off also disarms, so a second toggle stops the
    /// repetition. Returns the new persistence flag, or `None` when idle.
    pub fn toggle_persist(&self, actor: &ActorId) -> Option<bool> {
        let mut armed = self.armed.lock();
        let interaction = armed.get_mut(actor)?;
        if interaction.persist {
            armed.remove(actor);
            Some(false)
        } else {
            interaction.persist = true;
            Some(true)
        }
    }

    pub fn state(&self, actor: &ActorId) -> PendingState {
        match self.armed.lock().get(actor) {
            Some(interaction) => PendingState::Armed(interaction.clone()),
            None => PendingState::Idle,
        }
    }

    pub fn armed_count(&self) -> usize {
        self.armed.lock().len()
    }
}
