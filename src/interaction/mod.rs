//! Pending interactions.
//!
//! A command arms an [`Interaction`] for an actor; the next world event from
//! that actor consumes it and applies it to the targeted lock. Persisting
//! interactions are re-armed after each use until the actor stops them.
//!
//! # States
//!
//! ```text
//!   Idle --arm--> Armed(i)
//!   Armed(i) --event, !persist--> Idle
//!   Armed(i) --event, persist--> Armed(i)
//!   Armed(i) --stop / disconnect--> Idle
//! ```

mod pending;
mod types;


pub use pending::{PendingInteractions, PendingState};
pub use types::{CreateSpec, Interaction, InteractionKind, LockChange, Password};
