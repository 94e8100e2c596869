//! Latch: ownership and access control for protectable world objects.
//!
//! Actors claim locks on objects at world locations. The [`LockManager`] is
//! the only authority over those locks: it enforces per-owner quotas and
//! per-owner unique names, keeps access lists consistent under concurrent
//! use, and applies armed [`Interaction`]s when the world reports that an
//! actor touched a location.
//!
//! ```no_run
//! use latch::config::Config;
//! use latch::interaction::{CreateSpec, Interaction};
//! use latch::lock::{ActorId, Location, LockType};
//! use latch::manager::{LockManager, Outcome};
//!
//! # fn main() -> latch::error::Result<()> {
//! let manager = LockManager::new(Config::default())?;
//! let alice = ActorId::from("alice");
//! let chest = Location::new("world", 10, 64, -3);
//!
//! manager.set_interaction_data(Interaction::create(
//!     alice.clone(),
//!     CreateSpec::new(LockType::Private),
//! ));
//! let outcome = manager.on_interact(&alice, &chest, "chest");
//! assert!(matches!(outcome, Outcome::Created(_)));
//!
//! let bob = ActorId::from("bob");
//! assert!(!manager.on_interact(&bob, &chest, "chest").proceeds());
//! # Ok(())
//! # }
//! ```
//!
//! [`LockManager`]: manager::LockManager
//! [`Interaction`]: interaction::Interaction

pub mod cli;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod events;
pub mod exit_codes;
pub mod fs;
pub mod interaction;
pub mod lock;
pub mod manager;
pub mod policy;
pub mod store;

#[cfg(test)]
mod test_support;
