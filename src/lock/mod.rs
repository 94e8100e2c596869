//! Lock data model.
//!
//! A [`Lock`] binds one world [`Location`] to an owner, a [`LockType`], a
//! per-owner unique name, an access list, and (for password types) a salted
//! [`Credential`].
//!
//! # Invariants
//!
//! - A credential is present iff the type is `PasswordAlways` or `PasswordOnce`
//! - Changing the password regenerates the salt and empties the access list
//! - The owner is never on the access list; owner access is implicit

mod credential;
mod model;
mod types;

#[cfg(test)]
mod tests;

pub use credential::{Credential, HASH_LEN, HashParams, SALT_LEN};
pub use model::Lock;
pub use types::{ActorId, Location, LockId, LockType};
