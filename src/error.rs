//! Error types for latch.
//!
//! Every variant is recoverable and carries a user-facing message; the command
//! layer shows it to the actor as a denial.

use crate::exit_codes;
use crate::lock::{ActorId, LockType, Location};
use thiserror::Error;

/// Main error type for latch operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LatchError {
    /// No lock exists at the location.
    #[error("there is no lock at {0}")]
    NotFound(Location),

    /// The actor tried to modify or delete a lock they do not own.
    #[error("you are not the owner of this lock")]
    NotOwner,

    /// The actor is neither the owner nor on the access list.
    #[error("you do not have access to this lock")]
    NoAccess,

    /// The lock needs a password and none was supplied.
    #[error("this lock requires a password, use unlock first")]
    PasswordRequired,

    /// The supplied password did not match.
    #[error("the password is incorrect")]
    WrongPassword,

    /// A lock already protects the location.
    #[error("there is already a lock at {0}")]
    DuplicateLock(Location),

    /// The owner already holds the maximum number of locks.
    #[error("{owner} has reached the limit for {lock_type} locks")]
    QuotaExceeded { owner: ActorId, lock_type: LockType },

    /// The actor lacks the permission a command needs.
    #[error("you are not allowed to {0}")]
    Forbidden(String),

    /// The request does not make sense for the lock as it stands.
    #[error("{0}")]
    InvalidState(String),

    /// The password could not be hashed.
    #[error("password hashing failed: {0}")]
    Credential(String),

    /// The persistent store rejected a read or write.
    #[error("lock store failure: {0}")]
    StoreFailure(String),

    /// Bad configuration or command input.
    #[error("{0}")]
    UserError(String),
}

impl LatchError {
    /// Returns the appropriate exit code for this error type.
    pub fn exit_code(&self) -> i32 {
        match self {
            LatchError::NotFound(_)
            | LatchError::InvalidState(_)
            | LatchError::Credential(_)
            | LatchError::UserError(_) => exit_codes::USER_ERROR,
            LatchError::NotOwner
            | LatchError::NoAccess
            | LatchError::PasswordRequired
            | LatchError::WrongPassword
            | LatchError::Forbidden(_) => exit_codes::ACCESS_DENIED,
            LatchError::DuplicateLock(_) | LatchError::QuotaExceeded { .. } => {
                exit_codes::CONFLICT
            }
            LatchError::StoreFailure(_) => exit_codes::STORE_FAILURE,
        }
    }

    /// True for access policy denials and missing command permissions.
    pub fn is_denial(&self) -> bool {
        self.exit_code() == exit_codes::ACCESS_DENIED
    }
}

/// Result type alias for latch operations.
pub type Result<T> = std::result::Result<T, LatchError>;
