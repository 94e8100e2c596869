//! Exit code constants for the latch CLI.
//!
//! - 0: Success
//! - 1: User error (bad args, invalid state, missing lock)
//! - 2: Access denied (not owner, no access, password problems)
//! - 3: Conflict (duplicate lock, quota exceeded)
//! - 4: Store failure (lock records could not be read or written)

/// Successful execution.
pub const SUCCESS: i32 = 0;

/// User error: bad arguments, invalid state, or no lock at the location.
pub const USER_ERROR: i32 = 1;

/// Access denied by the lock's owner, access list, or password.
pub const ACCESS_DENIED: i32 = 2;

/// Conflict: the location is already locked or the owner is at a limit.
pub const CONFLICT: i32 = 3;

/// Store failure: the persistent lock store is unavailable.
pub const STORE_FAILURE: i32 = 4;
