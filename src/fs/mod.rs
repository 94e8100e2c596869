//! Filesystem utilities for latch.
//!
//! Atomic whole-file writes for the lock file and synced appends for the
//! audit log.

pub mod atomic;

pub use atomic::{append_line, atomic_write};
