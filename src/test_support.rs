use crate::config::Config;
use crate::lock::{ActorId, HashParams, Location};
use crate::manager::LockManager;

pub(crate) fn actor(name: &str) -> ActorId {
    ActorId::from(name)
}

/// Distinct locations along the x axis of a test world.
pub(crate) fn loc(x: i64) -> Location {
    Location::new("world", x, 64, 0)
}

/// Argon2 parameters cheap enough for unit tests.
pub(crate) fn fast_hashing() -> HashParams {
    HashParams {
        memory_kib: 64,
        iterations: 1,
        parallelism: 1,
    }
}

pub(crate) fn test_config() -> Config {
    Config {
        password_hashing: fast_hashing(),
        ..Config::default()
    }
}

pub(crate) fn test_manager() -> LockManager {
    test_manager_with(test_config())
}

pub(crate) fn test_manager_with(config: Config) -> LockManager {
    // The default lockable patterns and name pattern always compile.
    LockManager::new(config).unwrap()
}
