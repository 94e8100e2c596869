//! Tests for config functionality.

use crate::config::types::default_lockable_objects;
use crate::config::{Config, LockLimits, OnceUnlockMode};
use crate::lock::{ActorId, HashParams, LockType};

#[test]
fn test_default_config() {
    let config = Config::default();

    assert_eq!(config.limits.total, Some(64));
    assert_eq!(config.limits.for_type(LockType::Private), Some(24));
    assert_eq!(config.once_unlock, OnceUnlockMode::Session);
    assert!(!config.protect_from_redstone);
    assert_eq!(config.lockable_objects, default_lockable_objects());
    assert!(config.admins.is_empty());
    assert_eq!(config.password_hashing, HashParams::default());
    assert!(config.validate().is_ok());
}

#[test]
fn test_parse_minimal_yaml() {
    let config = Config::from_yaml("").unwrap();

    // Should use all defaults
    assert_eq!(config.limits, LockLimits::default());
    assert_eq!(config.name_pattern, Config::default().name_pattern);
}

#[test]
fn test_parse_partial_yaml() {
    let yaml = r#"
once_unlock: durable
limits:
  private: 1
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.once_unlock, OnceUnlockMode::Durable);
    assert_eq!(config.limits.private, Some(1));

    // Unspecified limits keep their defaults
    assert_eq!(config.limits.total, Some(64));
    assert_eq!(config.limits.donation, Some(24));
}

#[test]
fn test_parse_full_yaml() {
    let yaml = r#"
limits:
  total: null
  private: 3
  password_always: 2
  password_once: 1
  donation: null
name_pattern: "^[a-z]+$"
once_unlock: session
protect_from_redstone: true
lockable_objects:
  - "*chest"
  - furnace
admins:
  - alice
password_hashing:
  memory_kib: 1024
  iterations: 3
  parallelism: 2
"#;
    let config = Config::from_yaml(yaml).unwrap();

    assert_eq!(config.limits.total, None);
    assert_eq!(config.limits.private, Some(3));
    assert_eq!(config.limits.password_always, Some(2));
    assert_eq!(config.limits.password_once, Some(1));
    assert_eq!(config.limits.donation, None);
    assert_eq!(config.name_pattern, "^[a-z]+$");
    assert!(config.protect_from_redstone);
    assert_eq!(config.lockable_objects, vec!["*chest", "furnace"]);
    assert!(config.is_admin(&ActorId::from("alice")));
    assert!(!config.is_admin(&ActorId::from("bob")));
    assert_eq!(config.password_hashing.memory_kib, 1024);
    assert_eq!(config.password_hashing.iterations, 3);
    assert_eq!(config.password_hashing.parallelism, 2);
}

#[test]
fn test_unknown_fields_are_ignored() {
    let yaml = r#"
some_future_setting: 42
limits:
  total: 5
  per_world: 3
"#;
    let config = Config::from_yaml(yaml).unwrap();
    assert_eq!(config.limits.total, Some(5));
}

#[test]
fn test_invalid_once_unlock_mode_fails() {
    let err = Config::from_yaml("once_unlock: forever").unwrap_err();
    assert!(err.to_string().contains("failed to parse config YAML"));
    let config = Config::from_yaml("once_unlock: durable").unwrap();
    assert_eq!(config.once_unlock, OnceUnlockMode::Durable);
}

#[test]
fn test_validate_rejects_bad_name_pattern() {
    let err = Config::from_yaml("name_pattern: \"([a-z\"").unwrap_err();
    assert!(err.to_string().contains("invalid name_pattern"));
}

#[test]
fn test_validate_rejects_bad_lockable_glob() {
    let err = Config::from_yaml("lockable_objects: [\"[chest\"]").unwrap_err();
    assert!(err.to_string().contains("config validation failed"));

    let err = Config::from_yaml("lockable_objects: [\"  \"]").unwrap_err();
    assert!(err.to_string().contains("must be non-empty"));
}

#[test]
fn test_validate_rejects_bad_hashing_params() {
    let yaml = r#"
password_hashing:
  memory_kib: 1
  iterations: 1
  parallelism: 4
"#;
    let err = Config::from_yaml(yaml).unwrap_err();
    assert!(err.to_string().contains("hashing parameters"));
}

#[test]
fn test_yaml_roundtrip_preserves_limits() {
    let mut config = Config::default();
    config.limits = LockLimits::unlimited();
    config.limits.password_once = Some(7);

    let yaml = config.to_yaml().unwrap();
    let parsed = Config::from_yaml(&yaml).unwrap();
    assert_eq!(parsed.limits, config.limits);
}

#[test]
fn test_load_reads_file() {
    let dir = tempfile::TempDir::new().unwrap();
    let path = dir.path().join("config.yaml");
    std::fs::write(&path, "protect_from_redstone: true\n").unwrap();

    let config = Config::load(&path).unwrap();
    assert!(config.protect_from_redstone);
}
