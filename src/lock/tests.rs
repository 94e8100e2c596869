//! Tests for the lock data model.

use super::*;
use crate::test_support::{actor, fast_hashing, loc};

fn private_lock() -> Lock {
    Lock::new(actor("alice"), loc(0), "chest", LockType::Private, "Chest1")
}

fn password_lock(password: &str) -> Lock {
    let mut lock = Lock::new(
        actor("alice"),
        loc(0),
        "chest",
        LockType::PasswordAlways,
        "Vault",
    );
    lock.change_password(password, fast_hashing()).unwrap();
    lock
}

#[test]
fn test_location_parse_and_display() {
    let location: Location = "overworld:-12,64,300".parse().unwrap();
    assert_eq!(location, Location::new("overworld", -12, 64, 300));
    assert_eq!(location.to_string(), "overworld:-12,64,300");

    // World names may contain colons; the last one separates coordinates.
    let location: Location = "minecraft:the_end:1,2,3".parse().unwrap();
    assert_eq!(location.world, "minecraft:the_end");
}

#[test]
fn test_location_parse_rejects_garbage() {
    assert!("overworld".parse::<Location>().is_err());
    assert!(":1,2,3".parse::<Location>().is_err());
    assert!("overworld:1,2".parse::<Location>().is_err());
    assert!("overworld:1,two,3".parse::<Location>().is_err());
}

#[test]
fn test_lock_type_parse() {
    assert_eq!("private".parse::<LockType>().unwrap(), LockType::Private);
    assert_eq!(
        "PASSWORD_ONCE".parse::<LockType>().unwrap(),
        LockType::PasswordOnce
    );
    assert_eq!(
        "password-always".parse::<LockType>().unwrap(),
        LockType::PasswordAlways
    );
    assert!("vault".parse::<LockType>().is_err());
}

#[test]
fn test_owner_has_implicit_access() {
    let lock = private_lock();
    assert!(lock.is_owner(&actor("alice")));
    assert!(lock.has_access(&actor("alice")));
    assert!(!lock.has_access(&actor("bob")));
    assert!(lock.access_list().is_empty());
}

#[test]
fn test_grant_and_revoke_access() {
    let mut lock = private_lock();

    assert!(lock.grant_access(&actor("bob")));
    assert!(!lock.grant_access(&actor("bob")), "second grant is a no-op");
    assert!(lock.has_access(&actor("bob")));

    assert!(lock.revoke_access(&actor("bob")));
    assert!(!lock.revoke_access(&actor("bob")));
    assert!(!lock.has_access(&actor("bob")));
}

#[test]
fn test_owner_is_never_added_to_access_list() {
    let mut lock = private_lock();
    assert!(!lock.grant_access(&actor("alice")));
    assert!(lock.access_list().is_empty());
}

#[test]
fn test_donation_lock_admits_everyone() {
    let lock = Lock::new(actor("alice"), loc(0), "chest", LockType::Donation, "Box");
    assert!(lock.has_access(&actor("anyone")));
}

#[test]
fn test_verify_password() {
    let lock = password_lock("abc");
    assert!(lock.verify("abc"));
    assert!(!lock.verify("abd"));
    assert!(!lock.verify(""));
}

#[test]
fn test_lock_without_credential_never_verifies() {
    let lock = private_lock();
    assert!(!lock.verify(""));
    assert!(!lock.verify("abc"));
}

#[test]
fn test_change_password_clears_access_list() {
    let mut lock = password_lock("abc");
    for name in ["bob", "carol", "dave"] {
        lock.grant_access(&actor(name));
    }
    assert_eq!(lock.access_list().len(), 3);

    lock.change_password("xyz", fast_hashing()).unwrap();

    assert!(lock.access_list().is_empty());
    assert!(lock.verify("xyz"));
    assert!(!lock.verify("abc"));
}

#[test]
fn test_change_password_uses_fresh_salt() {
    let first = password_lock("same");
    let second = password_lock("same");

    let a = first.credential().unwrap();
    let b = second.credential().unwrap();
    assert_eq!(a.salt().len(), SALT_LEN);
    assert_eq!(a.hash().len(), HASH_LEN);
    assert_ne!(a.salt(), b.salt());
    assert_ne!(a.hash(), b.hash());

    let mut relocked = first.clone();
    relocked.change_password("same", fast_hashing()).unwrap();
    assert_ne!(relocked.credential().unwrap().salt(), a.salt());
}

#[test]
fn test_change_password_on_private_lock_is_invalid() {
    let mut lock = private_lock();
    let err = lock.change_password("abc", fast_hashing()).unwrap_err();
    assert!(matches!(err, crate::error::LatchError::InvalidState(_)));
    assert!(lock.credential().is_none());
}

#[test]
fn test_switching_to_non_password_type_drops_credential() {
    let mut lock = password_lock("abc");
    lock.set_type(LockType::Private);
    assert!(lock.credential().is_none());
    assert!(lock.check_invariants().is_ok());
}

#[test]
fn test_invariants_detect_missing_credential() {
    let mut lock = private_lock();
    lock.set_type(LockType::PasswordOnce);
    assert!(lock.check_invariants().is_err());
}

#[test]
fn test_set_owner_removes_new_owner_from_access_list() {
    let mut lock = private_lock();
    lock.grant_access(&actor("bob"));
    lock.set_owner(actor("bob"));
    assert!(lock.is_owner(&actor("bob")));
    assert!(lock.access_list().is_empty());
    assert!(lock.check_invariants().is_ok());
}

#[test]
fn test_credential_debug_is_redacted() {
    let lock = password_lock("hunter2");
    let rendered = format!("{:?}", lock.credential().unwrap());
    assert!(rendered.contains("<redacted>"));
}

#[test]
fn test_credential_keeps_its_own_parameters() {
    let lock = password_lock("abc");
    let credential = lock.credential().unwrap();
    let rebuilt = Credential::from_parts(
        credential.salt().to_vec(),
        credential.hash().to_vec(),
        credential.params(),
    );
    assert!(rebuilt.verify("abc"));

    // Same salt and hash under different parameters no longer match.
    let wrong_params = Credential::from_parts(
        credential.salt().to_vec(),
        credential.hash().to_vec(),
        HashParams {
            iterations: credential.params().iterations + 1,
            ..credential.params()
        },
    );
    assert!(!wrong_params.verify("abc"));
}

#[test]
fn test_hash_params_validation() {
    assert!(HashParams::default().validate().is_ok());
    let bad = HashParams {
        memory_kib: 1,
        iterations: 1,
        parallelism: 1,
    };
    assert!(bad.validate().is_err());
}
