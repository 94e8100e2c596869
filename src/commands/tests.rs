//! Tests for the command layer: session scripts and CLI commands.

use super::session::{Session, SessionReport, parse_line};
use super::*;
use crate::cli::SessionCommand;
use crate::config::Config;
use crate::lock::{Location, LockType};
use crate::manager::LockManager;
use crate::test_support::{actor, test_config, test_manager, test_manager_with};
use clap::Parser;
use tempfile::TempDir;

fn run(manager: &LockManager, script: &str) -> (SessionReport, String) {
    let mut session = Session::new(manager, Vec::new());
    let report = session.run(script, false).unwrap();
    let output = String::from_utf8(session.into_output()).unwrap();
    (report, output)
}

fn admin_manager() -> LockManager {
    test_manager_with(Config {
        admins: vec![actor("admin")],
        ..test_config()
    })
}

// =============================================================================
// Session scripts
// =============================================================================

#[test]
fn test_parse_line_splits_actor_and_command() {
    let (who, command) = parse_line("alice: unlock 'two words'").unwrap();
    assert_eq!(who, actor("alice"));
    assert!(matches!(command, SessionCommand::Unlock(args) if args.password == "two words"));

    for bad in ["no colon here", ": private", "two names: private", "alice: fly"] {
        assert!(
            matches!(parse_line(bad), Err(LatchError::UserError(_))),
            "{bad}"
        );
    }
}

#[test]
fn test_create_and_enter_script() {
    let manager = test_manager();
    let (report, output) = run(
        &manager,
        "# Alice locks a chest, Bob is turned away until added
         alice: private --name Stash
         alice: click world:1,64,0 chest
         bob: click world:1,64,0

         alice: add bob
         alice: click world:1,64,0
         bob: click world:1,64,0
        ",
    );

    assert_eq!(report.lines, 6);
    assert_eq!(report.failures, 1);
    assert_eq!(report.first_error, Some(LatchError::NoAccess));
    assert!(output.contains("alice> created private lock 'Stash' at world:1,64,0"));
    assert!(output.contains("bob> error: you do not have access to this lock"));
    assert!(output.contains("bob> opened (member)"));

    let lock = manager.get_lock(&Location::new("world", 1, 64, 0)).unwrap();
    assert!(lock.access_list().contains(&actor("bob")));
}

#[test]
fn test_password_once_script() {
    let manager = test_manager();
    let (report, output) = run(
        &manager,
        "alice: password abc --once
         alice: click world:2,64,0 barrel
         guest: click world:2,64,0
         guest: unlock wrong
         guest: click world:2,64,0
         guest: unlock abc
         guest: click world:2,64,0
         guest: click world:2,64,0
         guest: quit
         guest: click world:2,64,0",
    );

    assert_eq!(report.failures, 3, "{output}");
    assert!(output.contains("guest> error: this lock requires a password"));
    assert!(output.contains("guest> error: the password is incorrect"));
    assert!(output.contains("guest> unlocked 'Barrel1' (password, remembered)"));
    assert!(output.contains("guest> opened (remembered)"));
    assert_eq!(
        manager
            .get_lock(&Location::new("world", 2, 64, 0))
            .unwrap()
            .lock_type(),
        LockType::PasswordOnce
    );
}

#[test]
fn test_persist_and_stop() {
    let manager = test_manager();
    let (report, output) = run(
        &manager,
        "alice: private -p
         alice: click world:1,0,0
         alice: click world:2,0,0
         alice: stop
         alice: click world:3,0,0
         alice: info
         alice: persist
         alice: persist
         alice: persist",
    );

    assert_eq!(manager.lock_count(), 2);
    assert!(output.contains("alice> create armed (persistent), click an object to apply"));
    assert!(output.contains("alice> command cancelled"));
    assert!(output.contains("alice> nothing is locked here"));
    assert!(output.contains("alice> persist on"));
    assert!(output.contains("alice> persist off, command cancelled"));
    assert_eq!(report.failures, 1, "last persist has nothing armed");
}

#[test]
fn test_adding_yourself_is_rejected() {
    let manager = test_manager();
    let (report, _) = run(&manager, "alice: add bob alice");
    assert!(matches!(report.first_error, Some(LatchError::InvalidState(_))));
    assert_eq!(
        manager.interaction_state(&actor("alice")),
        crate::interaction::PendingState::Idle
    );
}

#[test]
fn test_change_script_transfers_and_renames() {
    let manager = test_manager();
    let (report, output) = run(
        &manager,
        "alice: private --name Shed
         alice: click world:1,0,0
         alice: change --owner bob --name Garden --redstone true
         alice: click world:1,0,0
         alice: redstone world:1,0,0
         alice: change
         bob: info
         bob: click world:1,0,0",
    );

    assert_eq!(report.failures, 1, "{output}");
    assert!(output.contains("alice> updated lock 'Garden'"));
    assert!(output.contains("alice> redstone blocked at world:1,0,0"));
    assert!(output.contains("alice> error: change needs at least one option"));
    assert!(output.contains("bob> Owner:      bob"));
    assert!(manager.find_by_name(&actor("bob"), "garden").is_some());
}

#[test]
fn test_admin_commands_are_gated() {
    let manager = admin_manager();
    let (report, output) = run(
        &manager,
        "alice: private
         alice: click world:1,0,0
         bob: bypass
         bob: purge alice
         bob: clean 30
         bob: lockable add anvil
         bob: list alice
         admin: bypass
         admin: click world:1,0,0
         admin: list alice
         admin: lockable add anvil
         admin: bypass
         admin: purge alice",
    );

    assert_eq!(report.failures, 5, "{output}");
    assert!(output.contains("bob> error: you are not allowed to toggle bypass"));
    assert!(output.contains("admin> bypass on"));
    assert!(output.contains("admin> opened (bypass)"));
    assert!(output.contains("admin> anvil is now lockable"));
    assert!(output.contains("admin> purged 1 locks of alice"));
    assert_eq!(manager.lock_count(), 0);
    assert!(manager.is_lockable("anvil"));
}

#[test]
fn test_own_list_limits_and_break() {
    let manager = test_manager();
    let (report, output) = run(
        &manager,
        "alice: donation
         alice: click world:5,0,0 barrel
         alice: list
         alice: limits
         alice: break world:5,0,0
         alice: break world:5,0,0
         alice: lockable list",
    );

    assert_eq!(report.failures, 0, "{output}");
    assert!(output.contains("Barrel1"));
    assert!(output.contains("alice>   donation        1/24"));
    assert!(output.contains("alice> lock 'Barrel1' removed with its object"));
    assert!(output.contains("alice> nothing was locked at world:5,0,0"));
    assert!(output.contains("alice> lockable: *chest"));
}

#[test]
fn test_strict_run_stops_at_first_failure() {
    let manager = test_manager();
    let mut session = Session::new(&manager, Vec::new());
    let err = session
        .run(
            "alice: unlock pw\nalice: click world:1,0,0\nalice: private\n",
            true,
        )
        .unwrap_err();

    assert_eq!(err, LatchError::NotFound(Location::new("world", 1, 0, 0)));
    assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);
    assert_eq!(
        manager.interaction_state(&actor("alice")),
        crate::interaction::PendingState::Idle,
        "private was never armed"
    );
}

#[test]
fn test_bad_lines_are_reported_with_line_number() {
    let manager = test_manager();
    let (report, output) = run(&manager, "\n\nalice: teleport home\n");
    assert_eq!(report.failures, 1);
    assert!(output.starts_with("line 3: "), "{output}");
}

// =============================================================================
// CLI commands
// =============================================================================

fn cli(dir: &TempDir, args: &[&str]) -> Cli {
    let data_dir = dir.path().to_str().unwrap();
    let mut argv = vec!["latch", "--data-dir", data_dir];
    argv.extend_from_slice(args);
    Cli::try_parse_from(argv).unwrap()
}

#[test]
fn test_init_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = DataContext::new(temp_dir.path());

    dispatch(cli(&temp_dir, &["init"])).unwrap();
    assert!(ctx.config_path().exists());
    assert!(ctx.store().locks_path().exists());

    std::fs::write(ctx.config_path(), "admins: [root]\n").unwrap();
    dispatch(cli(&temp_dir, &["init"])).unwrap();
    assert_eq!(ctx.load_config().unwrap().admins, vec![actor("root")]);
}

#[test]
fn test_init_refuses_broken_config() {
    let temp_dir = TempDir::new().unwrap();
    let ctx = DataContext::new(temp_dir.path());
    std::fs::write(ctx.config_path(), "once_unlock: forever\n").unwrap();

    let err = dispatch(cli(&temp_dir, &["init"])).unwrap_err();
    assert!(matches!(err, LatchError::UserError(_)));
}

#[test]
fn test_commands_need_init() {
    let temp_dir = TempDir::new().unwrap();
    let err = dispatch(cli(&temp_dir, &["list"])).unwrap_err();
    assert!(err.to_string().contains("latch init"));
    assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);
}

#[test]
fn test_run_persists_locks_between_invocations() {
    let temp_dir = TempDir::new().unwrap();
    dispatch(cli(&temp_dir, &["init"])).unwrap();

    let script = temp_dir.path().join("session.txt");
    std::fs::write(
        &script,
        "alice: private --name Stash\nalice: click world:1,64,0\n",
    )
    .unwrap();
    dispatch(cli(&temp_dir, &["run", script.to_str().unwrap()])).unwrap();

    let manager = DataContext::new(temp_dir.path()).open_manager().unwrap();
    let lock = manager.find_by_name(&actor("alice"), "stash").unwrap();
    assert_eq!(lock.location(), &Location::new("world", 1, 64, 0));

    dispatch(cli(&temp_dir, &["show", "world:1,64,0"])).unwrap();
    let err = dispatch(cli(&temp_dir, &["show", "world:9,9,9"])).unwrap_err();
    assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);

    let events = std::fs::read_to_string(temp_dir.path().join("events.ndjson")).unwrap();
    assert!(events.contains("\"action\":\"create\""));
}

#[test]
fn test_strict_run_maps_denial_to_exit_code() {
    let temp_dir = TempDir::new().unwrap();
    dispatch(cli(&temp_dir, &["init"])).unwrap();

    let script = temp_dir.path().join("session.txt");
    std::fs::write(
        &script,
        "alice: private\nalice: click world:1,0,0\nbob: click world:1,0,0\n",
    )
    .unwrap();

    let err = dispatch(cli(&temp_dir, &["run", "--strict", script.to_str().unwrap()]))
        .unwrap_err();
    assert_eq!(err, LatchError::NoAccess);
    assert_eq!(err.exit_code(), crate::exit_codes::ACCESS_DENIED);
}

#[test]
fn test_clean_is_dry_run_without_yes() {
    let temp_dir = TempDir::new().unwrap();
    dispatch(cli(&temp_dir, &["init"])).unwrap();

    let script = temp_dir.path().join("session.txt");
    std::fs::write(&script, "alice: private\nalice: click world:1,0,0\n").unwrap();
    dispatch(cli(&temp_dir, &["run", script.to_str().unwrap()])).unwrap();

    // Every lock is older than zero days
    std::thread::sleep(std::time::Duration::from_millis(5));
    dispatch(cli(&temp_dir, &["clean", "--days", "0"])).unwrap();
    let ctx = DataContext::new(temp_dir.path());
    assert_eq!(ctx.open_manager().unwrap().lock_count(), 1);

    dispatch(cli(&temp_dir, &["clean", "--days", "0", "--yes"])).unwrap();
    assert_eq!(ctx.open_manager().unwrap().lock_count(), 0);
}

#[test]
fn test_purge_and_limits_commands() {
    let temp_dir = TempDir::new().unwrap();
    dispatch(cli(&temp_dir, &["init"])).unwrap();

    let script = temp_dir.path().join("session.txt");
    std::fs::write(
        &script,
        "alice: private\nalice: click world:1,0,0\nbob: private\nbob: click world:2,0,0\n",
    )
    .unwrap();
    dispatch(cli(&temp_dir, &["run", script.to_str().unwrap()])).unwrap();

    dispatch(cli(&temp_dir, &["limits", "--owner", "alice"])).unwrap();
    dispatch(cli(&temp_dir, &["list", "--owner", "alice"])).unwrap();
    dispatch(cli(&temp_dir, &["purge", "--owner", "alice"])).unwrap();

    let manager = DataContext::new(temp_dir.path()).open_manager().unwrap();
    assert!(manager.list_locks(Some(&actor("alice"))).is_empty());
    assert_eq!(manager.list_locks(None).len(), 1);
}
