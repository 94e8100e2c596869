//! CLI argument parsing for latch.
//!
//! Uses clap derive macros for declarative argument definitions. [`Cli`] is
//! the `latch` binary; [`SessionLine`] is the grammar of one line of a session
//! script replayed by `latch run`. Implementations live in `commands`.

use crate::lock::{Location, LockType};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

/// Latch: ownership and access control for protectable world objects.
///
/// Locks bind a world location to an owner. Actors arm an operation with a
/// command, then apply it to whatever they click next.
#[derive(Parser, Debug)]
#[command(name = "latch")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Data directory holding config.yaml, locks.json and events.ndjson.
    #[arg(long, global = true, default_value = crate::context::DEFAULT_DATA_DIR)]
    pub data_dir: PathBuf,

    /// Increase log output (-v debug, -vv trace). RUST_LOG overrides this.
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Parse command-line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

/// Available commands for latch.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Initialize the data directory.
    ///
    /// Writes a default config.yaml and an empty lock table. Existing files
    /// are left untouched.
    Init,

    /// List locks, all of them or one owner's.
    List(ListArgs),

    /// Show an owner's lock counts against the configured limits.
    Limits(LimitsArgs),

    /// Show the lock at a location, including its access list.
    Show(ShowArgs),

    /// Delete every lock an owner holds.
    Purge(PurgeArgs),

    /// Delete locks that have not been accessed for a number of days.
    ///
    /// Dry-run by default; pass --yes to delete.
    Clean(CleanArgs),

    /// Replay a session script against the stored locks.
    ///
    /// Each line is `actor: command args...`. `click LOCATION [OBJECT]` is the
    /// world event that applies an armed command; `quit` ends the actor's
    /// session. Lines starting with `#` are comments.
    Run(RunArgs),
}

/// Arguments for the `list` command.
#[derive(Parser, Debug)]
pub struct ListArgs {
    /// Only list locks held by this actor.
    #[arg(long)]
    pub owner: Option<String>,
}

/// Arguments for the `limits` command.
#[derive(Parser, Debug)]
pub struct LimitsArgs {
    /// Actor to report on.
    #[arg(long)]
    pub owner: String,
}

/// Arguments for the `show` command.
#[derive(Parser, Debug)]
pub struct ShowArgs {
    /// Location as `world:x,y,z`.
    pub location: Location,
}

/// Arguments for the `purge` command.
#[derive(Parser, Debug)]
pub struct PurgeArgs {
    /// Actor whose locks are deleted.
    #[arg(long)]
    pub owner: String,
}

/// Arguments for the `clean` command.
#[derive(Parser, Debug)]
pub struct CleanArgs {
    /// Idle threshold in days.
    #[arg(long)]
    pub days: u32,

    /// Actually delete (default is dry-run).
    #[arg(long)]
    pub yes: bool,
}

/// Arguments for the `run` command.
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Script file to replay.
    pub script: PathBuf,

    /// Stop at the first failing line and exit with its error code.
    #[arg(long)]
    pub strict: bool,
}

// ============================================================================
// Session script grammar
// ============================================================================

/// One command issued by an actor inside a session script.
#[derive(Parser, Debug)]
#[command(no_binary_name = true, disable_help_flag = true)]
#[command(disable_help_subcommand = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// Lock the next clicked object for yourself.
    Private(CreateArgs),

    /// Lock the next clicked object with a password.
    Password(PasswordArgs),

    /// Lock the next clicked object as a donation chest.
    Donation(CreateArgs),

    /// Change the next clicked lock.
    Change(ChangeArgs),

    /// Add actors to the next clicked lock.
    Add(MembersArgs),

    /// Remove actors from the next clicked lock.
    Remove(MembersArgs),

    /// Unlock the next clicked lock with a password.
    Unlock(UnlockArgs),

    /// Show the next clicked lock.
    Info(PersistFlag),

    /// Delete the next clicked lock.
    Delete(PersistFlag),

    /// Toggle persistence of the armed command.
    Persist,

    /// Cancel the armed command.
    Stop,

    /// Toggle bypass (admins only).
    Bypass,

    /// Delete all of your locks, or another actor's (admins only).
    Purge {
        owner: Option<String>,
    },

    /// Delete locks idle for a number of days (admins only).
    Clean {
        days: u32,
    },

    /// List your locks, or another actor's (admins only).
    List {
        owner: Option<String>,
    },

    /// Show lock counts against the limits.
    Limits {
        owner: Option<String>,
    },

    /// Inspect or edit the lockable object patterns.
    Lockable {
        #[command(subcommand)]
        action: LockableAction,
    },

    /// World event: interact with the object at a location.
    Click {
        location: Location,
        #[arg(default_value = "chest")]
        object: String,
    },

    /// World event: the object at a location was destroyed.
    Break {
        location: Location,
    },

    /// Whether redstone is blocked at a location.
    Redstone {
        location: Location,
    },

    /// End the actor's session.
    Quit,
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct PersistFlag {
    /// Keep the command armed after each use.
    #[arg(short, long)]
    pub persist: bool,
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct CreateArgs {
    /// Lock name (generated from the object when omitted).
    #[arg(short, long)]
    pub name: Option<String>,

    #[command(flatten)]
    pub persist: PersistFlag,
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct PasswordArgs {
    pub password: String,

    /// Only ask for the password once per actor.
    #[arg(long)]
    pub once: bool,

    #[command(flatten)]
    pub create: CreateArgs,
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct ChangeArgs {
    #[arg(long)]
    pub name: Option<String>,

    #[arg(long = "type")]
    pub lock_type: Option<LockType>,

    #[arg(long)]
    pub password: Option<String>,

    /// Actors to grant access (repeatable or comma separated).
    #[arg(long, value_delimiter = ',')]
    pub add: Vec<String>,

    /// Actors to revoke (repeatable or comma separated).
    #[arg(long, value_delimiter = ',')]
    pub remove: Vec<String>,

    /// Transfer the lock to another actor.
    #[arg(long)]
    pub owner: Option<String>,

    /// Block or allow redstone activation.
    #[arg(long)]
    pub redstone: Option<bool>,

    #[command(flatten)]
    pub persist: PersistFlag,
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct MembersArgs {
    #[arg(required = true, num_args = 1..)]
    pub users: Vec<String>,

    #[command(flatten)]
    pub persist: PersistFlag,
}

#[derive(Parser, Debug, Clone, PartialEq, Eq)]
pub struct UnlockArgs {
    pub password: String,

    #[command(flatten)]
    pub persist: PersistFlag,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum LockableAction {
    /// Allow locking objects matching a glob (admins only).
    Add { pattern: String },
    /// Stop allowing a glob (admins only).
    Remove { pattern: String },
    /// Show the current globs.
    List,
}
