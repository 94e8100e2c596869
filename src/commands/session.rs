//! Session scripts.
//!
//! A script stands in for the chat and world layers: every line is one actor
//! typing a command or touching the world.
//!
//! ```text
//! # comments and blank lines are skipped
//! alice: private --name Stash
//! alice: click world:10,64,-3 chest
//! bob: click world:10,64,-3
//! alice: quit
//! ```
//!
//! Each line's output is prefixed with the actor. A failing line is reported
//! and the script carries on, unless running strict.

use super::display::{limit_lines, lock_line, outcome_lines};
use crate::cli::{ChangeArgs, LockableAction, SessionCommand, SessionLine};
use crate::error::{LatchError, Result};
use crate::interaction::{CreateSpec, Interaction, LockChange, Password};
use crate::lock::{ActorId, LockType};
use crate::manager::{LockManager, Outcome};
use clap::Parser;
use std::io::Write;

/// Totals for one script run.
#[derive(Debug, Default)]
pub struct SessionReport {
    /// Non-comment lines executed.
    pub lines: usize,
    pub failures: usize,
    pub first_error: Option<LatchError>,
}

/// Split `actor: command args...` into the actor and its parsed command.
pub fn parse_line(line: &str) -> Result<(ActorId, SessionCommand)> {
    let (actor, rest) = line.split_once(':').ok_or_else(|| {
        LatchError::UserError(format!("expected 'actor: command', got '{}'", line))
    })?;
    let actor = actor.trim();
    if actor.is_empty() || actor.contains(char::is_whitespace) {
        return Err(LatchError::UserError(format!(
            "invalid actor name '{}'",
            actor
        )));
    }

    let words = shell_words::split(rest).map_err(|e| {
        LatchError::UserError(format!("cannot split '{}': {}", rest.trim(), e))
    })?;
    let parsed = SessionLine::try_parse_from(words).map_err(|e| {
        let message = e.to_string();
        let first = message.lines().next().unwrap_or_default();
        LatchError::UserError(first.trim_start_matches("error: ").to_string())
    })?;

    Ok((ActorId::from(actor), parsed.command))
}

/// Runs script lines against one manager, writing to `out`.
pub struct Session<'a, W: Write> {
    manager: &'a LockManager,
    out: W,
}

impl<'a, W: Write> Session<'a, W> {
    pub fn new(manager: &'a LockManager, out: W) -> Self {
        Self { manager, out }
    }

    pub fn into_output(self) -> W {
        self.out
    }

    /// Run every line of `script`.
    ///
    /// With `strict` the first failing line aborts the run with its error.
    pub fn run(&mut self, script: &str, strict: bool) -> Result<SessionReport> {
        let mut report = SessionReport::default();

        for (index, raw) in script.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            report.lines += 1;

            let err = match parse_line(line) {
                Ok((actor, command)) => match self.execute(&actor, command) {
                    Ok(()) => continue,
                    Err(err) => {
                        self.say(&actor, &format!("error: {}", err))?;
                        err
                    }
                },
                Err(err) => {
                    self.write_line(&format!("line {}: {}", index + 1, err))?;
                    err
                }
            };

            report.failures += 1;
            tracing::debug!(line = index + 1, error = %err, "session line failed");
            if strict {
                return Err(err);
            }
            report.first_error.get_or_insert(err);
        }

        Ok(report)
    }

    /// Execute one command for `actor`.
    pub fn execute(&mut self, actor: &ActorId, command: SessionCommand) -> Result<()> {
        let manager = self.manager;
        match command {
            SessionCommand::Private(args) => {
                let spec = create_spec(LockType::Private, args.name);
                self.arm(Interaction::create(actor.clone(), spec).persisting(args.persist.persist))
            }
            SessionCommand::Password(args) => {
                let lock_type = if args.once {
                    LockType::PasswordOnce
                } else {
                    LockType::PasswordAlways
                };
                let spec = create_spec(lock_type, args.create.name).with_password(args.password);
                self.arm(
                    Interaction::create(actor.clone(), spec)
                        .persisting(args.create.persist.persist),
                )
            }
            SessionCommand::Donation(args) => {
                let spec = create_spec(LockType::Donation, args.name);
                self.arm(Interaction::create(actor.clone(), spec).persisting(args.persist.persist))
            }
            SessionCommand::Change(args) => {
                let persist = args.persist.persist;
                let change = lock_change(args);
                if change.is_empty() {
                    return Err(LatchError::UserError(
                        "change needs at least one option".to_string(),
                    ));
                }
                self.arm(Interaction::change(actor.clone(), change).persisting(persist))
            }
            SessionCommand::Add(args) => {
                let members = actors(args.users);
                if members.contains(actor) {
                    return Err(LatchError::InvalidState(
                        "you cannot add yourself to your own lock".to_string(),
                    ));
                }
                let change = LockChange {
                    members_to_add: members,
                    ..LockChange::default()
                };
                self.arm(Interaction::change(actor.clone(), change).persisting(args.persist.persist))
            }
            SessionCommand::Remove(args) => {
                let change = LockChange {
                    members_to_remove: actors(args.users),
                    ..LockChange::default()
                };
                self.arm(Interaction::change(actor.clone(), change).persisting(args.persist.persist))
            }
            SessionCommand::Unlock(args) => self.arm(
                Interaction::unlock(actor.clone(), args.password).persisting(args.persist.persist),
            ),
            SessionCommand::Info(flag) => {
                self.arm(Interaction::display(actor.clone()).persisting(flag.persist))
            }
            SessionCommand::Delete(flag) => {
                self.arm(Interaction::delete(actor.clone()).persisting(flag.persist))
            }
            SessionCommand::Persist => match manager.toggle_persist(actor) {
                Some(true) => self.say(actor, "persist on"),
                Some(false) => self.say(actor, "persist off, command cancelled"),
                None => Err(LatchError::InvalidState(
                    "no command is armed".to_string(),
                )),
            },
            SessionCommand::Stop => {
                if manager.clear_interaction_data(actor) {
                    self.say(actor, "command cancelled")
                } else {
                    self.say(actor, "nothing to cancel")
                }
            }
            SessionCommand::Bypass => {
                self.require_admin(actor, "toggle bypass")?;
                if manager.toggle_bypass(actor) {
                    self.say(actor, "bypass on")
                } else {
                    self.say(actor, "bypass off")
                }
            }
            SessionCommand::Purge { owner } => {
                let owner = self.target(actor, owner, "purge another actor's locks")?;
                let removed = manager.purge(&owner)?;
                self.say(actor, &format!("purged {} locks of {}", removed.len(), owner))
            }
            SessionCommand::Clean { days } => {
                self.require_admin(actor, "clean locks")?;
                let removed = manager.clean_older_than(days)?;
                self.say(
                    actor,
                    &format!(
                        "cleaned {} locks idle for more than {} days",
                        removed.len(),
                        days
                    ),
                )
            }
            SessionCommand::List { owner } => {
                let owner = self.target(actor, owner, "list another actor's locks")?;
                let locks = manager.list_locks(Some(&owner));
                if locks.is_empty() {
                    return self.say(actor, &format!("{} has no locks", owner));
                }
                for lock in &locks {
                    self.say(actor, &lock_line(lock))?;
                }
                Ok(())
            }
            SessionCommand::Limits { owner } => {
                let owner = self.target(actor, owner, "see another actor's limits")?;
                for line in limit_lines(&manager.limits(&owner)) {
                    self.say(actor, &line)?;
                }
                Ok(())
            }
            SessionCommand::Lockable { action } => match action {
                LockableAction::Add { pattern } => {
                    self.require_admin(actor, "change lockable objects")?;
                    let added = manager.add_lockable(&pattern)?;
                    self.say(
                        actor,
                        &format!(
                            "{} {}",
                            pattern,
                            if added { "is now lockable" } else { "was already lockable" }
                        ),
                    )
                }
                LockableAction::Remove { pattern } => {
                    self.require_admin(actor, "change lockable objects")?;
                    let removed = manager.remove_lockable(&pattern)?;
                    self.say(
                        actor,
                        &format!(
                            "{} {}",
                            pattern,
                            if removed { "is no longer lockable" } else { "was not listed" }
                        ),
                    )
                }
                LockableAction::List => {
                    let patterns = manager.lockables().join(", ");
                    self.say(actor, &format!("lockable: {}", patterns))
                }
            },
            SessionCommand::Click { location, object } => {
                let outcome = manager.on_interact(actor, &location, &object);
                if let Outcome::Denied(err) = outcome {
                    return Err(err);
                }
                for line in outcome_lines(&outcome) {
                    self.say(actor, &line)?;
                }
                Ok(())
            }
            SessionCommand::Break { location } => match manager.on_object_removed(&location)? {
                Some(lock) => self.say(
                    actor,
                    &format!("lock '{}' removed with its object", lock.name()),
                ),
                None => self.say(actor, &format!("nothing was locked at {}", location)),
            },
            SessionCommand::Redstone { location } => {
                let state = if manager.blocks_redstone(&location) {
                    "blocked"
                } else {
                    "allowed"
                };
                self.say(actor, &format!("redstone {} at {}", state, location))
            }
            SessionCommand::Quit => {
                manager.on_disconnect(actor);
                self.say(actor, "session ended")
            }
        }
    }

    fn arm(&mut self, interaction: Interaction) -> Result<()> {
        let actor = interaction.actor.clone();
        let message = format!(
            "{} armed{}, click an object to apply",
            interaction.kind.label(),
            if interaction.persist { " (persistent)" } else { "" }
        );
        self.manager.set_interaction_data(interaction);
        self.say(&actor, &message)
    }

    fn require_admin(&self, actor: &ActorId, what: &str) -> Result<()> {
        if self.manager.config().is_admin(actor) {
            Ok(())
        } else {
            Err(LatchError::Forbidden(what.to_string()))
        }
    }

    /// The actor named by an optional argument, defaulting to the caller.
    /// Naming someone else needs admin rights.
    fn target(&self, actor: &ActorId, owner: Option<String>, what: &str) -> Result<ActorId> {
        match owner.map(ActorId::from) {
            Some(owner) if &owner != actor => {
                self.require_admin(actor, what)?;
                Ok(owner)
            }
            _ => Ok(actor.clone()),
        }
    }

    fn say(&mut self, actor: &ActorId, text: &str) -> Result<()> {
        self.write_line(&format!("{}> {}", actor, text))
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.out, "{}", line)
            .map_err(|e| LatchError::UserError(format!("failed to write output: {}", e)))
    }
}

fn create_spec(lock_type: LockType, name: Option<String>) -> CreateSpec {
    let spec = CreateSpec::new(lock_type);
    match name {
        Some(name) => spec.with_name(name),
        None => spec,
    }
}

fn actors(names: Vec<String>) -> Vec<ActorId> {
    names.into_iter().map(ActorId::from).collect()
}

fn lock_change(args: ChangeArgs) -> LockChange {
    LockChange {
        lock_type: args.lock_type,
        password: args.password.map(Password::new),
        name: args.name,
        owner: args.owner.map(ActorId::from),
        members_to_add: actors(args.add),
        members_to_remove: actors(args.remove),
        protect_from_redstone: args.redstone,
    }
}
