//! Command implementations for latch.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations. Every command except `init` needs an initialized data
//! directory.

mod display;
mod init;
pub mod session;

#[cfg(test)]
mod tests;

use crate::cli::{CleanArgs, Cli, Command, LimitsArgs, ListArgs, PurgeArgs, RunArgs, ShowArgs};
use crate::context::DataContext;
use crate::error::{LatchError, Result};
use crate::lock::ActorId;
use crate::manager::LockView;
use display::{limit_lines, lock_line, view_lines};
use session::Session;

/// Dispatch a command to its implementation.
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = DataContext::new(cli.data_dir);
    match cli.command {
        Command::Init => init::cmd_init(&ctx),
        Command::List(args) => cmd_list(&ctx, args),
        Command::Limits(args) => cmd_limits(&ctx, args),
        Command::Show(args) => cmd_show(&ctx, args),
        Command::Purge(args) => cmd_purge(&ctx, args),
        Command::Clean(args) => cmd_clean(&ctx, args),
        Command::Run(args) => cmd_run(&ctx, args),
    }
}

fn cmd_list(ctx: &DataContext, args: ListArgs) -> Result<()> {
    let manager = ctx.open_manager()?;
    let owner = args.owner.map(ActorId::from);
    let locks = manager.list_locks(owner.as_ref());

    if locks.is_empty() {
        println!("No locks.");
        return Ok(());
    }
    for lock in &locks {
        println!("{}", lock_line(lock));
    }
    println!();
    println!("{} lock(s)", locks.len());
    Ok(())
}

fn cmd_limits(ctx: &DataContext, args: LimitsArgs) -> Result<()> {
    let manager = ctx.open_manager()?;
    for line in limit_lines(&manager.limits(&ActorId::from(args.owner))) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_show(ctx: &DataContext, args: ShowArgs) -> Result<()> {
    let manager = ctx.open_manager()?;
    let lock = manager
        .get_lock(&args.location)
        .ok_or_else(|| LatchError::NotFound(args.location.clone()))?;

    for line in view_lines(&LockView::of(&lock, true)) {
        println!("{}", line);
    }
    Ok(())
}

fn cmd_purge(ctx: &DataContext, args: PurgeArgs) -> Result<()> {
    let manager = ctx.open_manager()?;
    let owner = ActorId::from(args.owner);
    let removed = manager.purge(&owner)?;
    println!("Purged {} lock(s) of {}.", removed.len(), owner);
    Ok(())
}

/// Dry-run unless `--yes`.
fn cmd_clean(ctx: &DataContext, args: CleanArgs) -> Result<()> {
    let manager = ctx.open_manager()?;

    if !args.yes {
        let stale = manager.stale_locks(args.days);
        if stale.is_empty() {
            println!("No locks idle for more than {} days.", args.days);
            return Ok(());
        }
        println!(
            "Would remove {} lock(s) idle for more than {} days:",
            stale.len(),
            args.days
        );
        for lock in &stale {
            println!("  {}", lock_line(lock));
        }
        println!();
        println!("Run with --yes to remove them.");
        return Ok(());
    }

    let removed = manager.clean_older_than(args.days)?;
    println!("Removed {} lock(s).", removed.len());
    Ok(())
}

fn cmd_run(ctx: &DataContext, args: RunArgs) -> Result<()> {
    let manager = ctx.open_manager()?;
    let script = std::fs::read_to_string(&args.script).map_err(|e| {
        LatchError::UserError(format!(
            "failed to read script '{}': {}",
            args.script.display(),
            e
        ))
    })?;

    let stdout = std::io::stdout();
    let mut session = Session::new(&manager, stdout.lock());
    let report = session.run(&script, args.strict)?;

    println!();
    println!(
        "{} line(s), {} failed, {} lock(s) stored",
        report.lines,
        report.failures,
        manager.lock_count()
    );
    Ok(())
}
