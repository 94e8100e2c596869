//! Implementation of the `latch init` command.
//!
//! Creates the data directory, a default `config.yaml` and an empty
//! `locks.json`. The command is idempotent: files that already exist are
//! left as they are.

use crate::config::Config;
use crate::context::DataContext;
use crate::error::{LatchError, Result};
use crate::fs::atomic_write;
use crate::store::LockStore;

/// Execute the `latch init` command.
pub fn cmd_init(ctx: &DataContext) -> Result<()> {
    std::fs::create_dir_all(&ctx.data_dir).map_err(|e| {
        LatchError::UserError(format!(
            "failed to create data directory '{}': {}",
            ctx.data_dir.display(),
            e
        ))
    })?;

    let config_path = ctx.config_path();
    if config_path.exists() {
        // Refuse to continue on a config that would not load later
        Config::load(&config_path)?;
        println!("Config already present: {}", config_path.display());
    } else {
        let yaml = Config::default().to_yaml()?;
        atomic_write(&config_path, yaml.as_bytes())?;
        println!("Wrote {}", config_path.display());
    }

    let mut store = ctx.store();
    if !store.locks_path().exists() {
        store.save(&[])?;
        println!("Wrote {}", store.locks_path().display());
    }

    println!();
    println!("latch initialized in {}", ctx.data_dir.display());
    Ok(())
}
