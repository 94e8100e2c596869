//! Config loading, validation, and utility operations.

use super::model::Config;
use crate::error::{LatchError, Result};
use crate::lock::ActorId;
use crate::manager::Lockables;
use regex::Regex;
use std::path::Path;

impl Config {
    /// Load config from a YAML file.
    ///
    /// Unknown fields in the YAML are silently ignored for forward compatibility.
    ///
    /// # Returns
    ///
    /// * `Ok(Config)` - Successfully loaded and validated config
    /// * `Err(LatchError::UserError)` - Read error, parse error or validation failure
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path).map_err(|e| {
            LatchError::UserError(format!(
                "failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        Self::from_yaml(&content)
    }

    /// Parse config from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(yaml)
            .map_err(|e| LatchError::UserError(format!("failed to parse config YAML: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    /// Serialize config to YAML string.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| {
            LatchError::UserError(format!("failed to serialize config to YAML: {}", e))
        })
    }

    /// Validate config values and return error on invalid values.
    ///
    /// Validation rules:
    /// - `name_pattern` must be a valid regex
    /// - `lockable_objects` entries must be non-empty valid globs
    /// - `password_hashing` must be accepted by Argon2
    pub fn validate(&self) -> Result<()> {
        self.name_regex()?;

        if self.lockable_objects.iter().any(|p| p.trim().is_empty()) {
            return Err(LatchError::UserError(
                "config validation failed: lockable_objects entries must be non-empty".to_string(),
            ));
        }
        Lockables::new(&self.lockable_objects).map_err(|e| {
            LatchError::UserError(format!("config validation failed: {}", e))
        })?;

        self.password_hashing.validate().map_err(|e| {
            LatchError::UserError(format!("config validation failed: {}", e))
        })?;

        Ok(())
    }

    /// Compile `name_pattern`.
    pub fn name_regex(&self) -> Result<Regex> {
        Regex::new(&self.name_pattern).map_err(|e| {
            LatchError::UserError(format!(
                "config validation failed: invalid name_pattern '{}': {}",
                self.name_pattern, e
            ))
        })
    }

    pub fn is_admin(&self, actor: &ActorId) -> bool {
        self.admins.contains(actor)
    }
}
