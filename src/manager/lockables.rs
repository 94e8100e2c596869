//! Which object kinds may be locked.

use crate::error::{LatchError, Result};
use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

/// Glob patterns over object kinds such as `chest` or `minecraft:oak_door`.
///
/// Matching ignores case and any `namespace:` prefix on the object kind.
#[derive(Debug, Clone)]
pub struct Lockables {
    patterns: Vec<String>,
    set: GlobSet,
}

impl Lockables {
    pub fn new(patterns: &[String]) -> Result<Self> {
        let mut lockables = Self {
            patterns: Vec::new(),
            set: GlobSet::empty(),
        };
        for pattern in patterns {
            let pattern = normalize(pattern);
            if !lockables.patterns.contains(&pattern) {
                lockables.patterns.push(pattern);
            }
        }
        lockables.set = build(&lockables.patterns)?;
        Ok(lockables)
    }

    pub fn is_lockable(&self, object: &str) -> bool {
        let object = normalize(object);
        let bare = object.rsplit_once(':').map_or(object.as_str(), |(_, b)| b);
        self.set.is_match(&object) || self.set.is_match(bare)
    }

    /// Returns false when the pattern was already present.
    pub fn add(&mut self, pattern: &str) -> Result<bool> {
        let pattern = normalize(pattern);
        if pattern.is_empty() {
            return Err(LatchError::UserError(
                "lockable pattern must not be empty".to_string(),
            ));
        }
        if self.patterns.contains(&pattern) {
            return Ok(false);
        }

        let mut patterns = self.patterns.clone();
        patterns.push(pattern);
        self.set = build(&patterns)?;
        self.patterns = patterns;
        Ok(true)
    }

    /// Returns false when the pattern was not present.
    pub fn remove(&mut self, pattern: &str) -> Result<bool> {
        let pattern = normalize(pattern);
        let Some(index) = self.patterns.iter().position(|p| *p == pattern) else {
            return Ok(false);
        };

        let mut patterns = self.patterns.clone();
        patterns.remove(index);
        self.set = build(&patterns)?;
        self.patterns = patterns;
        Ok(true)
    }

    pub fn patterns(&self) -> &[String] {
        &self.patterns
    }
}

fn normalize(pattern: &str) -> String {
    pattern.trim().to_ascii_lowercase()
}

fn build(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = GlobBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                LatchError::UserError(format!("invalid lockable pattern '{}': {}", pattern, e))
            })?;
        builder.add(glob);
    }
    builder
        .build()
        .map_err(|e| LatchError::UserError(format!("invalid lockable patterns: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::types::default_lockable_objects;

    #[test]
    fn default_patterns_cover_containers_and_doors() {
        let lockables = Lockables::new(&default_lockable_objects()).unwrap();
        for object in ["chest", "trapped_chest", "minecraft:oak_door", "Furnace", "hopper"] {
            assert!(lockables.is_lockable(object), "{object}");
        }
        for object in ["dirt", "crafting_table", "minecraft:stone"] {
            assert!(!lockables.is_lockable(object), "{object}");
        }
    }

    #[test]
    fn add_and_remove_patterns() {
        let mut lockables = Lockables::new(&["chest".to_string()]).unwrap();
        assert!(!lockables.is_lockable("anvil"));

        assert!(lockables.add("Anvil").unwrap());
        assert!(!lockables.add("anvil").unwrap(), "duplicate add");
        assert!(lockables.is_lockable("anvil"));

        assert!(lockables.remove("anvil").unwrap());
        assert!(!lockables.remove("anvil").unwrap());
        assert!(!lockables.is_lockable("anvil"));
        assert_eq!(lockables.patterns(), ["chest"]);
    }

    #[test]
    fn bad_pattern_leaves_set_unchanged() {
        let mut lockables = Lockables::new(&["chest".to_string()]).unwrap();
        assert!(lockables.add("[oops").is_err());
        assert_eq!(lockables.patterns(), ["chest"]);
        assert!(lockables.add("   ").is_err());
    }
}
