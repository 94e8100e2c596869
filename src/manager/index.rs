//! The lock arena and its secondary indices.
//!
//! Locks live in one map keyed by [`LockId`]; the location, owner and
//! (owner, name) maps point into it. Every method keeps all four in step, so
//! callers holding the table's write guard never observe a partial update.

use crate::lock::{ActorId, Location, Lock, LockId, LockType};
use std::collections::{BTreeSet, HashMap};

/// Case-insensitive lookup key for a lock name.
pub(crate) fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Turn an object kind like `minecraft:trapped_chest` into a name stem.
pub(crate) fn name_stem(object: &str) -> String {
    let bare = object.rsplit_once(':').map_or(object, |(_, b)| b);
    let mut stem = String::new();
    let mut upper = true;

    for c in bare.chars() {
        if c.is_ascii_alphanumeric() {
            if upper {
                stem.push(c.to_ascii_uppercase());
            } else {
                stem.push(c.to_ascii_lowercase());
            }
            upper = false;
        } else {
            upper = true;
        }
    }

    if stem.len() > 24 {
        stem.truncate(24);
    }
    if stem.is_empty() {
        stem = "Lock".to_string();
    }
    stem
}

#[derive(Debug, Default)]
pub(crate) struct LockTable {
    next_id: u64,
    locks: HashMap<LockId, Lock>,
    by_location: HashMap<Location, LockId>,
    by_owner: HashMap<ActorId, BTreeSet<LockId>>,
    by_name: HashMap<(ActorId, String), LockId>,
}

impl LockTable {
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn get(&self, id: LockId) -> Option<&Lock> {
        self.locks.get(&id)
    }

    pub fn id_at(&self, location: &Location) -> Option<LockId> {
        self.by_location.get(location).copied()
    }

    pub fn lock_at(&self, location: &Location) -> Option<&Lock> {
        self.id_at(location).and_then(|id| self.locks.get(&id))
    }

    pub fn id_by_name(&self, owner: &ActorId, name: &str) -> Option<LockId> {
        self.by_name
            .get(&(owner.clone(), name_key(name)))
            .copied()
    }

    pub fn owned_ids(&self, owner: &ActorId) -> Vec<LockId> {
        self.by_owner
            .get(owner)
            .map(|ids| ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn owned_by(&self, owner: &ActorId) -> impl Iterator<Item = &Lock> {
        self.by_owner
            .get(owner)
            .into_iter()
            .flatten()
            .filter_map(|id| self.locks.get(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = (LockId, &Lock)> {
        self.locks.iter().map(|(id, lock)| (*id, lock))
    }

    /// Number of locks `owner` holds, optionally of one type, optionally
    /// ignoring one lock.
    pub fn count_owned(
        &self,
        owner: &ActorId,
        lock_type: Option<LockType>,
        exclude: Option<LockId>,
    ) -> u32 {
        let Some(ids) = self.by_owner.get(owner) else {
            return 0;
        };
        let count = ids
            .iter()
            .filter(|id| Some(**id) != exclude)
            .filter_map(|id| self.locks.get(id))
            .filter(|lock| lock_type.is_none_or(|t| lock.lock_type() == t))
            .count();
        u32::try_from(count).unwrap_or(u32::MAX)
    }

    /// True when no lock of `owner` other than `exclude` uses `name`.
    pub fn is_unique_name(&self, owner: &ActorId, name: &str, exclude: Option<LockId>) -> bool {
        match self.id_by_name(owner, name) {
            None => true,
            Some(id) => Some(id) == exclude,
        }
    }

    /// `name` itself when free, otherwise `name_2`, `name_3`, ...
    pub fn unique_name(&self, owner: &ActorId, name: &str, exclude: Option<LockId>) -> String {
        let name = name.trim();
        if self.is_unique_name(owner, name, exclude) {
            return name.to_string();
        }
        (2u32..)
            .map(|n| format!("{}_{}", name, n))
            .find(|candidate| self.is_unique_name(owner, candidate, exclude))
            .unwrap_or_else(|| name.to_string())
    }

    /// The first free `{Stem}{n}` for the owner, counting from 1.
    pub fn generate_name(&self, owner: &ActorId, object: &str) -> String {
        let stem = name_stem(object);
        (1u32..)
            .map(|n| format!("{}{}", stem, n))
            .find(|candidate| self.is_unique_name(owner, candidate, None))
            .unwrap_or(stem)
    }

    /// Add a lock whose location and name are already known to be free.
    pub fn insert(&mut self, lock: Lock) -> LockId {
        let id = LockId(self.next_id);
        self.next_id += 1;

        debug_assert!(!self.by_location.contains_key(lock.location()));
        debug_assert!(self.is_unique_name(lock.owner(), lock.name(), None));

        self.index(id, &lock);
        self.locks.insert(id, lock);
        id
    }

    pub fn remove(&mut self, id: LockId) -> Option<Lock> {
        let lock = self.locks.remove(&id)?;
        self.unindex(id, &lock);
        Some(lock)
    }

    /// Swap in a new version of lock `id`.
    ///
    /// The owner and name indices are only rebuilt when one of them changed;
    /// the location never changes.
    pub fn replace(&mut self, id: LockId, lock: Lock) -> Option<Lock> {
        let old = self.locks.get(&id)?;
        debug_assert_eq!(old.location(), lock.location());

        let reindex = old.owner() != lock.owner() || name_key(old.name()) != name_key(lock.name());
        if reindex {
            let old = old.clone();
            self.unindex(id, &old);
            self.index(id, &lock);
        }
        self.locks.insert(id, lock)
    }

    fn index(&mut self, id: LockId, lock: &Lock) {
        self.by_location.insert(lock.location().clone(), id);
        self.by_owner
            .entry(lock.owner().clone())
            .or_default()
            .insert(id);
        self.by_name
            .insert((lock.owner().clone(), name_key(lock.name())), id);
    }

    fn unindex(&mut self, id: LockId, lock: &Lock) {
        self.by_location.remove(lock.location());
        if let Some(ids) = self.by_owner.get_mut(lock.owner()) {
            ids.remove(&id);
            if ids.is_empty() {
                self.by_owner.remove(lock.owner());
            }
        }
        self.by_name
            .remove(&(lock.owner().clone(), name_key(lock.name())));
    }

    /// Panics if any index disagrees with the arena.
    #[cfg(test)]
    pub fn assert_consistent(&self) {
        assert_eq!(self.by_location.len(), self.locks.len());
        assert_eq!(self.by_name.len(), self.locks.len());
        assert_eq!(
            self.by_owner.values().map(BTreeSet::len).sum::<usize>(),
            self.locks.len()
        );

        for (id, lock) in &self.locks {
            assert_eq!(self.by_location.get(lock.location()), Some(id));
            assert_eq!(
                self.by_name
                    .get(&(lock.owner().clone(), name_key(lock.name()))),
                Some(id)
            );
            assert!(self.by_owner[lock.owner()].contains(id));
            assert!(!lock.access_list().contains(lock.owner()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{actor, loc};

    fn private(owner: &str, x: i64, name: &str) -> Lock {
        Lock::new(actor(owner), loc(x), "chest", LockType::Private, name)
    }

    #[test]
    fn names_are_case_insensitive_per_owner() {
        let mut table = LockTable::default();
        table.insert(private("alice", 1, "Chest1"));

        assert!(!table.is_unique_name(&actor("alice"), "chest1", None));
        assert!(!table.is_unique_name(&actor("alice"), "  CHEST1 ", None));
        assert!(table.is_unique_name(&actor("bob"), "Chest1", None));
        assert_eq!(table.unique_name(&actor("alice"), "chest1", None), "chest1_2");
    }

    #[test]
    fn generated_names_count_up() {
        let mut table = LockTable::default();
        let alice = actor("alice");

        let first = table.generate_name(&alice, "minecraft:trapped_chest");
        assert_eq!(first, "TrappedChest1");
        table.insert(Lock::new(
            alice.clone(),
            loc(1),
            "trapped_chest",
            LockType::Private,
            first,
        ));

        assert_eq!(table.generate_name(&alice, "trapped_chest"), "TrappedChest2");
        assert_eq!(name_stem("???"), "Lock");
    }

    #[test]
    fn replace_reindexes_on_owner_and_name_change() {
        let mut table = LockTable::default();
        let id = table.insert(private("alice", 1, "Chest1"));

        let mut moved = table.get(id).unwrap().clone();
        moved.set_owner(actor("bob"));
        moved.set_name("Box");
        table.replace(id, moved);

        assert_eq!(table.count_owned(&actor("alice"), None, None), 0);
        assert_eq!(table.id_by_name(&actor("bob"), "box"), Some(id));
        assert!(table.id_by_name(&actor("alice"), "Chest1").is_none());
        table.assert_consistent();
    }

    #[test]
    fn count_owned_filters_by_type_and_exclusion() {
        let mut table = LockTable::default();
        let first = table.insert(private("alice", 1, "A"));
        table.insert(Lock::new(
            actor("alice"),
            loc(2),
            "chest",
            LockType::Donation,
            "B",
        ));

        let alice = actor("alice");
        assert_eq!(table.count_owned(&alice, None, None), 2);
        assert_eq!(table.count_owned(&alice, Some(LockType::Private), None), 1);
        assert_eq!(
            table.count_owned(&alice, Some(LockType::Private), Some(first)),
            0
        );
    }

    #[test]
    fn remove_clears_every_index() {
        let mut table = LockTable::default();
        let id = table.insert(private("alice", 1, "Chest1"));
        table.insert(private("alice", 2, "Chest2"));

        let removed = table.remove(id).unwrap();
        assert_eq!(removed.name(), "Chest1");
        assert!(table.lock_at(&loc(1)).is_none());
        assert!(table.is_unique_name(&actor("alice"), "Chest1", None));
        assert_eq!(table.owned_ids(&actor("alice")).len(), 1);
        table.assert_consistent();
    }
}
