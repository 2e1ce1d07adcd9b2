//! Union-Find (disjoint set) over catalog item names.
//!
//! Elements live in a dense arena addressed by `usize` slots; names map to
//! slots. `find` compresses paths fully (every visited node is repointed at
//! the root) and `union` merges by rank.
//!
//! # Soft Delete
//!
//! Removing an element only clears its `active` flag. The slot stays in the
//! forest so members below it keep reaching their root. Inactive elements are
//! hidden from every query and from enumeration. When the root of a group is
//! itself inactive, the group is reported under its earliest-created active
//! member. That fallback is cached per root until the group changes.
//!
//! # Rename
//!
//! `rename(old, new)` creates `new`, unions it into `old`'s group and then
//! deactivates `old`. The old slot stays behind as a hidden internal node.

use std::collections::{BTreeMap, HashMap};

use tracing::debug;

use crate::error::{EntityKind, Result, StoreError};

#[derive(Debug, Clone)]
struct Element {
    name: String,
    parent: usize,
    rank: u32,
    active: bool,
}

/// Disjoint-set forest over string identifiers.
#[derive(Debug, Clone, Default)]
pub struct UnionFind {
    elements: Vec<Element>,
    slots: HashMap<String, usize>,
    active_count: usize,
    /// Inactive root to the slot reported in its place.
    fallback: HashMap<usize, usize>,
}

impl UnionFind {
    /// Create an empty structure.
    pub fn new() -> Self {
        Self::default()
    }

    fn active_slot(&self, name: &str) -> Result<usize> {
        match self.slots.get(name) {
            Some(&slot) if self.elements[slot].active => Ok(slot),
            _ => {
                debug!(name, "element not found or removed");
                Err(StoreError::not_found(EntityKind::Element, name))
            }
        }
    }

    fn find_root(&mut self, slot: usize) -> usize {
        let mut root = slot;
        while self.elements[root].parent != root {
            root = self.elements[root].parent;
        }

        // Path compression
        let mut current = slot;
        while self.elements[current].parent != root {
            let next = self.elements[current].parent;
            self.elements[current].parent = root;
            current = next;
        }
        root
    }

    /// Root lookup without path compression.
    fn root_of(&self, mut slot: usize) -> usize {
        while self.elements[slot].parent != slot {
            slot = self.elements[slot].parent;
        }
        slot
    }

    /// Earliest-created active member of the group rooted at `root`.
    fn representative(&mut self, root: usize) -> Option<usize> {
        if self.elements[root].active {
            return Some(root);
        }
        if let Some(&slot) = self.fallback.get(&root) {
            return Some(slot);
        }
        let slot = (0..self.elements.len())
            .find(|&slot| self.elements[slot].active && self.root_of(slot) == root)?;
        self.fallback.insert(root, slot);
        Some(slot)
    }

    fn deactivate(&mut self, slot: usize) {
        self.elements[slot].active = false;
        self.active_count -= 1;
        self.fallback.retain(|_, representative| *representative != slot);
    }

    /// Add `name` as a singleton group.
    ///
    /// Fails if the name is known, including removed names.
    pub fn make_set(&mut self, name: &str) -> Result<()> {
        if self.slots.contains_key(name) {
            debug!(name, "element already exists");
            return Err(StoreError::already_exists(EntityKind::Element, name));
        }
        let slot = self.elements.len();
        self.elements.push(Element {
            name: name.to_owned(),
            parent: slot,
            rank: 0,
            active: true,
        });
        self.slots.insert(name.to_owned(), slot);
        self.active_count += 1;
        Ok(())
    }

    /// Return the representative name of `name`'s group.
    pub fn find(&mut self, name: &str) -> Result<String> {
        let slot = self.active_slot(name)?;
        let root = self.find_root(slot);
        let representative = self.representative(root).unwrap_or(slot);
        Ok(self.elements[representative].name.clone())
    }

    /// Merge the groups of `a` and `b`.
    ///
    /// Returns `Ok(false)` when they already share a group.
    pub fn union(&mut self, a: &str, b: &str) -> Result<bool> {
        let slot_a = self.active_slot(a)?;
        let slot_b = self.active_slot(b)?;
        Ok(self.union_slots(slot_a, slot_b))
    }

    fn union_slots(&mut self, a: usize, b: usize) -> bool {
        let root_a = self.find_root(a);
        let root_b = self.find_root(b);
        if root_a == root_b {
            return false;
        }
        self.fallback.remove(&root_a);
        self.fallback.remove(&root_b);

        let rank_a = self.elements[root_a].rank;
        let rank_b = self.elements[root_b].rank;
        match rank_a.cmp(&rank_b) {
            std::cmp::Ordering::Less => {
                self.elements[root_a].parent = root_b;
            }
            std::cmp::Ordering::Greater => {
                self.elements[root_b].parent = root_a;
            }
            std::cmp::Ordering::Equal => {
                self.elements[root_b].parent = root_a;
                self.elements[root_a].rank += 1;
            }
        }
        true
    }

    /// Deactivate `name`. Its slot stays in the forest.
    pub fn remove(&mut self, name: &str) -> Result<()> {
        let slot = self.active_slot(name)?;
        self.deactivate(slot);
        Ok(())
    }

    /// Give `old`'s group a new member `new` and retire `old`.
    ///
    /// Fails if `old` is unknown or removed, or if `new` is already known.
    pub fn rename(&mut self, old: &str, new: &str) -> Result<()> {
        let old_slot = self.active_slot(old)?;
        self.make_set(new)?;
        let new_slot = self.elements.len() - 1;
        self.union_slots(new_slot, old_slot);
        self.deactivate(old_slot);
        Ok(())
    }

    /// Group every active element by representative.
    ///
    /// Keys and members are sorted by name.
    pub fn enumerate_groups(&mut self) -> BTreeMap<String, Vec<String>> {
        let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for slot in 0..self.elements.len() {
            if self.elements[slot].active {
                let root = self.find_root(slot);
                by_root.entry(root).or_default().push(slot);
            }
        }

        by_root
            .into_iter()
            .map(|(root, members)| {
                // Members are in creation order, so the first is the fallback.
                let representative = if self.elements[root].active {
                    root
                } else {
                    members[0]
                };
                let mut names: Vec<_> = members
                    .iter()
                    .map(|&slot| self.elements[slot].name.clone())
                    .collect();
                names.sort();
                (self.elements[representative].name.clone(), names)
            })
            .collect()
    }

    /// Check if a name was ever added, active or not.
    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    /// Check if a name is present and active.
    pub fn is_active(&self, name: &str) -> bool {
        self.slots
            .get(name)
            .is_some_and(|&slot| self.elements[slot].active)
    }

    /// Get the number of active elements.
    pub fn len(&self) -> usize {
        self.active_count
    }

    /// Check if no element is active.
    pub fn is_empty(&self) -> bool {
        self.active_count == 0
    }
}
