//! Probabilistic ordered map keyed by aisle number.
//!
//! A classic skip list stored in an index arena. Slot 0 is the sentinel head
//! whose tower spans every level; data nodes are allocated from a free list
//! and their slot is released on removal.
//!
//! # Level Semantics
//!
//! `level` is the highest tower index currently in use (0-based). A node with
//! tower height `h` is linked on levels `0..=h`. Heights are drawn from the
//! caller-supplied random source by repeated coin flips with probability
//! `promotion_probability`, capped at `max_level`.

use rand::rngs::SmallRng;
use rand::{Rng, RngCore, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::error::{EntityKind, Result, StoreError};

/// Highest accepted `max_level`.
const LEVEL_LIMIT: usize = 31;

/// Index of the sentinel head in the arena.
const HEAD: usize = 0;

/// Configuration for the ordered index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OrderedIndexConfig {
    /// Highest tower index a node can reach (default: 6).
    pub max_level: usize,
    /// Chance of promoting a node one more level (default: 0.5).
    pub promotion_probability: f64,
}

impl Default for OrderedIndexConfig {
    fn default() -> Self {
        Self {
            max_level: 6,
            promotion_probability: 0.5,
        }
    }
}

impl OrderedIndexConfig {
    fn validate(&self) -> Result<()> {
        if self.max_level > LEVEL_LIMIT {
            return Err(StoreError::InvalidArgument(format!(
                "max_level must be at most {LEVEL_LIMIT} (got {})",
                self.max_level
            )));
        }
        let p = self.promotion_probability;
        if !(p > 0.0 && p < 1.0) {
            return Err(StoreError::InvalidArgument(format!(
                "promotion_probability must lie strictly between 0 and 1 (got {p})"
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
struct SkipNode {
    key: i32,
    value: String,
    /// Successor per level; `forward.len() - 1` is the tower height.
    forward: Vec<Option<usize>>,
}

/// Sorted integer-keyed map with probabilistic balancing.
pub struct OrderedIndex<R = SmallRng> {
    nodes: Vec<Option<SkipNode>>,
    free_list: Vec<usize>,
    level: usize,
    len: usize,
    config: OrderedIndexConfig,
    rng: R,
}

impl OrderedIndex<SmallRng> {
    /// Create an index with the default configuration and a seeded `SmallRng`.
    pub fn seeded(seed: u64) -> Self {
        Self::new(SmallRng::seed_from_u64(seed))
    }
}

impl<R: RngCore> OrderedIndex<R> {
    /// Create an empty index with the default configuration.
    pub fn new(rng: R) -> Self {
        Self::build(OrderedIndexConfig::default(), rng)
    }

    /// Create an empty index with a custom configuration.
    pub fn with_config(config: OrderedIndexConfig, rng: R) -> Result<Self> {
        config.validate()?;
        Ok(Self::build(config, rng))
    }

    fn build(config: OrderedIndexConfig, rng: R) -> Self {
        let head = SkipNode {
            key: i32::MIN,
            value: String::new(),
            forward: vec![None; config.max_level + 1],
        };
        Self {
            nodes: vec![Some(head)],
            free_list: Vec::new(),
            level: 0,
            len: 0,
            config,
            rng,
        }
    }

    fn node(&self, idx: usize) -> &SkipNode {
        self.nodes[idx]
            .as_ref()
            .unwrap_or_else(|| unreachable!("dangling skip list link {idx}"))
    }

    fn node_mut(&mut self, idx: usize) -> &mut SkipNode {
        self.nodes[idx]
            .as_mut()
            .unwrap_or_else(|| unreachable!("dangling skip list link {idx}"))
    }

    fn alloc_node(&mut self, node: SkipNode) -> usize {
        if let Some(idx) = self.free_list.pop() {
            self.nodes[idx] = Some(node);
            idx
        } else {
            self.nodes.push(Some(node));
            self.nodes.len() - 1
        }
    }

    fn free_node(&mut self, idx: usize) {
        self.nodes[idx] = None;
        self.free_list.push(idx);
    }

    fn random_level(&mut self) -> usize {
        let p = self.config.promotion_probability;
        let mut level = 0;
        while level < self.config.max_level && self.rng.gen_bool(p) {
            level += 1;
        }
        level
    }

    /// For each level, the last node whose key is strictly less than `key`.
    fn find_path(&self, key: i32) -> Vec<usize> {
        let mut update = vec![HEAD; self.config.max_level + 1];
        let mut current = HEAD;
        for level in (0..=self.level).rev() {
            while let Some(next) = self.node(current).forward[level] {
                if self.node(next).key >= key {
                    break;
                }
                current = next;
            }
            update[level] = current;
        }
        update
    }

    /// The level-0 successor of `predecessor`, if it holds `key`.
    fn matching_successor(&self, predecessor: usize, key: i32) -> Option<usize> {
        let next = self.node(predecessor).forward[0]?;
        (self.node(next).key == key).then_some(next)
    }

    fn find_node(&self, key: i32) -> Option<usize> {
        let predecessor = *self.find_path(key).first()?;
        self.matching_successor(predecessor, key)
    }

    // =========================================================================
    // Map Operations
    // =========================================================================

    /// Insert a new entry. Fails without overwriting if the key exists.
    pub fn insert(&mut self, key: i32, value: impl Into<String>) -> Result<()> {
        let mut update = self.find_path(key);
        if self.matching_successor(update[0], key).is_some() {
            debug!(key, "key already exists");
            return Err(StoreError::already_exists(EntityKind::Key, key.to_string()));
        }

        let height = self.random_level();
        if height > self.level {
            for slot in update.iter_mut().take(height + 1).skip(self.level + 1) {
                *slot = HEAD;
            }
            trace!(from = self.level, to = height, "raising skip list level");
            self.level = height;
        }

        let forward = (0..=height)
            .map(|level| self.node(update[level]).forward[level])
            .collect();
        let idx = self.alloc_node(SkipNode {
            key,
            value: value.into(),
            forward,
        });
        for (level, &predecessor) in update.iter().enumerate().take(height + 1) {
            self.node_mut(predecessor).forward[level] = Some(idx);
        }

        self.len += 1;
        Ok(())
    }

    /// Look up the value stored under `key`.
    pub fn search(&self, key: i32) -> Option<&str> {
        self.find_node(key).map(|idx| self.node(idx).value.as_str())
    }

    /// Check if a key is present.
    pub fn contains_key(&self, key: i32) -> bool {
        self.find_node(key).is_some()
    }

    /// Replace the value of an existing entry in place.
    pub fn update(&mut self, key: i32, value: impl Into<String>) -> Result<()> {
        let idx = self.find_node(key).ok_or_else(|| {
            debug!(key, "key not found for update");
            StoreError::not_found(EntityKind::Key, key.to_string())
        })?;
        self.node_mut(idx).value = value.into();
        Ok(())
    }

    /// Unlink an entry from every level and release its slot.
    ///
    /// Returns the removed value.
    pub fn remove(&mut self, key: i32) -> Result<String> {
        let update = self.find_path(key);
        let target = self.matching_successor(update[0], key).ok_or_else(|| {
            debug!(key, "key not found for removal");
            StoreError::not_found(EntityKind::Key, key.to_string())
        })?;

        for (level, &predecessor) in update.iter().enumerate().take(self.level + 1) {
            if self.node(predecessor).forward[level] != Some(target) {
                break;
            }
            let successor = self.node(target).forward[level];
            self.node_mut(predecessor).forward[level] = successor;
        }

        let value = std::mem::take(&mut self.node_mut(target).value);
        self.free_node(target);
        self.len -= 1;

        let previous = self.level;
        while self.level > 0 && self.node(HEAD).forward[self.level].is_none() {
            self.level -= 1;
        }
        if self.level != previous {
            trace!(from = previous, to = self.level, "lowering skip list level");
        }
        Ok(value)
    }

    // =========================================================================
    // Enumeration
    // =========================================================================

    /// Iterate over entries in ascending key order.
    pub fn iter(&self) -> Iter<'_, R> {
        Iter {
            index: self,
            next: self.node(HEAD).forward[0],
        }
    }

    /// Collect all entries in ascending key order.
    pub fn enumerate_ascending(&self) -> Vec<(i32, String)> {
        self.iter()
            .map(|(key, value)| (key, value.to_owned()))
            .collect()
    }

    /// Get the number of entries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if the index is empty.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Highest level currently linked from the head.
    pub fn level(&self) -> usize {
        self.level
    }

    /// Get the active configuration.
    pub fn config(&self) -> &OrderedIndexConfig {
        &self.config
    }
}

/// Ascending iterator over level 0.
pub struct Iter<'a, R> {
    index: &'a OrderedIndex<R>,
    next: Option<usize>,
}

impl<'a, R: RngCore> Iterator for Iter<'a, R> {
    type Item = (i32, &'a str);

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.index.node(self.next?);
        self.next = node.forward[0];
        Some((node.key, node.value.as_str()))
    }
}
