//! Aisle lookup.
//!
//! This module provides a skip-list ordered map from aisle number to aisle
//! description. Level assignment draws from a random source supplied by the
//! caller, so a seeded generator gives reproducible structure.

mod skip_list;

pub use skip_list::{Iter, OrderedIndex, OrderedIndexConfig};
