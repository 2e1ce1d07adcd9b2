//! Catalog item grouping.
//!
//! Items are partitioned into categories with a union-find forest that
//! supports soft removal and rename-by-reunion.

mod union_find;

pub use union_find::UnionFind;
