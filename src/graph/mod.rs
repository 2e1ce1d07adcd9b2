//! Store navigation graph.
//!
//! This module provides the weighted undirected graph of store locations,
//! backed by petgraph's StableGraph, together with Dijkstra shortest-path
//! routing between locations.

mod edge;
mod engine;
mod path;

pub use edge::{Neighbor, Weight};
pub use engine::WeightedGraph;
pub use path::ShortestPath;
