//! WeightedGraph - store navigation graph.
//!
//! The WeightedGraph stores the store layout using petgraph's StableGraph in
//! undirected mode, so every path is visible from both of its endpoints and
//! the adjacency relation is symmetric by construction. Vertices are addressed
//! by their string labels through an ordered label index.

use std::collections::BTreeMap;

use petgraph::stable_graph::{EdgeIndex, NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use tracing::{debug, trace};

use super::edge::{Neighbor, Weight, checked_weight};
use super::path::{ShortestPath, dijkstra};
use crate::error::{EntityKind, Result, StoreError};

/// Weighted undirected graph of store locations.
///
/// This struct manages:
/// - Graph topology via petgraph
/// - Mapping from vertex labels to petgraph indices
pub struct WeightedGraph {
    /// The underlying graph. Nodes store their label, edges store weight.
    graph: StableUnGraph<String, Weight>,

    /// Map from vertex label to petgraph NodeIndex, in label order.
    label_to_index: BTreeMap<String, NodeIndex>,
}

impl WeightedGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            graph: StableUnGraph::default(),
            label_to_index: BTreeMap::new(),
        }
    }

    /// Create a graph with pre-allocated capacity.
    pub fn with_capacity(vertex_capacity: usize, edge_capacity: usize) -> Self {
        Self {
            graph: StableUnGraph::with_capacity(vertex_capacity, edge_capacity),
            label_to_index: BTreeMap::new(),
        }
    }

    fn index_of(&self, label: &str) -> Result<NodeIndex> {
        self.label_to_index.get(label).copied().ok_or_else(|| {
            debug!(label, "vertex not found");
            StoreError::not_found(EntityKind::Vertex, label)
        })
    }

    fn endpoints(&self, src: &str, dest: &str) -> Result<(NodeIndex, NodeIndex)> {
        Ok((self.index_of(src)?, self.index_of(dest)?))
    }

    fn connecting_edge(&self, src: &str, dest: &str) -> Result<EdgeIndex> {
        let (a, b) = self.endpoints(src, dest)?;
        self.graph.find_edge(a, b).ok_or_else(|| {
            debug!(src, dest, "edge not found");
            StoreError::not_found(EntityKind::Edge, format!("{src} - {dest}"))
        })
    }

    // =========================================================================
    // Vertex Operations
    // =========================================================================

    /// Add a vertex. Fails if the label is already present.
    pub fn add_vertex(&mut self, label: &str) -> Result<()> {
        if self.label_to_index.contains_key(label) {
            debug!(label, "vertex already exists");
            return Err(StoreError::already_exists(EntityKind::Vertex, label));
        }
        let index = self.graph.add_node(label.to_owned());
        self.label_to_index.insert(label.to_owned(), index);
        Ok(())
    }

    /// Remove a vertex and every edge that references it.
    pub fn remove_vertex(&mut self, label: &str) -> Result<()> {
        let index = self.index_of(label)?;
        let stripped = self.graph.edges(index).count();
        self.graph.remove_node(index);
        self.label_to_index.remove(label);
        trace!(label, stripped, "vertex removed");
        Ok(())
    }

    /// Check if a vertex exists.
    pub fn contains_vertex(&self, label: &str) -> bool {
        self.label_to_index.contains_key(label)
    }

    /// Get the number of vertices.
    pub fn vertex_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Iterate over vertex labels in label order.
    pub fn vertices(&self) -> impl Iterator<Item = &str> {
        self.label_to_index.keys().map(String::as_str)
    }

    // =========================================================================
    // Edge Operations
    // =========================================================================

    /// Add an undirected edge between two existing vertices.
    ///
    /// Fails if the weight is negative or either endpoint is absent.
    /// Parallel edges are allowed.
    pub fn add_edge(&mut self, src: &str, dest: &str, weight: i64) -> Result<()> {
        let weight = checked_weight(weight)?;
        let (a, b) = self.endpoints(src, dest)?;
        self.graph.add_edge(a, b, weight);
        Ok(())
    }

    /// Remove one edge connecting `src` and `dest`.
    pub fn remove_edge(&mut self, src: &str, dest: &str) -> Result<()> {
        let edge = self.connecting_edge(src, dest)?;
        self.graph.remove_edge(edge);
        Ok(())
    }

    /// Change the weight of the edge connecting `src` and `dest`.
    pub fn update_edge(&mut self, src: &str, dest: &str, new_weight: i64) -> Result<()> {
        let new_weight = checked_weight(new_weight)?;
        let edge = self.connecting_edge(src, dest)?;
        if let Some(weight) = self.graph.edge_weight_mut(edge) {
            *weight = new_weight;
        }
        Ok(())
    }

    /// Get the weight of the edge connecting `src` and `dest`, if any.
    pub fn edge_weight(&self, src: &str, dest: &str) -> Option<Weight> {
        let a = *self.label_to_index.get(src)?;
        let b = *self.label_to_index.get(dest)?;
        self.graph
            .find_edge(a, b)
            .and_then(|edge| self.graph.edge_weight(edge).copied())
    }

    /// Get the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Get the neighbors of a vertex, sorted by label then weight.
    pub fn neighbors(&self, label: &str) -> Result<Vec<Neighbor>> {
        let index = self.index_of(label)?;
        Ok(self.neighbors_of(index))
    }

    fn neighbors_of(&self, index: NodeIndex) -> Vec<Neighbor> {
        let mut neighbors: Vec<_> = self
            .graph
            .edges(index)
            .filter_map(|edge| {
                let other = if edge.source() == index {
                    edge.target()
                } else {
                    edge.source()
                };
                self.graph
                    .node_weight(other)
                    .map(|label| Neighbor::new(label.clone(), *edge.weight()))
            })
            .collect();
        neighbors.sort();
        neighbors
    }

    /// Get every vertex with its neighbor list, in label order.
    pub fn adjacency(&self) -> Vec<(String, Vec<Neighbor>)> {
        self.label_to_index
            .iter()
            .map(|(label, &index)| (label.clone(), self.neighbors_of(index)))
            .collect()
    }

    // =========================================================================
    // Path Queries
    // =========================================================================

    /// Find the cheapest route from `start` to `end`.
    pub fn shortest_path(&self, start: &str, end: &str) -> Result<ShortestPath> {
        let (from, to) = self.endpoints(start, end)?;
        dijkstra(&self.graph, from, to).ok_or_else(|| {
            debug!(start, end, "no path");
            StoreError::Unreachable {
                from: start.to_owned(),
                to: end.to_owned(),
            }
        })
    }

    /// Clear all vertices and edges.
    pub fn clear(&mut self) {
        self.graph.clear();
        self.label_to_index.clear();
    }
}

impl Default for WeightedGraph {
    fn default() -> Self {
        Self::new()
    }
}
