//! Single-source shortest path (Dijkstra).
//!
//! Runs over the undirected petgraph storage of [`WeightedGraph`] with a
//! binary min-heap keyed by tentative distance. Each vertex is settled at
//! most once; stale heap entries are skipped on pop. The search stops as
//! soon as the target is settled.
//!
//! [`WeightedGraph`]: super::WeightedGraph

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap, HashSet};

use petgraph::stable_graph::{NodeIndex, StableUnGraph};
use petgraph::visit::EdgeRef;
use serde::Serialize;

use super::edge::Weight;

/// A reconstructed route between two vertices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShortestPath {
    /// Vertex labels from start to end, both inclusive.
    pub path: Vec<String>,
    /// Sum of edge weights along `path`.
    pub distance: Weight,
}

impl ShortestPath {
    /// Number of edges traversed.
    pub fn hops(&self) -> usize {
        self.path.len().saturating_sub(1)
    }
}

/// Dijkstra from `start` to `end`. Returns `None` when `end` is unreachable.
pub(crate) fn dijkstra(
    graph: &StableUnGraph<String, Weight>,
    start: NodeIndex,
    end: NodeIndex,
) -> Option<ShortestPath> {
    let mut dist: HashMap<NodeIndex, Weight> = HashMap::new();
    let mut prev: HashMap<NodeIndex, NodeIndex> = HashMap::new();
    let mut settled: HashSet<NodeIndex> = HashSet::new();

    // Min-heap: (distance, node)
    let mut heap: BinaryHeap<Reverse<(Weight, NodeIndex)>> = BinaryHeap::new();
    dist.insert(start, 0);
    heap.push(Reverse((0, start)));

    while let Some(Reverse((cost, node))) = heap.pop() {
        if !settled.insert(node) {
            continue;
        }
        if node == end {
            break;
        }

        for edge in graph.edges(node) {
            // Undirected edges may be reported from either endpoint.
            let next = if edge.source() == node {
                edge.target()
            } else {
                edge.source()
            };
            if settled.contains(&next) {
                continue;
            }

            let candidate = cost.saturating_add(*edge.weight());
            let improves = dist.get(&next).is_none_or(|&known| candidate < known);
            if improves {
                dist.insert(next, candidate);
                prev.insert(next, node);
                heap.push(Reverse((candidate, next)));
            }
        }
    }

    let distance = *dist.get(&end)?;

    // Reconstruct path
    let mut nodes = vec![end];
    let mut current = end;
    while current != start {
        current = *prev.get(&current)?;
        nodes.push(current);
    }
    nodes.reverse();

    let path = nodes
        .into_iter()
        .filter_map(|index| graph.node_weight(index).cloned())
        .collect();

    Some(ShortestPath { path, distance })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_graph() -> (StableUnGraph<String, Weight>, Vec<NodeIndex>) {
        let mut graph = StableUnGraph::default();
        let nodes: Vec<_> = ["a", "b", "c", "d"]
            .iter()
            .map(|label| graph.add_node(label.to_string()))
            .collect();
        graph.add_edge(nodes[0], nodes[1], 1);
        graph.add_edge(nodes[1], nodes[2], 2);
        graph.add_edge(nodes[2], nodes[3], 3);
        (graph, nodes)
    }

    #[test]
    fn test_line_path() {
        let (graph, nodes) = line_graph();
        let result = dijkstra(&graph, nodes[0], nodes[3]).unwrap();
        assert_eq!(result.distance, 6);
        assert_eq!(result.path, vec!["a", "b", "c", "d"]);
        assert_eq!(result.hops(), 3);
    }

    #[test]
    fn test_reverse_direction() {
        let (graph, nodes) = line_graph();
        let result = dijkstra(&graph, nodes[3], nodes[0]).unwrap();
        assert_eq!(result.distance, 6);
        assert_eq!(result.path, vec!["d", "c", "b", "a"]);
    }

    #[test]
    fn test_shortcut_preferred() {
        let (mut graph, nodes) = line_graph();
        graph.add_edge(nodes[0], nodes[3], 4);
        let result = dijkstra(&graph, nodes[0], nodes[3]).unwrap();
        assert_eq!(result.distance, 4);
        assert_eq!(result.path, vec!["a", "d"]);
    }

    #[test]
    fn test_unreachable() {
        let (mut graph, nodes) = line_graph();
        let island = graph.add_node("island".to_string());
        assert!(dijkstra(&graph, nodes[0], island).is_none());
    }

    #[test]
    fn test_start_is_end() {
        let (graph, nodes) = line_graph();
        let result = dijkstra(&graph, nodes[1], nodes[1]).unwrap();
        assert_eq!(result.distance, 0);
        assert_eq!(result.path, vec!["b"]);
        assert_eq!(result.hops(), 0);
    }

    #[test]
    fn test_zero_weight_edges() {
        let (mut graph, nodes) = line_graph();
        graph.add_edge(nodes[0], nodes[2], 0);
        let result = dijkstra(&graph, nodes[0], nodes[2]).unwrap();
        assert_eq!(result.distance, 0);
    }

    #[test]
    fn test_large_weights_saturate() {
        let mut graph = StableUnGraph::default();
        let a = graph.add_node("a".to_string());
        let b = graph.add_node("b".to_string());
        let c = graph.add_node("c".to_string());
        graph.add_edge(a, b, Weight::MAX - 1);
        graph.add_edge(b, c, Weight::MAX - 1);
        let result = dijkstra(&graph, a, c).unwrap();
        assert_eq!(result.distance, Weight::MAX);
        assert_eq!(result.path, vec!["a", "b", "c"]);
    }
}
