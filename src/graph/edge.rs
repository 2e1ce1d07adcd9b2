//! Edge weights and neighbor entries.
//!
//! Edges are undirected paths between two store locations. Each edge has:
//! - The label of the location on the other end
//! - A non-negative integer weight (walking distance)

use serde::Serialize;
use tracing::debug;

use crate::error::{Result, StoreError};

/// Stored edge weight.
pub type Weight = u64;

/// One entry of a vertex's adjacency list.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Neighbor {
    /// Label of the adjacent vertex.
    pub label: String,
    /// Weight of the connecting edge.
    pub weight: Weight,
}

impl Neighbor {
    /// Create a new neighbor entry.
    pub fn new(label: impl Into<String>, weight: Weight) -> Self {
        Self {
            label: label.into(),
            weight,
        }
    }
}

/// Convert a caller-supplied weight, rejecting negatives.
pub(crate) fn checked_weight(weight: i64) -> Result<Weight> {
    Weight::try_from(weight).map_err(|_| {
        debug!(weight, "negative edge weight");
        StoreError::InvalidArgument(format!("edge weight cannot be negative (got {weight})"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_weight() {
        assert_eq!(checked_weight(0), Ok(0));
        assert_eq!(checked_weight(15), Ok(15));
        assert!(matches!(
            checked_weight(-1),
            Err(StoreError::InvalidArgument(_))
        ));
    }

    #[test]
    fn test_neighbor_ordering() {
        let mut list = vec![
            Neighbor::new("Produce", 20),
            Neighbor::new("Dairy", 10),
            Neighbor::new("Dairy", 4),
        ];
        list.sort();
        assert_eq!(list[0], Neighbor::new("Dairy", 4));
        assert_eq!(list[2].label, "Produce");
    }
}
