//! Spatial indexing for nearest-store lookup.
//!
//! This module provides a point quadtree over a fixed rectangular domain
//! for nearest-neighbor queries on named store locations.

mod bounds;
mod quadtree;

pub use bounds::Bounds;
pub use quadtree::{Location, NearestMatch, SpatialIndex};
