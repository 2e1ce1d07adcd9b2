//! Point quadtree spatial index over named store locations.
//!
//! Provides:
//! - Insertion with on-demand leaf subdivision
//! - Nearest neighbor with best-first quadrant pruning
//! - Soft removal by name or by exact coordinate
//!
//! Nodes live in an index arena. A node is either a leaf holding at most one
//! point or an internal node with four children (NW, NE, SW, SE) split at the
//! midpoint of its rectangle. Coordinates equal to the midpoint belong to the
//! lower (west/south) quadrant on both axes.
//!
//! Removal clears the point but keeps the leaf: the tree only grows. Searches
//! walk through empty leaves and treat them as holding nothing.

use rstar::{AABB, Envelope};
use serde::Serialize;
use tracing::{debug, trace};

use super::bounds::Bounds;
use crate::error::{EntityKind, Result, StoreError};

/// A named point stored in the index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    /// Store name.
    pub name: String,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
}

/// Result of a nearest-neighbor query.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NearestMatch {
    /// Store name.
    pub name: String,
    /// X coordinate.
    pub x: f64,
    /// Y coordinate.
    pub y: f64,
    /// Euclidean distance from the query point.
    pub distance: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Quadrant {
    NorthWest = 0,
    NorthEast = 1,
    SouthWest = 2,
    SouthEast = 3,
}

/// Midpoint of a rectangle. Halving before adding keeps it finite for any
/// finite edges.
fn midpoint(envelope: &AABB<[f64; 2]>) -> [f64; 2] {
    let [min_x, min_y] = envelope.lower();
    let [max_x, max_y] = envelope.upper();
    [min_x / 2.0 + max_x / 2.0, min_y / 2.0 + max_y / 2.0]
}

/// Euclidean distance from `target` to the closest point of `envelope`.
fn box_distance(envelope: &AABB<[f64; 2]>, target: [f64; 2]) -> f64 {
    let [min_x, min_y] = envelope.lower();
    let [max_x, max_y] = envelope.upper();
    let dx = (min_x - target[0]).max(target[0] - max_x).max(0.0);
    let dy = (min_y - target[1]).max(target[1] - max_y).max(0.0);
    dx.hypot(dy)
}

impl Quadrant {
    fn containing(envelope: &AABB<[f64; 2]>, x: f64, y: f64) -> Self {
        let [mid_x, mid_y] = midpoint(envelope);
        match (x <= mid_x, y <= mid_y) {
            (true, true) => Self::SouthWest,
            (true, false) => Self::NorthWest,
            (false, true) => Self::SouthEast,
            (false, false) => Self::NorthEast,
        }
    }

    /// Visit order for nearest search: this quadrant first, then its two
    /// edge-adjacent quadrants, then the diagonal one.
    fn search_order(self) -> [Self; 4] {
        use Quadrant::*;
        match self {
            SouthWest => [SouthWest, NorthWest, SouthEast, NorthEast],
            NorthWest => [NorthWest, SouthWest, NorthEast, SouthEast],
            SouthEast => [SouthEast, NorthEast, SouthWest, NorthWest],
            NorthEast => [NorthEast, NorthWest, SouthEast, SouthWest],
        }
    }

    #[inline]
    fn index(self) -> usize {
        self as usize
    }
}

/// Split a rectangle at its midpoint into `[NW, NE, SW, SE]`.
fn split(envelope: &AABB<[f64; 2]>) -> [AABB<[f64; 2]>; 4] {
    let [min_x, min_y] = envelope.lower();
    let [max_x, max_y] = envelope.upper();
    let [mid_x, mid_y] = midpoint(envelope);
    [
        AABB::from_corners([min_x, mid_y], [mid_x, max_y]),
        AABB::from_corners([mid_x, mid_y], [max_x, max_y]),
        AABB::from_corners([min_x, min_y], [mid_x, mid_y]),
        AABB::from_corners([mid_x, min_y], [max_x, mid_y]),
    ]
}

/// Check that repeated midpoint splits of `envelope` eventually put `a` and
/// `b` in different quadrants.
fn separable(mut envelope: AABB<[f64; 2]>, a: (f64, f64), b: (f64, f64)) -> bool {
    loop {
        let qa = Quadrant::containing(&envelope, a.0, a.1);
        let qb = Quadrant::containing(&envelope, b.0, b.1);
        if qa != qb {
            return true;
        }
        let child = split(&envelope)[qa.index()];
        if child == envelope {
            return false;
        }
        envelope = child;
    }
}

#[derive(Debug)]
struct QuadNode {
    envelope: AABB<[f64; 2]>,
    point: Option<Location>,
    children: Option<[usize; 4]>,
}

impl QuadNode {
    fn leaf(envelope: AABB<[f64; 2]>) -> Self {
        Self {
            envelope,
            point: None,
            children: None,
        }
    }
}

/// Point quadtree over a fixed rectangular domain.
pub struct SpatialIndex {
    nodes: Vec<QuadNode>,
    count: usize,
}

impl SpatialIndex {
    /// Root node slot.
    const ROOT: usize = 0;

    /// Create an empty index covering `bounds`.
    pub fn new(bounds: Bounds) -> Result<Self> {
        bounds.validate()?;
        Ok(Self::with_envelope(bounds.envelope()))
    }

    fn with_envelope(envelope: AABB<[f64; 2]>) -> Self {
        Self {
            nodes: vec![QuadNode::leaf(envelope)],
            count: 0,
        }
    }

    /// Follow quadrant splits from the root to the leaf covering `(x, y)`.
    fn descend(&self, x: f64, y: f64) -> usize {
        let mut current = Self::ROOT;
        while let Some(children) = self.nodes[current].children {
            let quadrant = Quadrant::containing(&self.nodes[current].envelope, x, y);
            current = children[quadrant.index()];
        }
        current
    }

    fn slot_of(&self, name: &str) -> Option<usize> {
        self.nodes
            .iter()
            .position(|node| node.point.as_ref().is_some_and(|p| p.name == name))
    }

    /// Turn a leaf into an internal node, moving its occupant into a child.
    fn subdivide(&mut self, slot: usize) -> [usize; 4] {
        let envelope = self.nodes[slot].envelope;
        let first = self.nodes.len();
        self.nodes
            .extend(split(&envelope).into_iter().map(QuadNode::leaf));
        let children = [first, first + 1, first + 2, first + 3];
        self.nodes[slot].children = Some(children);

        if let Some(occupant) = self.nodes[slot].point.take() {
            let quadrant = Quadrant::containing(&envelope, occupant.x, occupant.y);
            self.nodes[children[quadrant.index()]].point = Some(occupant);
        }
        trace!(slot, first_child = first, "subdivided quadtree leaf");
        children
    }

    // =========================================================================
    // Mutation
    // =========================================================================

    /// Insert a named point.
    ///
    /// Fails if the point is outside the domain, the name is already stored,
    /// or another point sits at exactly the same coordinate.
    pub fn insert(&mut self, x: f64, y: f64, name: &str) -> Result<()> {
        if !self.nodes[Self::ROOT].envelope.contains_point(&[x, y]) {
            debug!(x, y, "point outside spatial bounds");
            return Err(StoreError::InvalidArgument(format!(
                "point ({x}, {y}) is outside the boundary"
            )));
        }
        if let Some(slot) = self.slot_of(name) {
            debug!(name, slot, "name already stored");
            return Err(StoreError::already_exists(EntityKind::Name, name));
        }

        let mut current = self.descend(x, y);
        if let Some(occupant) = &self.nodes[current].point {
            if occupant.x == x && occupant.y == y {
                debug!(x, y, existing = %occupant.name, "coordinate already occupied");
                return Err(StoreError::already_exists(
                    EntityKind::Coordinate,
                    format!("({x}, {y})"),
                ));
            }
            let envelope = self.nodes[current].envelope;
            if !separable(envelope, (occupant.x, occupant.y), (x, y)) {
                debug!(x, y, existing = %occupant.name, "point too close to subdivide");
                return Err(StoreError::InvalidArgument(format!(
                    "point ({x}, {y}) is too close to '{}' to subdivide",
                    occupant.name
                )));
            }
        }

        while self.nodes[current].point.is_some() {
            let envelope = self.nodes[current].envelope;
            let children = self.subdivide(current);
            current = children[Quadrant::containing(&envelope, x, y).index()];
        }

        self.nodes[current].point = Some(Location {
            name: name.to_owned(),
            x,
            y,
        });
        self.count += 1;
        Ok(())
    }

    /// Clear the point stored under `name`. The leaf stays in the tree.
    pub fn remove_by_name(&mut self, name: &str) -> Result<Location> {
        let slot = self.slot_of(name).ok_or_else(|| {
            debug!(name, "name not found");
            StoreError::not_found(EntityKind::Name, name)
        })?;
        self.clear_slot(slot)
    }

    /// Clear the point stored at exactly `(x, y)`. The leaf stays in the tree.
    pub fn remove_by_coordinate(&mut self, x: f64, y: f64) -> Result<Location> {
        let slot = self.descend(x, y);
        let matches = self.nodes[slot]
            .point
            .as_ref()
            .is_some_and(|p| p.x == x && p.y == y);
        if !matches {
            debug!(x, y, "no point at coordinate");
            return Err(StoreError::not_found(
                EntityKind::Coordinate,
                format!("({x}, {y})"),
            ));
        }
        self.clear_slot(slot)
    }

    fn clear_slot(&mut self, slot: usize) -> Result<Location> {
        let removed = self.nodes[slot]
            .point
            .take()
            .ok_or_else(|| StoreError::not_found(EntityKind::Name, format!("slot {slot}")))?;
        self.count -= 1;
        Ok(removed)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    /// Find the stored point closest to `(x, y)`.
    pub fn nearest(&self, x: f64, y: f64) -> Result<NearestMatch> {
        if self.count == 0 {
            debug!(x, y, "nearest query on empty index");
            return Err(StoreError::Empty);
        }

        let mut best_dist = f64::INFINITY;
        let mut best = None;
        self.nearest_in(Self::ROOT, [x, y], &mut best_dist, &mut best);

        let location = best
            .and_then(|slot| self.nodes[slot].point.as_ref())
            .ok_or(StoreError::Empty)?;
        Ok(NearestMatch {
            name: location.name.clone(),
            x: location.x,
            y: location.y,
            distance: best_dist,
        })
    }

    /// The first present point is always taken, so a distance that
    /// overflows to infinity still yields a match.
    fn nearest_in(
        &self,
        slot: usize,
        target: [f64; 2],
        best_dist: &mut f64,
        best: &mut Option<usize>,
    ) {
        let node = &self.nodes[slot];
        let Some(children) = node.children else {
            if let Some(point) = &node.point {
                let dist = (point.x - target[0]).hypot(point.y - target[1]);
                if best.is_none() || dist < *best_dist {
                    *best_dist = dist;
                    *best = Some(slot);
                }
            }
            return;
        };

        let primary = Quadrant::containing(&node.envelope, target[0], target[1]);
        let [first, rest @ ..] = primary.search_order();
        self.nearest_in(children[first.index()], target, best_dist, best);

        for quadrant in rest {
            let child = children[quadrant.index()];
            if best.is_none() || box_distance(&self.nodes[child].envelope, target) < *best_dist {
                self.nearest_in(child, target, best_dist, best);
            }
        }
    }

    /// Look up the coordinate stored under `name`.
    pub fn find(&self, name: &str) -> Option<(f64, f64)> {
        self.slot_of(name)
            .and_then(|slot| self.nodes[slot].point.as_ref())
            .map(|point| (point.x, point.y))
    }

    /// Every stored point in pre-order (node, then NW, NE, SW, SE).
    pub fn enumerate_present(&self) -> Vec<Location> {
        let mut present = Vec::with_capacity(self.count);
        let mut stack = vec![Self::ROOT];
        while let Some(slot) = stack.pop() {
            let node = &self.nodes[slot];
            if let Some(point) = &node.point {
                present.push(point.clone());
            }
            if let Some(children) = node.children {
                stack.extend(children.iter().rev());
            }
        }
        present
    }

    /// Get the number of stored points.
    pub fn len(&self) -> usize {
        self.count
    }

    /// Check if no point is stored.
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Get the number of tree nodes, including emptied leaves.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Get the domain covered by the root.
    pub fn bounds(&self) -> Bounds {
        Bounds::from_envelope(&self.nodes[Self::ROOT].envelope)
    }
}

impl Default for SpatialIndex {
    fn default() -> Self {
        Self::with_envelope(Bounds::default().envelope())
    }
}
