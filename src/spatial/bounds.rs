//! Rectangular domain of the spatial index.

use rstar::{AABB, Envelope};
use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// Axis-aligned rectangle `[min_x, max_x] x [min_y, max_y]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Bounds {
    /// Left edge.
    pub min_x: f64,
    /// Bottom edge.
    pub min_y: f64,
    /// Right edge.
    pub max_x: f64,
    /// Top edge.
    pub max_y: f64,
}

impl Default for Bounds {
    fn default() -> Self {
        Self {
            min_x: -100.0,
            min_y: -100.0,
            max_x: 100.0,
            max_y: 100.0,
        }
    }
}

impl Bounds {
    /// Create validated bounds. Edges must be finite with `min <= max`.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self> {
        let bounds = Self {
            min_x,
            min_y,
            max_x,
            max_y,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub(crate) fn validate(&self) -> Result<()> {
        let edges = [self.min_x, self.min_y, self.max_x, self.max_y];
        if edges.iter().any(|edge| !edge.is_finite()) {
            return Err(StoreError::InvalidArgument(format!(
                "bounds must be finite (got {self:?})"
            )));
        }
        if self.min_x > self.max_x || self.min_y > self.max_y {
            return Err(StoreError::InvalidArgument(format!(
                "bounds minimum exceeds maximum (got {self:?})"
            )));
        }
        Ok(())
    }

    /// Check if a point lies inside, edges included.
    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.envelope().contains_point(&[x, y])
    }

    pub(crate) fn envelope(&self) -> AABB<[f64; 2]> {
        AABB::from_corners([self.min_x, self.min_y], [self.max_x, self.max_y])
    }

    pub(crate) fn from_envelope(envelope: &AABB<[f64; 2]>) -> Self {
        let [min_x, min_y] = envelope.lower();
        let [max_x, max_y] = envelope.upper();
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }
}
