//! Values passed between pipeline stages.

use serde::{Deserialize, Serialize};

/// Totals at or below this are treated as zero mass.
pub const EPSILON: f64 = 1e-12;

/// Self-motion estimate for one tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Odometry {
    /// Translation (scaled template distance)
    pub vtrans: f64,
    /// Rotation in radians, CCW positive
    pub vrot: f64,
}

impl Odometry {
    /// Create a new odometry estimate
    pub fn new(vtrans: f64, vrot: f64) -> Self {
        Self { vtrans, vrot }
    }

    /// No motion
    pub fn zero() -> Self {
        Self::default()
    }

    /// Check for zero motion
    #[inline]
    pub fn is_stationary(&self) -> bool {
        self.vtrans == 0.0 && self.vrot == 0.0
    }
}

/// Continuous pose decoded from the pose-cell network.
///
/// Coordinates are in cell-index units, each wrapped into `[0, extent)` of
/// its axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PoseEstimate {
    /// X cell coordinate
    pub x: f64,
    /// Y cell coordinate
    pub y: f64,
    /// Heading cell coordinate
    pub th: f64,
}

impl PoseEstimate {
    /// Create a new pose estimate
    pub fn new(x: f64, y: f64, th: f64) -> Self {
        Self { x, y, th }
    }

    /// Euclidean distance on the (dim_xy, dim_xy, dim_th) torus.
    pub fn toroidal_distance(&self, other: &PoseEstimate, dim_xy: usize, dim_th: usize) -> f64 {
        let dx = super::toroidal_delta(self.x, other.x, dim_xy as f64);
        let dy = super::toroidal_delta(self.y, other.y, dim_xy as f64);
        let dth = super::toroidal_delta(self.th, other.th, dim_th as f64);
        (dx * dx + dy * dy + dth * dth).sqrt()
    }
}
