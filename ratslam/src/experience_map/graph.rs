//! Experience graph nodes and edges.

use serde::{Deserialize, Serialize};

use crate::core::{PoseEstimate, signed_delta};
use crate::view_cells::ViewCellId;

/// Stable index of an experience in its map.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExperienceId(pub usize);

impl std::fmt::Display for ExperienceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exp{}", self.0)
    }
}

/// Directed edge holding the relative motion between two experiences.
///
/// `heading` and `facing` are relative to the source's facing when the
/// link was made, so relaxation can rotate the source without touching the
/// stored measurement.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ExperienceLink {
    /// Destination experience
    pub target: ExperienceId,
    /// Change of facing from source to target (radians)
    pub facing: f64,
    /// Straight-line distance travelled
    pub distance: f64,
    /// Direction of travel relative to the source facing (radians)
    pub heading: f64,
}

impl ExperienceLink {
    /// Build a link from a source facing and accumulated motion.
    pub fn from_motion(
        target: ExperienceId,
        source_facing: f64,
        dx: f64,
        dy: f64,
        accum_facing: f64,
    ) -> Self {
        Self {
            target,
            facing: signed_delta(source_facing, accum_facing),
            distance: dx.hypot(dy),
            heading: signed_delta(source_facing, dy.atan2(dx)),
        }
    }

    /// Where the target should sit if this link were exact.
    pub fn predict(&self, x: f64, y: f64, facing: f64) -> (f64, f64) {
        let direction = facing + self.heading;
        (
            x + self.distance * direction.cos(),
            y + self.distance * direction.sin(),
        )
    }
}

/// A node of the experience map.
#[derive(Clone, Debug)]
pub struct Experience {
    pub(crate) id: ExperienceId,
    pub(crate) pose: PoseEstimate,
    pub(crate) x: f64,
    pub(crate) y: f64,
    pub(crate) facing: f64,
    pub(crate) view_cell: ViewCellId,
    pub(crate) links: Vec<ExperienceLink>,
}

impl Experience {
    /// Index in the owning map
    #[inline]
    pub fn id(&self) -> ExperienceId {
        self.id
    }

    /// Pose-cell coordinates at creation
    #[inline]
    pub fn pose(&self) -> PoseEstimate {
        self.pose
    }

    /// Map x coordinate
    #[inline]
    pub fn x(&self) -> f64 {
        self.x
    }

    /// Map y coordinate
    #[inline]
    pub fn y(&self) -> f64 {
        self.y
    }

    /// Map facing in (-pi, pi]
    #[inline]
    pub fn facing(&self) -> f64 {
        self.facing
    }

    /// View cell active when the experience was created
    #[inline]
    pub fn view_cell(&self) -> ViewCellId {
        self.view_cell
    }

    /// Outgoing links
    #[inline]
    pub fn links(&self) -> &[ExperienceLink] {
        &self.links
    }

    /// Check for an outgoing link to `target`
    pub fn links_to(&self, target: ExperienceId) -> bool {
        self.links.iter().any(|l| l.target == target)
    }
}
