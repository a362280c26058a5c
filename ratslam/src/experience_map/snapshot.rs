//! Serializable view of the experience graph.

use serde::{Deserialize, Serialize};

use crate::view_cells::ViewCellId;

use super::ExperienceId;

/// Experience node as exported
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ExperienceSnapshot {
    /// Node id
    pub id: ExperienceId,
    /// Map x
    pub x: f64,
    /// Map y
    pub y: f64,
    /// Map facing (radians)
    pub facing: f64,
    /// View cell the node was created under
    pub view_cell: ViewCellId,
}

/// Link as exported
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinkSnapshot {
    /// Source node
    pub source: ExperienceId,
    /// Target node
    pub target: ExperienceId,
    /// Distance travelled
    pub distance: f64,
    /// Direction of travel relative to the source facing
    pub heading: f64,
    /// Facing change from source to target
    pub facing: f64,
}

/// Copy of the whole experience map.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MapSnapshot {
    /// Nodes in creation order
    pub experiences: Vec<ExperienceSnapshot>,
    /// Links grouped by source
    pub links: Vec<LinkSnapshot>,
    /// Current node, if any
    pub current: Option<ExperienceId>,
}

impl MapSnapshot {
    /// Serialize to YAML
    pub fn to_yaml(&self) -> Result<String, serde_yaml::Error> {
        serde_yaml::to_string(self)
    }

    /// Parse from YAML
    pub fn from_yaml(yaml: &str) -> Result<Self, serde_yaml::Error> {
        serde_yaml::from_str(yaml)
    }
}
