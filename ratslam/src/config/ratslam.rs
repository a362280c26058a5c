//! Main RatSlamConfig and its sections.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::experience_map::ExperienceMapConfig;
use crate::odometry::VisualOdometryConfig;
use crate::pose_cells::PoseCellConfig;
use crate::view_cells::ViewCellConfig;

use super::defaults;
use super::error::{ConfigError, ConfigLoadError};

/// Expected camera image shape
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FrameSection {
    /// Image width in pixels (columns of the signature)
    #[serde(default = "defaults::frame_width")]
    pub width: usize,

    /// Image height in pixels
    #[serde(default = "defaults::frame_height")]
    pub height: usize,
}

impl Default for FrameSection {
    fn default() -> Self {
        Self {
            width: defaults::frame_width(),
            height: defaults::frame_height(),
        }
    }
}

/// Background worker settings
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PipelineSection {
    /// Frames that may wait for the worker before `submit` blocks
    #[serde(default = "defaults::queue_capacity")]
    pub queue_capacity: usize,
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            queue_capacity: defaults::queue_capacity(),
        }
    }
}

/// Full RatSLAM configuration loaded from YAML
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct RatSlamConfig {
    /// Frame shape
    #[serde(default)]
    pub frame: FrameSection,

    /// Visual odometry
    #[serde(default)]
    pub visual_odometry: VisualOdometryConfig,

    /// View cell matching
    #[serde(default)]
    pub view_cells: ViewCellConfig,

    /// Pose cell network
    #[serde(default)]
    pub pose_cells: PoseCellConfig,

    /// Experience map
    #[serde(default)]
    pub experience_map: ExperienceMapConfig,

    /// Background worker
    #[serde(default)]
    pub pipeline: PipelineSection,
}

impl RatSlamConfig {
    /// Load configuration from a YAML file
    pub fn load(path: &Path) -> Result<Self, ConfigLoadError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigLoadError::Io(e.to_string()))?;
        Self::from_yaml(&contents)
    }

    /// Load from default config path (configs/ratslam.yaml)
    pub fn load_default() -> Result<Self, ConfigLoadError> {
        let path = Path::new("configs/ratslam.yaml");
        if path.exists() {
            Self::load(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse from YAML string and validate
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigLoadError> {
        let config: Self =
            serde_yaml::from_str(yaml).map_err(|e| ConfigLoadError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section against the others.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.frame.width == 0 || self.frame.height == 0 {
            return Err(ConfigError::invalid(
                "frame",
                format!(
                    "size must be > 0, got {}x{}",
                    self.frame.width, self.frame.height
                ),
            ));
        }
        self.visual_odometry.validate(self.frame.width)?;
        self.view_cells.validate(self.frame.width)?;
        self.pose_cells.validate()?;
        self.experience_map.validate()?;
        if self.pipeline.queue_capacity == 0 {
            return Err(ConfigError::invalid(
                "pipeline.queue_capacity",
                "must be > 0",
            ));
        }
        Ok(())
    }

    /// Shrink the frame and pose grid for fast tests and demos.
    ///
    /// Windows are scaled to keep the same share of the frame width.
    pub fn small(width: usize, height: usize) -> Self {
        let mut config = Self::default();
        config.frame = FrameSection { width, height };
        config.visual_odometry.window = (width / 2).max(1);
        config.view_cells.window = (width * 5 / 32).max(1);
        config.pose_cells.dim_xy = 31;
        config.pose_cells.dim_th = 18;
        config
    }
}
