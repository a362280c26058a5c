//! Unified configuration loading for RatSLAM.
//!
//! Loads all configuration from a single YAML file with sensible defaults.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use ratslam::config::RatSlamConfig;
//!
//! // Load from default path (configs/ratslam.yaml)
//! let config = RatSlamConfig::load_default()?;
//!
//! // Or use built-in defaults (no file needed)
//! let config = RatSlamConfig::default();
//! ```
//!
//! ## Configuration Sections
//!
//! | Section | Description |
//! |---------|-------------|
//! | [`FrameSection`] | Expected image width and height |
//! | [`VisualOdometryConfig`](crate::odometry::VisualOdometryConfig) | Odometry window and scales |
//! | [`ViewCellConfig`](crate::view_cells::ViewCellConfig) | Place recognition window and threshold |
//! | [`PoseCellConfig`](crate::pose_cells::PoseCellConfig) | Grid extents, kernels, inhibition |
//! | [`ExperienceMapConfig`](crate::experience_map::ExperienceMapConfig) | Matching threshold and relaxation |
//! | [`PipelineSection`] | Worker queue capacity |
//!
//! ## Example YAML
//!
//! ```yaml
//! frame:
//!   width: 160
//!   height: 120
//!
//! view_cells:
//!   match_threshold: 0.3   # scaled template distance
//!
//! pose_cells:
//!   dim_xy: 61
//!   dim_th: 36             # 10 degrees per heading cell
//!
//! experience_map:
//!   loops: 100             # relaxation passes per loop closure
//! ```

pub(crate) mod defaults;
mod error;
mod ratslam;

pub use error::{ConfigError, ConfigLoadError};
pub(crate) use error::{non_negative, positive};
pub use ratslam::{FrameSection, PipelineSection, RatSlamConfig};
