//! # RatSLAM
//!
//! Appearance-based SLAM with a pose-cell attractor network and a
//! topological experience map.
//!
//! ## Overview
//!
//! Every camera frame passes through four stages:
//!
//! - **Visual odometry**: the column profile of the frame is aligned against
//!   the previous one to estimate translation and rotation
//! - **View cells**: the profile is matched against remembered places
//! - **Pose cells**: a 3-D toroidal attractor network integrates the motion
//!   and is pulled toward the pose stored with a recognised place
//! - **Experience map**: a graph of places linked by odometry, relaxed each
//!   time a loop closes
//!
//! [`RatSlam`] runs the stages in order for one frame per
//! [`step`](RatSlam::step). [`pipeline::SlamWorker`] runs the same loop on
//! a background thread.
//!
//! ## Quick Start
//!
//! ```rust
//! use ratslam::{Frame, RatSlam, RatSlamConfig};
//!
//! let config = RatSlamConfig::small(32, 4);
//! let mut slam = RatSlam::new(config).unwrap();
//!
//! let profile: Vec<f64> = (0..32).map(|i| 1.0 + (i as f64 * 0.4).sin()).collect();
//! let frame = Frame::from_column_profile(&profile, 4);
//!
//! let output = slam.step(&frame).unwrap();
//! assert!(output.view_cell_created);
//! assert_eq!(slam.experience_map().len(), 1);
//! ```
//!
//! ## Units
//!
//! - Pose estimates are in pose-cell index units, wrapped per axis
//! - Map coordinates accumulate odometry translation
//! - Angles are radians, CCW positive

#![warn(missing_docs)]

// Core types and angle utilities
pub mod core;

// Unified configuration
pub mod config;

// Error types
pub mod error;

// Frame signatures and template alignment
pub mod matching;

// Frame-to-frame motion estimate
pub mod odometry;

// Place recognition
pub mod view_cells;

// Attractor network
pub mod pose_cells;

// Topological map
pub mod experience_map;

// Background worker
pub mod pipeline;

pub use core::{Frame, Odometry, PoseEstimate};

pub use config::{ConfigError, ConfigLoadError, RatSlamConfig};

pub use error::{Result, SlamError};

pub use matching::{Signature, TemplateMatch, compare, signature_of};

pub use odometry::{VisualOdometry, VisualOdometryConfig};

pub use view_cells::{ViewCell, ViewCellConfig, ViewCellId, ViewCellMatch, ViewCellStore};

pub use pose_cells::{InjectionSite, PoseCellConfig, PoseCellNetwork, PoseCellUpdate};

pub use experience_map::{
    Experience, ExperienceId, ExperienceMap, ExperienceMapConfig, MapDelta, MapSnapshot,
    MatchOutcome, RelaxationReport,
};

/// Recoverable numeric problem seen during a step
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Anomaly {
    /// Frame had no usable intensity; the uniform signature was used
    DegenerateFrame,
    /// Pose cell activity vanished and was reseeded at the last peak
    PoseActivityCollapsed,
}

/// Result of processing one frame
#[derive(Clone, Debug)]
pub struct StepOutput {
    /// Zero-based index of the frame since creation or reset
    pub tick: u64,
    /// Decoded pose-cell estimate after this frame
    pub pose: PoseEstimate,
    /// Active view cell
    pub view_cell: ViewCellId,
    /// True if the view cell was created for this frame
    pub view_cell_created: bool,
    /// Motion estimated from the previous frame (zero on the first)
    pub odometry: Odometry,
    /// Changes to the experience map
    pub map_delta: MapDelta,
    /// Recovered numeric problems
    pub anomalies: Vec<Anomaly>,
}

/// The RatSLAM estimator.
///
/// Owns one instance of every stage. Nothing is shared between instances.
#[derive(Clone, Debug)]
pub struct RatSlam {
    config: RatSlamConfig,
    odometry: VisualOdometry,
    view_cells: ViewCellStore,
    pose_cells: PoseCellNetwork,
    experience_map: ExperienceMap,
    ticks: u64,
}

impl RatSlam {
    /// Validate the configuration and build every stage.
    pub fn new(config: RatSlamConfig) -> Result<Self> {
        config.validate()?;

        let pose_cells = PoseCellNetwork::new(config.pose_cells.clone())?;
        let experience_map = ExperienceMap::new(
            config.experience_map.clone(),
            config.pose_cells.dim_xy,
            config.pose_cells.dim_th,
        );
        log::info!(
            "RatSLAM initialized: {}x{} frames, {}x{}x{} pose cells",
            config.frame.width,
            config.frame.height,
            config.pose_cells.dim_xy,
            config.pose_cells.dim_xy,
            config.pose_cells.dim_th
        );

        Ok(Self {
            odometry: VisualOdometry::new(config.visual_odometry.clone()),
            view_cells: ViewCellStore::new(config.view_cells.clone()),
            pose_cells,
            experience_map,
            ticks: 0,
            config,
        })
    }

    /// Process one frame.
    ///
    /// A frame of the wrong shape, or a view cell or link naming a missing
    /// experience, is rejected before any state changes.
    pub fn step(&mut self, frame: &Frame) -> Result<StepOutput> {
        let expected = &self.config.frame;
        if frame.width() != expected.width || frame.height() != expected.height {
            return Err(SlamError::Input {
                expected_width: expected.width,
                expected_height: expected.height,
                width: frame.width(),
                height: frame.height(),
            });
        }

        self.check_arena()?;

        let tick = self.ticks;
        self.ticks += 1;
        let mut anomalies = Vec::new();

        let signature = Signature::from_frame(frame);
        if signature.is_degenerate() {
            anomalies.push(Anomaly::DegenerateFrame);
        }

        let odometry = self.odometry.process(&signature).unwrap_or_default();

        // View cells are anchored at the pose committed on the previous tick
        let previous_pose = self.pose_cells.estimate();
        let matched = self.view_cells.observe(&signature, previous_pose);
        let view_cell = self.view_cells.get(matched.id).ok_or_else(|| {
            SlamError::GraphInvariant(format!("view cell {} missing after observe", matched.id))
        })?;

        let injection = (!matched.created).then(|| InjectionSite::from(view_cell));
        let update = self
            .pose_cells
            .update(injection, odometry.vtrans, odometry.vrot);
        if update.reseeded {
            anomalies.push(Anomaly::PoseActivityCollapsed);
        }

        let map_delta = self
            .experience_map
            .update(view_cell, odometry, update.estimate)?;
        if let Some(created) = map_delta.created {
            self.view_cells.attach_experience(matched.id, created)?;
        }

        log::debug!(
            "Tick {}: {} ({}), {} -> {:?}",
            tick,
            matched.id,
            if matched.created { "new" } else { "seen" },
            map_delta.current,
            map_delta.outcome
        );

        Ok(StepOutput {
            tick,
            pose: update.estimate,
            view_cell: matched.id,
            view_cell_created: matched.created,
            odometry,
            map_delta,
            anomalies,
        })
    }

    /// Every id stored by a view cell or a link must name an existing
    /// experience. Checked before a tick touches any stage.
    fn check_arena(&self) -> Result<()> {
        let experiences = self.experience_map.len();
        for cell in self.view_cells.iter() {
            if let Some(id) = cell.experiences().iter().find(|id| id.0 >= experiences) {
                return Err(SlamError::GraphInvariant(format!(
                    "{} lists unknown experience {}",
                    cell.id(),
                    id
                )));
            }
        }
        self.experience_map.check_links()
    }

    /// Export the experience map
    pub fn snapshot(&self) -> MapSnapshot {
        self.experience_map.snapshot()
    }

    /// Return every stage to its initial state.
    pub fn reset(&mut self) {
        self.odometry.reset();
        self.view_cells.reset();
        self.pose_cells.reset();
        self.experience_map.reset();
        self.ticks = 0;
        log::info!("RatSLAM reset");
    }

    /// Frames processed since creation or reset
    #[inline]
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Get the configuration
    pub fn config(&self) -> &RatSlamConfig {
        &self.config
    }

    /// Visual odometry stage
    pub fn odometry(&self) -> &VisualOdometry {
        &self.odometry
    }

    /// View cell store
    pub fn view_cells(&self) -> &ViewCellStore {
        &self.view_cells
    }

    /// Pose cell network
    pub fn pose_cells(&self) -> &PoseCellNetwork {
        &self.pose_cells
    }

    /// Experience map
    pub fn experience_map(&self) -> &ExperienceMap {
        &self.experience_map
    }
}
