//! Visual odometry from consecutive frame signatures.
//!
//! The column profile of the current frame is aligned against the previous
//! one. The residual L1 distance of the best alignment stands in for
//! forward speed and the column offset for rotation.
//!
//! # Example
//!
//! ```rust
//! use ratslam::core::Frame;
//! use ratslam::odometry::{VisualOdometry, VisualOdometryConfig};
//!
//! let config = VisualOdometryConfig { window: 4, ..Default::default() };
//! let mut vo = VisualOdometry::new(config);
//!
//! let frame = Frame::from_column_profile(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0], 2);
//!
//! // First frame only primes the estimator
//! assert!(vo.process_frame(&frame).is_none());
//!
//! // Identical frame: no motion
//! let odom = vo.process_frame(&frame).unwrap();
//! assert_eq!(odom.vtrans, 0.0);
//! assert_eq!(odom.vrot, 0.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, defaults, positive};
use crate::core::{Frame, Odometry};
use crate::matching::{Signature, compare};

/// Visual odometry configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VisualOdometryConfig {
    /// Template window compared between consecutive frames (columns)
    #[serde(default = "defaults::odometry_window")]
    pub window: usize,

    /// Multiplier turning template distance into translation
    #[serde(default = "defaults::translation_scale")]
    pub translation_scale: f64,

    /// Multiplier turning column offset into rotation (radians per column)
    #[serde(default = "defaults::rotation_scale")]
    pub rotation_scale: f64,
}

impl Default for VisualOdometryConfig {
    fn default() -> Self {
        Self {
            window: defaults::odometry_window(),
            translation_scale: defaults::translation_scale(),
            rotation_scale: defaults::rotation_scale(),
        }
    }
}

impl VisualOdometryConfig {
    /// Derive the rotation scale from the camera's horizontal field of view.
    ///
    /// Each column then spans `fov_deg / width` degrees.
    pub fn with_camera_fov(mut self, fov_deg: f64, width: usize) -> Self {
        if width > 0 {
            self.rotation_scale = (fov_deg / width as f64).to_radians();
        }
        self
    }

    /// Validate against the configured frame width.
    pub fn validate(&self, frame_width: usize) -> Result<(), ConfigError> {
        if self.window == 0 || self.window + 2 > frame_width {
            return Err(ConfigError::invalid(
                "visual_odometry.window",
                format!(
                    "must be in 1..={} for a {} column frame, got {}",
                    frame_width.saturating_sub(2),
                    frame_width,
                    self.window
                ),
            ));
        }
        positive("visual_odometry.translation_scale", self.translation_scale)?;
        if !self.rotation_scale.is_finite() {
            return Err(ConfigError::invalid(
                "visual_odometry.rotation_scale",
                format!("must be finite, got {}", self.rotation_scale),
            ));
        }
        Ok(())
    }
}

/// Frame-to-frame self-motion estimator.
#[derive(Clone, Debug)]
pub struct VisualOdometry {
    config: VisualOdometryConfig,
    previous: Option<Signature>,
}

impl VisualOdometry {
    /// Create a new estimator with no reference frame.
    pub fn new(config: VisualOdometryConfig) -> Self {
        Self {
            config,
            previous: None,
        }
    }

    /// Estimate motion for a frame.
    ///
    /// See [`process`](Self::process).
    pub fn process_frame(&mut self, frame: &Frame) -> Option<Odometry> {
        self.process(&Signature::from_frame(frame))
    }

    /// Estimate motion from the signature of the newest frame.
    ///
    /// The first call stores the signature and returns `None`. Every later
    /// call aligns against the stored signature, replaces it, and returns
    /// the scaled (distance, offset) pair.
    pub fn process(&mut self, signature: &Signature) -> Option<Odometry> {
        let Some(previous) = self.previous.replace(signature.clone()) else {
            log::trace!("Visual odometry primed");
            return None;
        };

        let result = compare(signature.values(), previous.values(), self.config.window);
        if !result.distance.is_finite() {
            log::warn!(
                "Visual odometry found no comparable alignment (window {}, {} columns)",
                self.config.window,
                signature.len()
            );
            return Some(Odometry::zero());
        }

        let odometry = Odometry::new(
            result.distance * self.config.translation_scale,
            result.offset as f64 * self.config.rotation_scale,
        );
        log::trace!(
            "Visual odometry: offset={} distance={:.5} -> vtrans={:.4} vrot={:.4}",
            result.offset,
            result.distance,
            odometry.vtrans,
            odometry.vrot
        );

        Some(odometry)
    }

    /// Forget the reference frame; the next frame primes again.
    pub fn reset(&mut self) {
        self.previous = None;
    }

    /// Check whether a reference frame is stored
    #[inline]
    pub fn is_primed(&self) -> bool {
        self.previous.is_some()
    }

    /// Get the configuration
    pub fn config(&self) -> &VisualOdometryConfig {
        &self.config
    }
}
