//! Core types for the RatSLAM library.
//!
//! ## Type Categories
//!
//! ### Input
//! - [`Frame`]: Grayscale camera image, row-major
//!
//! ### Stage Outputs
//! - [`Odometry`]: Per-tick translation and rotation estimate
//! - [`PoseEstimate`]: Continuous (x, y, heading) in pose-cell units
//!
//! ### Angles
//! - [`wrap180`], [`wrap360`]: Angle normalization
//! - [`signed_delta`]: Shortest signed rotation between two angles
//! - [`toroidal_delta`]: Ring distance for pose-cell coordinates

mod angle;
mod frame;
mod types;

pub use angle::{signed_delta, toroidal_delta, wrap180, wrap360};
pub use frame::Frame;
pub use types::{EPSILON, Odometry, PoseEstimate};
