//! Pose cells: a continuous attractor network for path integration.
//!
//! ## Overview
//!
//! Activity lives on a `dim_xy x dim_xy x dim_th` grid that wraps on every
//! axis. Each update:
//!
//! 1. Injects energy at the pose of a recognised view cell
//! 2. Applies local excitation and local inhibition (Gaussian kernels)
//! 3. Applies global inhibition and normalizes to sum 1
//! 4. Shifts each heading slice along its own direction by the translation
//! 5. Shifts along the heading axis by the rotation
//! 6. Decodes the pose around the most active cell
//!
//! ## Example
//!
//! ```rust
//! use ratslam::pose_cells::{PoseCellConfig, PoseCellNetwork};
//!
//! let mut network = PoseCellNetwork::new(PoseCellConfig::default()).unwrap();
//! let update = network.update(None, 0.0, 0.0);
//!
//! assert!((network.total() - 1.0).abs() < 1e-9);
//! assert!((update.estimate.x - 30.0).abs() < 1e-6);
//! ```

mod config;
mod kernel;
mod network;

pub use config::PoseCellConfig;
pub use kernel::{CircularTable, Kernel, WrapTable};
pub use network::{CellIndex, InjectionSite, PoseCellNetwork, PoseCellUpdate};
