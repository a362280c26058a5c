//! Pose cell network configuration.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, defaults, non_negative, positive};

/// Continuous attractor network configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PoseCellConfig {
    /// Cells along each planar axis
    #[serde(default = "defaults::dim_xy")]
    pub dim_xy: usize,

    /// Cells along the heading axis
    #[serde(default = "defaults::dim_th")]
    pub dim_th: usize,

    /// Side length of the excitatory kernel (odd)
    #[serde(default = "defaults::excite_dim")]
    pub excite_dim: usize,

    /// Variance of the excitatory Gaussian
    #[serde(default = "defaults::excite_var")]
    pub excite_var: f64,

    /// Side length of the inhibitory kernel (odd)
    #[serde(default = "defaults::inhibit_dim")]
    pub inhibit_dim: usize,

    /// Variance of the inhibitory Gaussian
    #[serde(default = "defaults::inhibit_var")]
    pub inhibit_var: f64,

    /// Uniform activity removed from every cell after local inhibition
    #[serde(default = "defaults::global_inhibition")]
    pub global_inhibition: f64,

    /// Peak energy a fresh view cell injects
    #[serde(default = "defaults::inject_energy")]
    pub inject_energy: f64,

    /// Converts odometry translation into cells per tick
    #[serde(default = "defaults::vtrans_scaling")]
    pub vtrans_scaling: f64,

    /// Half width of the box used for population-vector decoding
    #[serde(default = "defaults::decode_radius")]
    pub decode_radius: usize,
}

impl Default for PoseCellConfig {
    fn default() -> Self {
        Self {
            dim_xy: defaults::dim_xy(),
            dim_th: defaults::dim_th(),
            excite_dim: defaults::excite_dim(),
            excite_var: defaults::excite_var(),
            inhibit_dim: defaults::inhibit_dim(),
            inhibit_var: defaults::inhibit_var(),
            global_inhibition: defaults::global_inhibition(),
            inject_energy: defaults::inject_energy(),
            vtrans_scaling: defaults::vtrans_scaling(),
            decode_radius: defaults::decode_radius(),
        }
    }
}

impl PoseCellConfig {
    /// Heading covered by one cell (radians)
    #[inline]
    pub fn heading_cell_size(&self) -> f64 {
        std::f64::consts::TAU / self.dim_th as f64
    }

    /// Total number of cells
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.dim_xy * self.dim_xy * self.dim_th
    }

    /// Validate extents, kernels and scalars.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dim_xy == 0 {
            return Err(ConfigError::invalid("pose_cells.dim_xy", "must be > 0"));
        }
        if self.dim_th == 0 {
            return Err(ConfigError::invalid("pose_cells.dim_th", "must be > 0"));
        }

        let smallest = self.dim_xy.min(self.dim_th);
        for (field, dim) in [
            ("pose_cells.excite_dim", self.excite_dim),
            ("pose_cells.inhibit_dim", self.inhibit_dim),
        ] {
            if dim == 0 || dim % 2 == 0 || dim > smallest {
                return Err(ConfigError::invalid(
                    field,
                    format!("must be odd and in 1..={}, got {}", smallest, dim),
                ));
            }
        }

        positive("pose_cells.excite_var", self.excite_var)?;
        positive("pose_cells.inhibit_var", self.inhibit_var)?;
        non_negative("pose_cells.global_inhibition", self.global_inhibition)?;
        non_negative("pose_cells.inject_energy", self.inject_energy)?;
        non_negative("pose_cells.vtrans_scaling", self.vtrans_scaling)?;

        if 2 * self.decode_radius + 1 > smallest {
            return Err(ConfigError::invalid(
                "pose_cells.decode_radius",
                format!(
                    "decode box of {} cells exceeds the smallest extent {}",
                    2 * self.decode_radius + 1,
                    smallest
                ),
            ));
        }
        Ok(())
    }
}
