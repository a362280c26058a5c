//! Experience map configuration.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, defaults, non_negative};

/// Experience graph configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ExperienceMapConfig {
    /// Pose-cell distance beyond which the agent is somewhere new
    #[serde(default = "defaults::delta_pc_threshold")]
    pub delta_pc_threshold: f64,

    /// Fraction of each link's discrepancy corrected per relaxation pass
    #[serde(default = "defaults::correction")]
    pub correction: f64,

    /// Relaxation passes after each revisit
    #[serde(default = "defaults::loops")]
    pub loops: usize,

    /// Starting value of the heading accumulator (radians)
    #[serde(default = "defaults::initial_heading")]
    pub initial_heading: f64,
}

impl Default for ExperienceMapConfig {
    fn default() -> Self {
        Self {
            delta_pc_threshold: defaults::delta_pc_threshold(),
            correction: defaults::correction(),
            loops: defaults::loops(),
            initial_heading: defaults::initial_heading(),
        }
    }
}

impl ExperienceMapConfig {
    /// Validate thresholds and the correction fraction.
    pub fn validate(&self) -> Result<(), ConfigError> {
        non_negative("experience_map.delta_pc_threshold", self.delta_pc_threshold)?;
        if !(self.correction > 0.0 && self.correction <= 1.0) {
            return Err(ConfigError::invalid(
                "experience_map.correction",
                format!("must be in (0, 1], got {}", self.correction),
            ));
        }
        if !self.initial_heading.is_finite() {
            return Err(ConfigError::invalid(
                "experience_map.initial_heading",
                format!("must be finite, got {}", self.initial_heading),
            ));
        }
        Ok(())
    }
}
