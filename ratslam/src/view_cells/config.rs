//! View-cell store configuration.

use serde::{Deserialize, Serialize};

use crate::config::{ConfigError, defaults, non_negative, positive};

/// View-cell matching configuration
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ViewCellConfig {
    /// Template window used when comparing against stored cells (columns)
    #[serde(default = "defaults::view_cell_window")]
    pub window: usize,

    /// Scaled distance above which a frame is a new place.
    /// Scores are template distance multiplied by signature length.
    #[serde(default = "defaults::view_cell_threshold")]
    pub match_threshold: f64,

    /// Added to a cell's decay accumulator every time it is re-observed
    #[serde(default = "defaults::active_decay")]
    pub active_decay: f64,
}

impl Default for ViewCellConfig {
    fn default() -> Self {
        Self {
            window: defaults::view_cell_window(),
            match_threshold: defaults::view_cell_threshold(),
            active_decay: defaults::active_decay(),
        }
    }
}

impl ViewCellConfig {
    /// Validate against the configured frame width.
    pub fn validate(&self, frame_width: usize) -> Result<(), ConfigError> {
        if self.window == 0 || self.window + 2 > frame_width {
            return Err(ConfigError::invalid(
                "view_cells.window",
                format!(
                    "must be in 1..={} for a {} column frame, got {}",
                    frame_width.saturating_sub(2),
                    frame_width,
                    self.window
                ),
            ));
        }
        non_negative("view_cells.match_threshold", self.match_threshold)?;
        positive("view_cells.active_decay", self.active_decay)?;
        Ok(())
    }
}
