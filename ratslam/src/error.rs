//! Error types for RatSLAM

use crate::config::ConfigError;

/// Result type alias
pub type Result<T> = std::result::Result<T, SlamError>;

/// RatSLAM error types
#[derive(Debug, thiserror::Error)]
pub enum SlamError {
    /// Invalid configuration, rejected at initialization
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    /// Frame does not match the configured image shape
    #[error("Input error: expected {expected_width}x{expected_height} frame, got {width}x{height}")]
    Input {
        /// Configured width in pixels
        expected_width: usize,
        /// Configured height in pixels
        expected_height: usize,
        /// Width of the rejected frame
        width: usize,
        /// Height of the rejected frame
        height: usize,
    },

    /// Pixel buffer length does not match the declared frame size
    #[error("Invalid frame buffer: {width}x{height} needs {expected} pixels, got {actual}")]
    FrameBuffer {
        /// Declared width
        width: usize,
        /// Declared height
        height: usize,
        /// Pixels required by the declared size
        expected: usize,
        /// Pixels supplied
        actual: usize,
    },

    /// Broken arena reference between experiences and view cells
    #[error("Graph invariant violated: {0}")]
    GraphInvariant(String),

    /// Background worker has shut down
    #[error("SLAM worker stopped")]
    WorkerStopped,

    /// Background worker thread could not be started
    #[error("Failed to spawn SLAM worker: {0}")]
    Spawn(#[from] std::io::Error),
}
