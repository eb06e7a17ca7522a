//! Error types for Stillframe.

use thiserror::Error;

/// Main error type for Stillframe operations.
#[derive(Error, Debug)]
pub enum StillframeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("No matching frame found: {0}")]
    NoMatchFound(String),

    #[error("Seek to {timestamp:.3}s timed out after {timeout_secs:.1}s")]
    SeekTimeout { timestamp: f64, timeout_secs: f64 },

    #[error("Seek to {timestamp:.3}s is outside the video (duration {duration:.3}s)")]
    SeekOutOfRange { timestamp: f64, duration: f64 },

    #[error("Seek to {timestamp:.3}s failed: {reason}")]
    SeekFailed { timestamp: f64, reason: String },

    #[error("Raster dimensions differ: {left_width}x{left_height} vs {right_width}x{right_height}")]
    DimensionMismatch {
        left_width: u32,
        left_height: u32,
        right_width: u32,
        right_height: u32,
    },

    #[error("Decoder error: {0}")]
    Decoder(String),

    #[error("Encoder error: {0}")]
    Encoder(String),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl StillframeError {
    /// Whether the adapter failed to render a timestamp.
    ///
    /// Seek failures are per-frame: the orchestrator skips the timestamp
    /// and keeps going.
    pub fn is_seek_failure(&self) -> bool {
        matches!(
            self,
            Self::SeekTimeout { .. } | Self::SeekOutOfRange { .. } | Self::SeekFailed { .. }
        )
    }
}

/// Result type alias for Stillframe operations.
pub type Result<T> = std::result::Result<T, StillframeError>;
