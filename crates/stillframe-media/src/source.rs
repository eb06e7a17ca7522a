//! The raster source contract.

use stillframe_core::{Raster, Result, StillframeError};
use tracing::debug;

/// Something that can render the video at an arbitrary timestamp.
///
/// Sources own a single decode context, so rendering takes `&mut self`:
/// callers await each frame before requesting the next. Timestamps may
/// arrive in any order and may repeat.
#[allow(async_fn_in_trait)]
pub trait RasterSource {
    /// Seek to `timestamp` seconds and render an RGBA raster at native
    /// resolution.
    async fn seek_and_render(&mut self, timestamp: f64) -> Result<Raster>;

    /// Total duration in seconds.
    fn duration(&self) -> f64;

    /// Native frame size as `(width, height)`.
    fn native_resolution(&self) -> (u32, u32);
}

/// Reject timestamps outside `[0, duration]`.
pub(crate) fn check_range(timestamp: f64, duration: f64) -> Result<()> {
    if !timestamp.is_finite() || timestamp < 0.0 || timestamp > duration {
        return Err(StillframeError::SeekOutOfRange {
            timestamp,
            duration,
        });
    }
    Ok(())
}

/// A source backed by rasters already in memory.
///
/// Each keyframe holds from its timestamp until the next one, the way a
/// decoder shows the last frame at or before the requested time.
#[derive(Debug, Clone)]
pub struct MemorySource {
    width: u32,
    height: u32,
    duration: f64,
    keyframes: Vec<(f64, Raster)>,
    seek_count: usize,
}

impl MemorySource {
    /// Create an empty source with the given duration and frame size.
    pub fn new(duration: f64, width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            duration,
            keyframes: Vec::new(),
            seek_count: 0,
        }
    }

    /// Add a keyframe at `timestamp`. The raster must match the source size.
    pub fn push_keyframe(&mut self, timestamp: f64, raster: Raster) -> Result<()> {
        if raster.width() != self.width || raster.height() != self.height {
            return Err(StillframeError::DimensionMismatch {
                left_width: self.width,
                left_height: self.height,
                right_width: raster.width(),
                right_height: raster.height(),
            });
        }
        check_range(timestamp, self.duration)?;
        let pos = self.keyframes.partition_point(|(t, _)| *t <= timestamp);
        self.keyframes.insert(pos, (timestamp, raster));
        Ok(())
    }

    /// Builder form of [`push_keyframe`](Self::push_keyframe).
    pub fn with_keyframe(mut self, timestamp: f64, raster: Raster) -> Result<Self> {
        self.push_keyframe(timestamp, raster)?;
        Ok(self)
    }

    /// Number of renders served so far.
    pub fn seek_count(&self) -> usize {
        self.seek_count
    }
}

impl RasterSource for MemorySource {
    async fn seek_and_render(&mut self, timestamp: f64) -> Result<Raster> {
        check_range(timestamp, self.duration)?;
        self.seek_count += 1;

        let pos = self.keyframes.partition_point(|(t, _)| *t <= timestamp);
        let (keyframe_time, raster) = pos
            .checked_sub(1)
            .and_then(|i| self.keyframes.get(i))
            .ok_or_else(|| StillframeError::SeekFailed {
                timestamp,
                reason: "no frame at or before this time".into(),
            })?;

        debug!(timestamp, keyframe_time, "Rendered in-memory frame");
        Ok(raster.clone())
    }

    fn duration(&self) -> f64 {
        self.duration
    }

    fn native_resolution(&self) -> (u32, u32) {
        (self.width, self.height)
    }
}
