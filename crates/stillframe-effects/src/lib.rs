//! Stillframe Effects - CPU pixel transforms for extracted frames
//!
//! Provides background color keying, watermark blanking, and the raster
//! difference metric used for start/end detection.

pub mod difference;
pub mod keying;
pub mod watermark;

pub use difference::mean_absolute_difference;
pub use keying::{BackgroundKeyParams, BackgroundKeyer, KeyMode};
pub use watermark::blank_watermark;

use serde::{Deserialize, Serialize};
use stillframe_core::{Raster, Session};
use tracing::debug;

/// Which transforms to apply to each extracted frame.
///
/// The watermark region and background color come from the [`Session`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TransformConfig {
    /// Background keying, when enabled.
    #[serde(default)]
    pub background: Option<BackgroundKeyParams>,
    /// Blank the session watermark region.
    #[serde(default)]
    pub remove_watermark: bool,
}

impl TransformConfig {
    /// Whether applying this config leaves every raster unchanged.
    pub fn is_identity(&self) -> bool {
        self.background.is_none() && !self.remove_watermark
    }

    /// Apply the configured transforms in place.
    ///
    /// Watermark blanking always runs before background keying.
    pub fn apply(&self, raster: &mut Raster, session: &mut Session) {
        if self.remove_watermark {
            match session.watermark() {
                Some(region) => {
                    let painted = blank_watermark(raster, &region, session.fill_color());
                    debug!(?painted, "Blanked watermark region");
                }
                None => debug!("Watermark removal enabled but no region is set"),
            }
        }

        if let Some(params) = &self.background {
            let color = session.resolve_background(raster);
            let keyed = BackgroundKeyer::key_background(raster, color, params);
            debug!(keyed, mode = ?params.mode, "Keyed background");
        }
    }
}
