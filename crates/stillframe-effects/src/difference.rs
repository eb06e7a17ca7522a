//! Frame similarity metric used by start/end detection.

use stillframe_core::raster::BYTES_PER_PIXEL;
use stillframe_core::{Raster, Result, StillframeError};

/// Mean absolute channel difference between two rasters.
///
/// Sums `|R1-R2| + |G1-G2| + |B1-B2|` over all pixels and divides by
/// `pixel_count * 3`, giving a value in `[0, 255]`. Alpha is ignored.
pub fn mean_absolute_difference(a: &Raster, b: &Raster) -> Result<f64> {
    if a.width() != b.width() || a.height() != b.height() {
        return Err(StillframeError::DimensionMismatch {
            left_width: a.width(),
            left_height: a.height(),
            right_width: b.width(),
            right_height: b.height(),
        });
    }

    let total: u64 = a
        .data()
        .chunks_exact(BYTES_PER_PIXEL)
        .zip(b.data().chunks_exact(BYTES_PER_PIXEL))
        .map(|(pa, pb)| {
            (0..3)
                .map(|c| pa[c].abs_diff(pb[c]) as u64)
                .sum::<u64>()
        })
        .sum();

    Ok(total as f64 / (a.pixel_count() as f64 * 3.0))
}
