//! Watermark blanking: opaque overpaint of a normalized rectangle.

use stillframe_core::raster::BYTES_PER_PIXEL;
use stillframe_core::{NormalizedRegion, PixelRect, Raster, Rgb};

/// Paint `region` of `raster` with opaque `fill`.
///
/// All four channels are overwritten, so pixels made transparent earlier
/// become opaque again. Returns the painted pixel rectangle, or `None` when
/// the region does not overlap the frame (a no-op, not an error).
pub fn blank_watermark(
    raster: &mut Raster,
    region: &NormalizedRegion,
    fill: Rgb,
) -> Option<PixelRect> {
    let rect = region.to_pixel_rect(raster.width(), raster.height())?;
    let rgba = fill.to_rgba8();
    let stride = raster.width() as usize * BYTES_PER_PIXEL;
    let start = rect.x as usize * BYTES_PER_PIXEL;
    let end = rect.right() as usize * BYTES_PER_PIXEL;

    let data = raster.data_mut();
    for y in rect.y..rect.bottom() {
        let row = &mut data[y as usize * stride..(y as usize + 1) * stride];
        for px in row[start..end].chunks_exact_mut(BYTES_PER_PIXEL) {
            px.copy_from_slice(&rgba);
        }
    }

    Some(rect)
}
