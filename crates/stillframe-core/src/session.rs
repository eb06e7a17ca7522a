//! Per-session state shared by every frame transform.

use crate::color::Rgb;
use crate::raster::Raster;
use crate::region::NormalizedRegion;
use tracing::debug;

/// Background color and watermark region for one extraction session.
///
/// Both values change only through explicit calls; every transform
/// invocation reads them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    background: Option<Rgb>,
    watermark: Option<NormalizedRegion>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// The picked (or defaulted) background color, if any.
    pub fn background(&self) -> Option<Rgb> {
        self.background
    }

    pub fn set_background(&mut self, color: Rgb) {
        self.background = Some(color);
    }

    pub fn clear_background(&mut self) {
        self.background = None;
    }

    pub fn watermark(&self) -> Option<NormalizedRegion> {
        self.watermark
    }

    pub fn set_watermark(&mut self, region: NormalizedRegion) {
        self.watermark = Some(region);
    }

    pub fn clear_watermark(&mut self) {
        self.watermark = None;
    }

    /// Background color to key against.
    ///
    /// When none has been picked yet, the top-left pixel of `raster` becomes
    /// the session color and stays until explicitly changed. An empty raster
    /// has no top-left pixel; it gets the fill color and nothing is stored.
    pub fn resolve_background(&mut self, raster: &Raster) -> Rgb {
        match self.background {
            Some(color) => color,
            None if raster.is_empty() => self.fill_color(),
            None => {
                let color = Rgb::from_rgba8(raster.pixel(0, 0));
                debug!(color = %color, "Defaulting background color from top-left pixel");
                self.background = Some(color);
                color
            }
        }
    }

    /// Fill color for watermark blanking: the session background, else white.
    pub fn fill_color(&self) -> Rgb {
        self.background.unwrap_or(Rgb::WHITE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_background_defaults_from_first_raster() {
        let mut session = Session::new();
        assert_eq!(session.fill_color(), Rgb::WHITE);

        let mut first = Raster::solid(4, 4, [200, 10, 10, 255]);
        first.set_pixel(0, 0, [1, 2, 3, 255]);
        assert_eq!(session.resolve_background(&first), Rgb::new(1, 2, 3));

        // Persisted: a later raster does not change it
        let second = Raster::solid(4, 4, [9, 9, 9, 255]);
        assert_eq!(session.resolve_background(&second), Rgb::new(1, 2, 3));
        assert_eq!(session.fill_color(), Rgb::new(1, 2, 3));
    }

    #[test]
    fn test_empty_raster_does_not_pick_background() {
        let mut session = Session::new();
        let empty = Raster::new(0, 0);
        assert!(empty.is_empty());
        assert_eq!(session.resolve_background(&empty), Rgb::WHITE);
        assert_eq!(session.background(), None);

        // The next real frame still supplies the color
        let frame = Raster::solid(2, 2, [7, 8, 9, 255]);
        assert_eq!(session.resolve_background(&frame), Rgb::new(7, 8, 9));
    }

    #[test]
    fn test_explicit_background_wins() {
        let mut session = Session::new();
        session.set_background(Rgb::GREEN);
        let raster = Raster::solid(2, 2, [0, 0, 0, 255]);
        assert_eq!(session.resolve_background(&raster), Rgb::GREEN);

        session.clear_background();
        assert_eq!(session.background(), None);
    }

    #[test]
    fn test_watermark_state() {
        let mut session = Session::new();
        assert!(session.watermark().is_none());
        let region = NormalizedRegion::new(0.1, 0.1, 0.2, 0.2);
        session.set_watermark(region);
        assert_eq!(session.watermark(), Some(region));
        session.clear_watermark();
        assert!(session.watermark().is_none());
    }
}
