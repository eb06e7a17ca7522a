//! Resolution-independent watermark regions.

use crate::error::StillframeError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A rectangle expressed as fractions of frame width and height.
///
/// Invariant: every field lies in `[0, 1]`, `left + width <= 1` and
/// `top + height <= 1`. Values are clamped on construction, including
/// when deserialized.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "RegionFields")]
pub struct NormalizedRegion {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

#[derive(Deserialize)]
struct RegionFields {
    left: f64,
    top: f64,
    width: f64,
    height: f64,
}

impl From<RegionFields> for NormalizedRegion {
    fn from(f: RegionFields) -> Self {
        Self::new(f.left, f.top, f.width, f.height)
    }
}

fn unit(v: f64) -> f64 {
    if v.is_finite() {
        v.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

impl NormalizedRegion {
    /// Create a region, clamping it into the unit square.
    pub fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        let left = unit(left);
        let top = unit(top);
        let width = unit(width).min(1.0 - left);
        let height = unit(height).min(1.0 - top);
        Self {
            left,
            top,
            width,
            height,
        }
    }

    #[inline]
    pub fn left(&self) -> f64 {
        self.left
    }

    #[inline]
    pub fn top(&self) -> f64 {
        self.top
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Convert to integer pixel bounds for a `frame_width` x `frame_height`
    /// frame, clamped to the frame.
    ///
    /// Returns `None` when nothing of the region remains inside the frame.
    pub fn to_pixel_rect(&self, frame_width: u32, frame_height: u32) -> Option<PixelRect> {
        let fw = frame_width as i64;
        let fh = frame_height as i64;

        let x = (self.left * fw as f64).round() as i64;
        let y = (self.top * fh as f64).round() as i64;
        let w = (self.width * fw as f64).round() as i64;
        let h = (self.height * fh as f64).round() as i64;

        let x = x.max(0);
        let y = y.max(0);
        let w = w.min(fw - x);
        let h = h.min(fh - y);

        if w <= 0 || h <= 0 {
            return None;
        }

        Some(PixelRect {
            x: x as u32,
            y: y as u32,
            width: w as u32,
            height: h as u32,
        })
    }
}

/// Integer pixel rectangle inside a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PixelRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    /// Exclusive right edge.
    #[inline]
    pub fn right(&self) -> u32 {
        self.x + self.width
    }

    /// Exclusive bottom edge.
    #[inline]
    pub fn bottom(&self) -> u32 {
        self.y + self.height
    }

    #[inline]
    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }
}

/// Known watermark placements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WatermarkPreset {
    /// Bottom-right strip used by the Doubao video generator.
    Doubao,
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl WatermarkPreset {
    pub const ALL: [Self; 5] = [
        Self::Doubao,
        Self::TopLeft,
        Self::TopRight,
        Self::BottomLeft,
        Self::BottomRight,
    ];

    /// Preset name as accepted by [`FromStr`].
    pub fn name(self) -> &'static str {
        match self {
            Self::Doubao => "doubao",
            Self::TopLeft => "top-left",
            Self::TopRight => "top-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomRight => "bottom-right",
        }
    }

    /// The region covered by this preset.
    pub fn region(self) -> NormalizedRegion {
        match self {
            Self::Doubao => NormalizedRegion::new(0.84, 0.96, 0.15, 0.04),
            Self::TopLeft => NormalizedRegion::new(0.01, 0.01, 0.2, 0.1),
            Self::TopRight => NormalizedRegion::new(0.79, 0.01, 0.2, 0.1),
            Self::BottomLeft => NormalizedRegion::new(0.01, 0.89, 0.2, 0.1),
            Self::BottomRight => NormalizedRegion::new(0.79, 0.89, 0.2, 0.1),
        }
    }
}

impl fmt::Display for WatermarkPreset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for WatermarkPreset {
    type Err = StillframeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                StillframeError::InvalidParameter(format!("Unknown watermark preset {:?}", s))
            })
    }
}
