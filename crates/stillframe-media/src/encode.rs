//! Still-image encoding of transformed rasters.

use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{ExtendedColorType, ImageEncoder, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use stillframe_core::{Raster, Result, StillframeError};

/// Output image format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Lossless, keeps the alpha channel.
    #[default]
    Png,
    /// Lossy, no alpha channel.
    Jpeg,
}

impl OutputFormat {
    /// File extension for this format.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Png => "png",
            Self::Jpeg => "jpeg",
        })
    }
}

impl FromStr for OutputFormat {
    type Err = StillframeError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "png" => Ok(Self::Png),
            "jpg" | "jpeg" => Ok(Self::Jpeg),
            other => Err(StillframeError::InvalidParameter(format!(
                "Unsupported output format {:?}",
                other
            ))),
        }
    }
}

/// Encoding settings applied to every extracted frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EncodeConfig {
    #[serde(default)]
    pub format: OutputFormat,
    /// Quality in `[0, 1]`. Only JPEG uses it.
    #[serde(default = "default_quality")]
    pub quality: f32,
    /// Scale frames to `(width, height)` before encoding.
    #[serde(default)]
    pub resize: Option<(u32, u32)>,
}

fn default_quality() -> f32 {
    0.9
}

impl Default for EncodeConfig {
    fn default() -> Self {
        Self {
            format: OutputFormat::Png,
            quality: default_quality(),
            resize: None,
        }
    }
}

impl EncodeConfig {
    /// JPEG quality on the encoder's 1..=100 scale.
    pub fn jpeg_quality(&self) -> u8 {
        let q = if self.quality.is_finite() {
            self.quality.clamp(0.0, 1.0)
        } else {
            default_quality()
        };
        ((q * 100.0).round() as u8).max(1)
    }
}

/// Encode a raster to PNG or JPEG bytes.
///
/// JPEG has no alpha, so pixels are composited over black the way a canvas
/// export flattens transparency.
pub fn encode(raster: &Raster, config: &EncodeConfig) -> Result<Vec<u8>> {
    let resized;
    let (width, height, rgba): (u32, u32, &[u8]) = match config.resize {
        Some((w, h)) if w == 0 || h == 0 => {
            return Err(StillframeError::InvalidParameter(format!(
                "Output size must be positive, got {}x{}",
                w, h
            )))
        }
        Some((w, h)) if (w, h) != (raster.width(), raster.height()) => {
            let img = RgbaImage::from_raw(raster.width(), raster.height(), raster.data().to_vec())
                .ok_or_else(|| StillframeError::Encoder("Raster buffer size mismatch".into()))?;
            resized = imageops::resize(&img, w, h, FilterType::Triangle);
            (w, h, resized.as_raw().as_slice())
        }
        _ => (raster.width(), raster.height(), raster.data()),
    };

    let mut out = Vec::new();
    match config.format {
        OutputFormat::Png => PngEncoder::new(&mut out)
            .write_image(rgba, width, height, ExtendedColorType::Rgba8)
            .map_err(|e| StillframeError::Encoder(format!("PNG encoding failed: {e}")))?,
        OutputFormat::Jpeg => {
            let rgb = flatten_over_black(rgba);
            JpegEncoder::new_with_quality(&mut out, config.jpeg_quality())
                .write_image(&rgb, width, height, ExtendedColorType::Rgb8)
                .map_err(|e| StillframeError::Encoder(format!("JPEG encoding failed: {e}")))?
        }
    }
    Ok(out)
}

fn flatten_over_black(rgba: &[u8]) -> Vec<u8> {
    let mut rgb = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        let a = px[3] as u16;
        for &c in &px[..3] {
            rgb.push(((c as u16 * a + 127) / 255) as u8);
        }
    }
    rgb
}
