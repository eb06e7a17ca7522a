//! Stillframe Core - Foundation types for frame extraction
//!
//! This crate provides the fundamental types used throughout Stillframe:
//! - RGBA rasters decoded from a video timestamp
//! - Background colors and normalized watermark regions
//! - The per-session state shared by every frame transform
//! - Error taxonomy and timestamp formatting

pub mod color;
pub mod error;
pub mod raster;
pub mod region;
pub mod session;
pub mod time;

pub use color::Rgb;
pub use error::{Result, StillframeError};
pub use raster::Raster;
pub use region::{NormalizedRegion, PixelRect, WatermarkPreset};
pub use session::Session;
pub use time::format_timestamp;
