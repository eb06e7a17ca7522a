//! Stillframe Media - video raster sources, encoding and export
//!
//! This crate handles:
//! - The raster source contract and its ffmpeg and in-memory adapters
//! - Media file probing
//! - PNG/JPEG encoding of transformed rasters
//! - Exporting extracted frames to disk

pub mod encode;
pub mod export;
pub mod ffmpeg;
pub mod frame;
pub mod probe;
pub mod source;

pub use encode::{encode, EncodeConfig, OutputFormat};
pub use export::{export_frames, frame_file_name, ExportProgress, ExportSummary, ManifestEntry};
pub use ffmpeg::FfmpegSource;
pub use frame::ExtractedFrame;
pub use probe::MediaProbe;
pub use source::{MemorySource, RasterSource};

/// Log whether the ffmpeg binaries are reachable (call once at startup).
pub fn init() {
    if ffmpeg_sidecar::command::ffmpeg_is_installed() {
        let path = ffmpeg_sidecar::paths::ffmpeg_path();
        tracing::info!(path = %path.display(), "Stillframe media initialized");
    } else {
        tracing::warn!("ffmpeg not found; video files cannot be decoded");
    }
}
