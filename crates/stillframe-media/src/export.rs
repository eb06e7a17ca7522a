//! Export extracted frames to a directory.
//!
//! Frames are written as `frames/frame_<n>.<ext>` with `n` the 1-based
//! sequence index, next to a `manifest.json` describing each file.

use crate::encode::OutputFormat;
use crate::frame::ExtractedFrame;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use stillframe_core::{Result, StillframeError};
use tracing::info;

/// Subdirectory that receives the frame files.
pub const FRAMES_DIR: &str = "frames";

/// Manifest file name.
pub const MANIFEST_FILE: &str = "manifest.json";

/// File name for the frame at 0-based `index`.
pub fn frame_file_name(index: usize, format: OutputFormat) -> String {
    format!("frame_{}.{}", index + 1, format.extension())
}

/// Export progress information.
#[derive(Debug, Clone, Copy)]
pub struct ExportProgress {
    /// Frames written so far.
    pub current_frame: usize,
    /// Total frames to write.
    pub total_frames: usize,
}

impl ExportProgress {
    /// Completion percentage (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        if self.total_frames == 0 {
            return 0.0;
        }
        self.current_frame as f64 / self.total_frames as f64
    }
}

/// One manifest record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestEntry {
    /// Path relative to the export directory.
    pub file: String,
    pub index: usize,
    pub timestamp: f64,
    pub label: String,
}

/// Result of an export.
#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub frame_paths: Vec<PathBuf>,
    pub manifest_path: PathBuf,
}

/// Write `frames` below `out_dir`.
///
/// * `on_progress` – called after each frame is written.
pub fn export_frames(
    out_dir: &Path,
    frames: &[ExtractedFrame],
    on_progress: impl Fn(ExportProgress),
) -> Result<ExportSummary> {
    if frames.is_empty() {
        return Err(StillframeError::InvalidParameter(
            "No frames to export".into(),
        ));
    }

    let frames_dir = out_dir.join(FRAMES_DIR);
    fs::create_dir_all(&frames_dir)?;

    let mut frame_paths = Vec::with_capacity(frames.len());
    let mut manifest = Vec::with_capacity(frames.len());

    for (n, frame) in frames.iter().enumerate() {
        let name = frame_file_name(frame.index, frame.format);
        let path = frames_dir.join(&name);
        fs::write(&path, &frame.bytes)?;

        manifest.push(ManifestEntry {
            file: format!("{}/{}", FRAMES_DIR, name),
            index: frame.index,
            timestamp: frame.timestamp,
            label: frame.label(),
        });
        frame_paths.push(path);

        on_progress(ExportProgress {
            current_frame: n + 1,
            total_frames: frames.len(),
        });
    }

    let manifest_path = out_dir.join(MANIFEST_FILE);
    let json = serde_json::to_string_pretty(&manifest)
        .map_err(|e| StillframeError::Serialization(e.to_string()))?;
    fs::write(&manifest_path, json)?;

    info!(
        count = frames.len(),
        dir = %out_dir.display(),
        "Exported frames"
    );

    Ok(ExportSummary {
        frame_paths,
        manifest_path,
    })
}
