//! Raster source backed by the ffmpeg command-line tool.
//!
//! Each render spawns one ffmpeg process that seeks to the timestamp and
//! writes a single raw RGBA frame to stdout.

use crate::probe::MediaProbe;
use crate::source::{check_range, RasterSource};
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;
use stillframe_core::{Raster, Result, StillframeError};
use tokio::process::Command;
use tracing::{debug, info};

/// Default per-seek timeout.
pub const DEFAULT_SEEK_TIMEOUT: Duration = Duration::from_secs(10);

/// Video file source that renders frames through ffmpeg.
pub struct FfmpegSource {
    path: PathBuf,
    probe: MediaProbe,
    seek_timeout: Duration,
}

impl FfmpegSource {
    /// Open a video file, probing its duration and resolution.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let probe = MediaProbe::probe(path)?;

        info!(
            path = %path.display(),
            duration = probe.duration,
            width = probe.width,
            height = probe.height,
            "Opened video file"
        );

        Ok(Self {
            path: path.to_path_buf(),
            probe,
            seek_timeout: DEFAULT_SEEK_TIMEOUT,
        })
    }

    /// Set how long a single seek may take before it is abandoned.
    pub fn with_seek_timeout(mut self, timeout: Duration) -> Self {
        self.seek_timeout = timeout;
        self
    }

    /// Get the file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Probe information for the open file.
    pub fn probe(&self) -> &MediaProbe {
        &self.probe
    }

    /// Where ffmpeg actually seeks for `timestamp`.
    ///
    /// A seek to the very end of the stream decodes nothing, so requests
    /// inside the final frame interval are pulled back to that frame's start.
    fn seek_position(&self, timestamp: f64) -> f64 {
        let last_frame = (self.probe.duration - self.probe.frame_duration()).max(0.0);
        timestamp.min(last_frame)
    }

    fn render_command(&self, timestamp: f64) -> Command {
        let position = self.seek_position(timestamp);
        let mut cmd = Command::new(ffmpeg_sidecar::paths::ffmpeg_path());
        cmd.args(["-v", "error", "-ss", &format!("{:.6}", position), "-i"])
            .arg(&self.path)
            .args(["-frames:v", "1", "-f", "rawvideo", "-pix_fmt", "rgba", "-"])
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }
}

impl RasterSource for FfmpegSource {
    async fn seek_and_render(&mut self, timestamp: f64) -> Result<Raster> {
        check_range(timestamp, self.probe.duration)?;

        let render = self.render_command(timestamp).output();
        let output = tokio::time::timeout(self.seek_timeout, render)
            .await
            .map_err(|_| StillframeError::SeekTimeout {
                timestamp,
                timeout_secs: self.seek_timeout.as_secs_f64(),
            })?
            .map_err(|e| StillframeError::SeekFailed {
                timestamp,
                reason: format!("failed to spawn ffmpeg: {e}"),
            })?;

        if !output.status.success() {
            return Err(StillframeError::SeekFailed {
                timestamp,
                reason: format!(
                    "ffmpeg exited with status {}: {}",
                    output.status,
                    String::from_utf8_lossy(&output.stderr).trim()
                ),
            });
        }

        if output.stdout.is_empty() {
            return Err(StillframeError::SeekFailed {
                timestamp,
                reason: "no frame decoded".into(),
            });
        }

        debug!(timestamp, bytes = output.stdout.len(), "Decoded frame");
        Raster::from_rgba(self.probe.width, self.probe.height, output.stdout)
            .map_err(|e| {
                StillframeError::Decoder(format!("Unexpected frame at {timestamp:.3}s: {e}"))
            })
    }

    fn duration(&self) -> f64 {
        self.probe.duration
    }

    fn native_resolution(&self) -> (u32, u32) {
        (self.probe.width, self.probe.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_source() -> FfmpegSource {
        let json = r#"{
            "streams": [ { "width": 320, "height": 240, "avg_frame_rate": "25/1" } ],
            "format": { "duration": "4.0" }
        }"#;
        FfmpegSource {
            path: PathBuf::from("clip.mp4"),
            probe: MediaProbe::from_ffprobe_json("clip.mp4", json).unwrap(),
            seek_timeout: DEFAULT_SEEK_TIMEOUT,
        }
    }

    #[test]
    fn test_render_command_args() {
        let source = fake_source().with_seek_timeout(Duration::from_millis(250));
        let cmd = source.render_command(1.5);
        let args: Vec<String> = cmd
            .as_std()
            .get_args()
            .map(|a| a.to_string_lossy().into_owned())
            .collect();
        assert_eq!(args[3], "1.500000");
        assert!(args.contains(&"clip.mp4".to_string()));
        assert!(args.contains(&"rgba".to_string()));
        assert_eq!(args.last().map(String::as_str), Some("-"));
        assert_eq!(source.seek_timeout, Duration::from_millis(250));
    }

    #[test]
    fn test_seek_at_end_clamped_to_last_frame() {
        let source = fake_source();
        assert_eq!(source.seek_position(0.0), 0.0);
        assert_eq!(source.seek_position(2.0), 2.0);
        assert!((source.seek_position(4.0) - 3.96).abs() < 1e-9);
        assert!((source.seek_position(3.99) - 3.96).abs() < 1e-9);

        let cmd = source.render_command(4.0);
        let ss = cmd.as_std().get_args().nth(3).unwrap().to_string_lossy().into_owned();
        assert_eq!(ss, "3.960000");
    }

    #[test]
    fn test_seek_clamp_on_single_frame_clip() {
        let mut source = fake_source();
        source.probe.duration = 0.01;
        assert_eq!(source.seek_position(0.01), 0.0);
    }

    #[tokio::test]
    async fn test_out_of_range_rejected_before_spawn() {
        let mut source = fake_source();
        assert_eq!(source.native_resolution(), (320, 240));
        let err = source.seek_and_render(4.5).await.unwrap_err();
        assert!(matches!(err, StillframeError::SeekOutOfRange { .. }));
    }
}
