//! Media file probing to get duration and resolution without decoding.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::process::{Command, Stdio};
use stillframe_core::{Result, StillframeError};
use tracing::debug;

/// Information about a video file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaProbe {
    /// File path
    pub path: String,
    /// Duration in seconds
    pub duration: f64,
    /// Native frame width
    pub width: u32,
    /// Native frame height
    pub height: u32,
    /// Video codec name
    pub codec: String,
    /// Container format
    pub format: String,
    /// Average frame rate, when ffprobe reports one
    pub frame_rate: Option<f64>,
}

#[derive(Deserialize)]
struct FfprobeOutput {
    #[serde(default)]
    streams: Vec<FfprobeStream>,
    format: Option<FfprobeFormat>,
}

#[derive(Deserialize)]
struct FfprobeStream {
    codec_name: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
    avg_frame_rate: Option<String>,
    r_frame_rate: Option<String>,
}

#[derive(Deserialize)]
struct FfprobeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

impl MediaProbe {
    /// Probe a video file with ffprobe.
    pub fn probe<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let path_str = path.to_string_lossy().to_string();

        if !path.exists() {
            return Err(StillframeError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("File not found: {}", path_str),
            )));
        }

        let output = Command::new(ffmpeg_sidecar::ffprobe::ffprobe_path())
            .args([
                "-v",
                "error",
                "-select_streams",
                "v:0",
                "-show_entries",
                "stream=codec_name,width,height,duration,avg_frame_rate,r_frame_rate\
                 :format=format_name,duration",
                "-of",
                "json",
            ])
            .arg(path)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| StillframeError::Decoder(format!("Failed to run ffprobe: {e}")))?;

        if !output.status.success() {
            return Err(StillframeError::Decoder(format!(
                "ffprobe exited with status {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        let json = String::from_utf8_lossy(&output.stdout);
        let probe = Self::from_ffprobe_json(&path_str, &json)?;
        debug!(?probe, "Probed media file");
        Ok(probe)
    }

    /// Parse ffprobe's JSON output for the first video stream.
    pub fn from_ffprobe_json(path: &str, json: &str) -> Result<Self> {
        let parsed: FfprobeOutput = serde_json::from_str(json)
            .map_err(|e| StillframeError::Serialization(format!("Invalid ffprobe output: {e}")))?;

        let stream = parsed
            .streams
            .into_iter()
            .next()
            .ok_or_else(|| StillframeError::Decoder(format!("No video stream in {}", path)))?;

        let (width, height) = match (stream.width, stream.height) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(StillframeError::Decoder(format!(
                    "Video stream in {} has no frame size",
                    path
                )))
            }
        };

        // The video stream ends before the container when audio runs longer,
        // and seeking past the last video frame decodes nothing.
        let format = parsed.format;
        let duration = parse_duration(stream.duration.as_deref())
            .or_else(|| parse_duration(format.as_ref().and_then(|f| f.duration.as_deref())))
            .ok_or_else(|| StillframeError::Decoder(format!("Unknown duration for {}", path)))?;
        let frame_rate = parse_rate(stream.avg_frame_rate.as_deref())
            .or_else(|| parse_rate(stream.r_frame_rate.as_deref()));

        Ok(Self {
            path: path.to_string(),
            duration,
            width,
            height,
            codec: stream.codec_name.unwrap_or_default(),
            format: format.and_then(|f| f.format_name).unwrap_or_default(),
            frame_rate,
        })
    }

    /// Length of one frame in seconds, assuming 30 fps when the rate is unknown.
    pub fn frame_duration(&self) -> f64 {
        1.0 / self.frame_rate.unwrap_or(DEFAULT_FRAME_RATE)
    }
}

const DEFAULT_FRAME_RATE: f64 = 30.0;

fn parse_duration(value: Option<&str>) -> Option<f64> {
    value
        .and_then(|d| d.trim().parse::<f64>().ok())
        .filter(|d| d.is_finite() && *d >= 0.0)
}

/// Parse an ffprobe rate such as `30000/1001`. `0/0` means unknown.
fn parse_rate(value: Option<&str>) -> Option<f64> {
    let value = value?.trim();
    let rate = match value.split_once('/') {
        Some((num, den)) => {
            let num: f64 = num.trim().parse().ok()?;
            let den: f64 = den.trim().parse().ok()?;
            num / den
        }
        None => value.parse().ok()?,
    };
    (rate.is_finite() && rate > 0.0).then_some(rate)
}
