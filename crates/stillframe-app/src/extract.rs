//! Plan, transform and export frames from a video file.

use anyhow::{bail, Context};
use clap::Args;
use std::io::Write;
use std::path::PathBuf;
use std::time::Duration;
use stillframe_core::{NormalizedRegion, Rgb, StillframeError, WatermarkPreset};
use stillframe_effects::{BackgroundKeyParams, KeyMode};
use stillframe_media::{export_frames, FfmpegSource, OutputFormat};
use stillframe_pipeline::{plan, CancelToken, ExtractionConfig, FrameExtractor, PlanStrategy};
use tracing::{info, warn};

#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Path to the video file
    pub input: PathBuf,

    /// Output directory
    #[arg(short, long, default_value = "stillframe-out")]
    pub out: PathBuf,

    /// JSON config file; flags override its values
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Extract every N seconds
    #[arg(long, group = "strategy")]
    pub interval: Option<f64>,

    /// Comma-separated timestamps in seconds
    #[arg(long, group = "strategy")]
    pub times: Option<String>,

    /// Extract this many frames spread over the whole video
    #[arg(long, group = "strategy")]
    pub count: Option<u32>,

    /// Detect the loop end and split it into this many segments
    #[arg(long, group = "strategy")]
    pub segments: Option<u32>,

    /// Reference frame time for loop detection
    #[arg(long, requires = "segments")]
    pub first_frame: Option<f64>,

    /// Offset after the reference frame where detection starts
    #[arg(long, requires = "segments")]
    pub search_offset: Option<f64>,

    /// Detection scan step in seconds
    #[arg(long, requires = "segments")]
    pub detect_step: Option<f64>,

    /// Mean channel difference below which a frame matches the reference
    #[arg(long, requires = "segments")]
    pub threshold: Option<f64>,

    /// Longest span to scan during detection, in seconds
    #[arg(long, requires = "segments")]
    pub max_search: Option<f64>,

    /// Key out the background color
    #[arg(long)]
    pub remove_bg: bool,

    /// Keying tolerance (Euclidean RGB distance)
    #[arg(long)]
    pub tolerance: Option<u32>,

    /// Feather keyed edges
    #[arg(long)]
    pub feather: bool,

    /// Keying mode: full|continuous
    #[arg(long)]
    pub bg_mode: Option<String>,

    /// Background color as #rrggbb (default: top-left pixel)
    #[arg(long)]
    pub bg_color: Option<Rgb>,

    /// Blank a watermark preset: doubao|top-left|top-right|bottom-left|bottom-right
    #[arg(long, group = "watermark_region")]
    pub watermark_preset: Option<WatermarkPreset>,

    /// Blank a watermark region given as left,top,width,height fractions
    #[arg(long, group = "watermark_region")]
    pub watermark: Option<String>,

    /// Output format: png|jpeg
    #[arg(long)]
    pub format: Option<OutputFormat>,

    /// Output quality in [0, 1] (JPEG only)
    #[arg(long)]
    pub quality: Option<f32>,

    /// Output width (requires --height)
    #[arg(long, requires = "height")]
    pub width: Option<u32>,

    /// Output height (requires --width)
    #[arg(long, requires = "width")]
    pub height: Option<u32>,

    /// Per-seek timeout in seconds
    #[arg(long, default_value = "10")]
    pub seek_timeout: f64,
}

impl ExtractArgs {
    /// Merge the flags over `config`.
    fn apply_to(&self, config: &mut ExtractionConfig) -> anyhow::Result<()> {
        if let Some(step) = self.interval {
            config.strategy = PlanStrategy::Interval { step };
        } else if let Some(list) = &self.times {
            config.strategy = PlanStrategy::Explicit { list: list.clone() };
        } else if let Some(count) = self.count {
            config.strategy = PlanStrategy::TotalCount { count };
        } else if let Some(segments) = self.segments {
            let mut params = match &config.strategy {
                PlanStrategy::StartEnd(p) => *p,
                _ => Default::default(),
            };
            params.segment_count = segments;
            if let Some(v) = self.first_frame {
                params.first_frame_time = v;
            }
            if let Some(v) = self.search_offset {
                params.search_start_offset = v;
            }
            if let Some(v) = self.detect_step {
                params.step = v;
            }
            if let Some(v) = self.threshold {
                params.similarity_threshold = v;
            }
            if let Some(v) = self.max_search {
                params.max_search_duration = v;
            }
            config.strategy = PlanStrategy::StartEnd(params);
        }

        let keying_flags = self.tolerance.is_some() || self.feather || self.bg_mode.is_some();
        if self.remove_bg || keying_flags {
            let params = config.background.get_or_insert_with(BackgroundKeyParams::default);
            if let Some(tolerance) = self.tolerance {
                params.tolerance = tolerance;
            }
            if self.feather {
                params.edge_feather = true;
            }
            if let Some(mode) = &self.bg_mode {
                params.mode = parse_key_mode(mode)?;
            }
        }
        if let Some(color) = self.bg_color {
            config.background_color = Some(color);
        }

        if let Some(preset) = self.watermark_preset {
            config.watermark = Some(preset.region());
        } else if let Some(region) = &self.watermark {
            config.watermark = Some(parse_region(region)?);
        }

        if let Some(format) = self.format {
            config.output.format = format;
        }
        if let Some(quality) = self.quality {
            config.output.quality = quality;
        }
        if let (Some(w), Some(h)) = (self.width, self.height) {
            config.output.resize = Some((w, h));
        }
        Ok(())
    }
}

fn parse_key_mode(s: &str) -> anyhow::Result<KeyMode> {
    match s.trim().to_ascii_lowercase().as_str() {
        "full" => Ok(KeyMode::Full),
        "continuous" => Ok(KeyMode::Continuous),
        other => bail!("Unknown keying mode {other:?} (expected full or continuous)"),
    }
}

fn parse_region(s: &str) -> anyhow::Result<NormalizedRegion> {
    let values = s
        .split(',')
        .map(|v| v.trim().parse::<f64>())
        .collect::<Result<Vec<_>, _>>()
        .with_context(|| format!("Invalid watermark region {s:?}"))?;
    match values.as_slice() {
        [left, top, width, height] => Ok(NormalizedRegion::new(*left, *top, *width, *height)),
        _ => bail!("Watermark region needs 4 values (left,top,width,height), got {}", values.len()),
    }
}

pub async fn run(args: ExtractArgs) -> anyhow::Result<()> {
    let mut config = match &args.config {
        Some(path) => ExtractionConfig::from_path(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => ExtractionConfig::default(),
    };
    args.apply_to(&mut config)?;
    config.validate()?;

    if !args.seek_timeout.is_finite() || args.seek_timeout <= 0.0 {
        bail!("Seek timeout must be positive, got {}", args.seek_timeout);
    }
    let mut source = FfmpegSource::open(&args.input)
        .with_context(|| format!("Failed to open {}", args.input.display()))?
        .with_seek_timeout(Duration::from_secs_f64(args.seek_timeout));

    let mut session = config.session();

    let timestamps = match plan(&config.strategy, &mut source).await {
        Ok(points) => points,
        Err(StillframeError::NoMatchFound(reason)) => {
            warn!(%reason, "No frame similar to the reference frame");
            Vec::new()
        }
        Err(e) => return Err(e).context("Failed to plan extraction"),
    };
    if timestamps.is_empty() {
        warn!("No valid timestamps to extract");
        return Ok(());
    }

    let cancel = CancelToken::new();
    let handle = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping after the current frame");
            handle.cancel();
        }
    });

    let report = FrameExtractor::new(timestamps, &mut source, &mut session)
        .with_transforms(config.transforms())
        .with_encode(config.output)
        .with_cancel(cancel)
        .run(|p| {
            eprint!("\rExtracting {}/{}", p.completed, p.total);
            std::io::stderr().flush().ok();
        })
        .await;
    eprintln!();

    for skipped in &report.skipped {
        eprintln!("  skipped {:.3}s: {}", skipped.timestamp, skipped.error);
    }

    if report.frames.is_empty() {
        warn!("No frames were extracted");
        return Ok(());
    }

    let summary = export_frames(&args.out, &report.frames, |_| {})
        .with_context(|| format!("Failed to export to {}", args.out.display()))?;

    info!(
        frames = report.frames.len(),
        skipped = report.skipped.len(),
        cancelled = report.cancelled,
        "Done"
    );
    println!(
        "Wrote {} frames to {}",
        summary.frame_paths.len(),
        args.out.display()
    );
    println!("Manifest: {}", summary.manifest_path.display());
    if report.cancelled {
        println!("Extraction was cancelled; remaining timestamps were not processed");
    }
    Ok(())
}
