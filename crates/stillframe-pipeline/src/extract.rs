//! Frame extraction orchestrator.
//!
//! Renders each planned timestamp through the source, applies the
//! configured transforms, encodes the result and hands it back one frame
//! at a time. Work is strictly sequential: the source serves one render
//! at a time, so each render is awaited before the next begins.

use crate::cancel::CancelToken;
use stillframe_core::{Result, Session, StillframeError};
use stillframe_effects::TransformConfig;
use stillframe_media::{encode, EncodeConfig, ExtractedFrame, RasterSource};
use tracing::{debug, info, warn};

/// A timestamp that produced no frame.
#[derive(Debug)]
pub struct SkippedFrame {
    pub timestamp: f64,
    pub error: StillframeError,
}

/// Outcome of one planned timestamp.
pub type FrameOutcome = std::result::Result<ExtractedFrame, SkippedFrame>;

/// Progress after each processed timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExtractProgress {
    /// Timestamps processed so far, skipped ones included.
    pub completed: usize,
    /// Timestamps in the plan.
    pub total: usize,
}

impl ExtractProgress {
    /// Completion fraction (0.0 to 1.0).
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            return 1.0;
        }
        self.completed as f64 / self.total as f64
    }
}

/// Everything an extraction run produced.
#[derive(Debug, Default)]
pub struct ExtractReport {
    /// Frames in plan order, indexed `0..frames.len()`.
    pub frames: Vec<ExtractedFrame>,
    pub skipped: Vec<SkippedFrame>,
    /// The run stopped early because the cancel token was set.
    pub cancelled: bool,
}

/// Lazy, single-pass frame extraction over a fixed plan.
pub struct FrameExtractor<'a, S: RasterSource> {
    source: &'a mut S,
    session: &'a mut Session,
    timestamps: std::vec::IntoIter<f64>,
    total: usize,
    completed: usize,
    next_index: usize,
    transforms: TransformConfig,
    encode: EncodeConfig,
    cancel: CancelToken,
    cancelled: bool,
}

impl<'a, S: RasterSource> FrameExtractor<'a, S> {
    pub fn new(timestamps: Vec<f64>, source: &'a mut S, session: &'a mut Session) -> Self {
        Self {
            source,
            session,
            total: timestamps.len(),
            timestamps: timestamps.into_iter(),
            completed: 0,
            next_index: 0,
            transforms: TransformConfig::default(),
            encode: EncodeConfig::default(),
            cancel: CancelToken::new(),
            cancelled: false,
        }
    }

    pub fn with_transforms(mut self, transforms: TransformConfig) -> Self {
        self.transforms = transforms;
        self
    }

    pub fn with_encode(mut self, encode: EncodeConfig) -> Self {
        self.encode = encode;
        self
    }

    pub fn with_cancel(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn progress(&self) -> ExtractProgress {
        ExtractProgress {
            completed: self.completed,
            total: self.total,
        }
    }

    /// Whether the run was stopped by the cancel token.
    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Process the next timestamp.
    ///
    /// Returns `None` once the plan is exhausted or cancellation is
    /// observed. A failed timestamp yields `Some(Err(_))` and does not
    /// consume a sequence index.
    pub async fn next(&mut self) -> Option<FrameOutcome> {
        if self.cancelled {
            return None;
        }
        let timestamp = self.timestamps.next()?;
        if self.cancel.is_cancelled() {
            info!(
                completed = self.completed,
                total = self.total,
                "Extraction cancelled"
            );
            self.cancelled = true;
            return None;
        }

        let outcome = match self.render(timestamp).await {
            Ok(frame) => {
                debug!(
                    timestamp,
                    index = frame.index,
                    bytes = frame.bytes.len(),
                    "Extracted frame"
                );
                self.next_index += 1;
                Ok(frame)
            }
            Err(error) => {
                if error.is_seek_failure() {
                    warn!(timestamp, %error, "Seek failed, skipping timestamp");
                } else {
                    warn!(timestamp, %error, "Frame failed, skipping timestamp");
                }
                Err(SkippedFrame { timestamp, error })
            }
        };
        self.completed += 1;
        Some(outcome)
    }

    async fn render(&mut self, timestamp: f64) -> Result<ExtractedFrame> {
        let mut raster = self.source.seek_and_render(timestamp).await?;
        self.transforms.apply(&mut raster, self.session);
        let bytes = encode(&raster, &self.encode)?;
        Ok(ExtractedFrame {
            bytes,
            timestamp,
            index: self.next_index,
            format: self.encode.format,
        })
    }

    /// Drain the extractor, reporting progress after every timestamp.
    pub async fn run(mut self, mut on_progress: impl FnMut(ExtractProgress)) -> ExtractReport {
        let mut report = ExtractReport::default();
        while let Some(outcome) = self.next().await {
            match outcome {
                Ok(frame) => report.frames.push(frame),
                Err(skipped) => report.skipped.push(skipped),
            }
            on_progress(self.progress());
        }
        report.cancelled = self.cancelled;

        info!(
            frames = report.frames.len(),
            skipped = report.skipped.len(),
            cancelled = report.cancelled,
            "Extraction finished"
        );
        report
    }
}

/// Extract every timestamp in `timestamps` from `source`.
pub async fn extract_all<S: RasterSource>(
    timestamps: Vec<f64>,
    source: &mut S,
    session: &mut Session,
    transforms: TransformConfig,
    encode: EncodeConfig,
    cancel: CancelToken,
    on_progress: impl FnMut(ExtractProgress),
) -> ExtractReport {
    FrameExtractor::new(timestamps, source, session)
        .with_transforms(transforms)
        .with_encode(encode)
        .with_cancel(cancel)
        .run(on_progress)
        .await
}
