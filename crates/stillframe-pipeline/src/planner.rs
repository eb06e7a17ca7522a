//! Time-point planning.
//!
//! Turns an extraction strategy into the ordered list of timestamps the
//! extractor will render. Interval, explicit and total-count plans are pure
//! functions of their parameters; start/end detection samples the source
//! to find where the video returns to its first frame.

use serde::{Deserialize, Serialize};
use stillframe_core::{Result, StillframeError};
use stillframe_effects::mean_absolute_difference;
use stillframe_media::RasterSource;
use tracing::{debug, info};

/// Minimum distance between the reference frame and the first scanned
/// frame, so detection never compares the reference with itself.
pub const MIN_SEARCH_OFFSET: f64 = 0.1;

/// How timestamps are chosen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlanStrategy {
    /// Every `step` seconds from 0 while below the duration.
    Interval { step: f64 },
    /// A comma-separated list of timestamps in seconds.
    Explicit { list: String },
    /// `count` timestamps spread evenly over the whole video.
    TotalCount { count: u32 },
    /// Detect the loop end by frame similarity and split the span.
    StartEnd(StartEndParams),
}

impl Default for PlanStrategy {
    fn default() -> Self {
        Self::Interval { step: 1.0 }
    }
}

impl PlanStrategy {
    /// Short name for logging.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Interval { .. } => "interval",
            Self::Explicit { .. } => "explicit",
            Self::TotalCount { .. } => "total_count",
            Self::StartEnd(_) => "start_end",
        }
    }

    /// Check parameters without touching a source.
    pub fn validate(&self) -> Result<()> {
        match self {
            Self::Interval { step } => check_step(*step, "Interval step"),
            Self::Explicit { .. } => Ok(()),
            Self::TotalCount { count } => {
                if *count == 0 {
                    return Err(StillframeError::InvalidParameter(
                        "Frame count must be at least 1".into(),
                    ));
                }
                Ok(())
            }
            Self::StartEnd(params) => params.validate(),
        }
    }
}

/// Parameters for similarity-based start/end detection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StartEndParams {
    /// Timestamp of the reference frame.
    pub first_frame_time: f64,
    /// Offset from the reference at which scanning begins. Floored at
    /// [`MIN_SEARCH_OFFSET`].
    pub search_start_offset: f64,
    /// Scan step in seconds.
    pub step: f64,
    /// Mean channel difference strictly below which a frame matches.
    pub similarity_threshold: f64,
    /// Longest span to scan, in seconds.
    pub max_search_duration: f64,
    /// Number of segments between the reference and the detected end.
    pub segment_count: u32,
}

impl Default for StartEndParams {
    fn default() -> Self {
        Self {
            first_frame_time: 0.0,
            search_start_offset: 1.0,
            step: 0.1,
            similarity_threshold: 10.0,
            max_search_duration: 30.0,
            segment_count: 10,
        }
    }
}

impl StartEndParams {
    pub fn validate(&self) -> Result<()> {
        check_step(self.step, "Detection step")?;
        if self.segment_count == 0 {
            return Err(StillframeError::InvalidParameter(
                "Segment count must be at least 1".into(),
            ));
        }
        if !self.first_frame_time.is_finite() || self.first_frame_time < 0.0 {
            return Err(StillframeError::InvalidParameter(format!(
                "First frame time must be a non-negative number, got {}",
                self.first_frame_time
            )));
        }
        if !self.search_start_offset.is_finite() || self.search_start_offset < 0.0 {
            return Err(StillframeError::InvalidParameter(format!(
                "Search start offset must be a non-negative number, got {}",
                self.search_start_offset
            )));
        }
        if self.similarity_threshold.is_nan() || self.max_search_duration.is_nan() {
            return Err(StillframeError::InvalidParameter(
                "Detection threshold and search duration must be numbers".into(),
            ));
        }
        Ok(())
    }

    /// First timestamp compared against the reference.
    pub fn scan_start(&self) -> f64 {
        self.first_frame_time + self.search_start_offset.max(MIN_SEARCH_OFFSET)
    }
}

fn check_step(step: f64, what: &str) -> Result<()> {
    if !step.is_finite() || step <= 0.0 {
        return Err(StillframeError::InvalidParameter(format!(
            "{} must be positive, got {}",
            what, step
        )));
    }
    Ok(())
}

/// `0, step, 2*step, ...` while strictly below `duration`.
pub fn plan_interval(step: f64, duration: f64) -> Result<Vec<f64>> {
    check_step(step, "Interval step")?;
    let mut points = Vec::new();
    let mut t = 0.0;
    while t < duration {
        points.push(t);
        t = points.len() as f64 * step;
    }
    Ok(points)
}

/// Parse a comma-separated list of seconds.
///
/// Each entry is read up to the end of its leading number, so `3.5s`
/// yields 3.5. Entries that do not start with a number are dropped.
/// Order and duplicates are preserved.
pub fn plan_explicit(list: &str) -> Vec<f64> {
    list.split(',')
        .filter_map(leading_number)
        .filter(|t| t.is_finite())
        .collect()
}

/// The longest decimal number at the start of `entry`, after whitespace.
fn leading_number(entry: &str) -> Option<f64> {
    let s = entry.trim_start();
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_digits = int_end - end;
    end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_end = digits_from(end + 1);
        mantissa_digits += frac_end - end - 1;
        end = frac_end;
    }
    if mantissa_digits == 0 {
        return None;
    }

    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }

    s[..end].parse().ok()
}

/// `count` timestamps from 0 to `duration` inclusive.
pub fn plan_total_count(count: u32, duration: f64) -> Result<Vec<f64>> {
    match count {
        0 => Err(StillframeError::InvalidParameter(
            "Frame count must be at least 1".into(),
        )),
        1 => Ok(vec![0.0]),
        n => {
            let last = (n - 1) as f64;
            Ok((0..n).map(|i| i as f64 / last * duration).collect())
        }
    }
}

/// Segment start times of `[first, end]` split into `segment_count` parts.
///
/// `end` itself is never included.
pub fn segment_starts(first: f64, end: f64, segment_count: u32) -> Vec<f64> {
    let segment = (end - first) / segment_count as f64;
    (0..segment_count)
        .map(|i| first + i as f64 * segment)
        .collect()
}

/// Scan forward from the reference frame and return the detected end time.
///
/// The first scanned frame whose difference is strictly below the
/// threshold wins. Without one, the closest frame seen is used.
pub async fn detect_end_time<S: RasterSource>(
    params: &StartEndParams,
    source: &mut S,
) -> Result<f64> {
    params.validate()?;

    let reference = source.seek_and_render(params.first_frame_time).await?;

    let scan_start = params.scan_start();
    let scan_end = (scan_start + params.max_search_duration).min(source.duration());

    let mut best: Option<(f64, f64)> = None;
    let mut k = 0u64;
    let mut t = scan_start;
    while t < scan_end {
        let frame = source.seek_and_render(t).await?;
        let diff = mean_absolute_difference(&reference, &frame)?;
        debug!(timestamp = t, diff, "Sampled detection frame");

        if best.map_or(true, |(_, d)| diff < d) {
            best = Some((t, diff));
        }
        if diff < params.similarity_threshold {
            info!(end_time = t, diff, "Found matching end frame");
            return Ok(t);
        }

        k += 1;
        t = scan_start + k as f64 * params.step;
    }

    match best {
        Some((t, diff)) => {
            info!(end_time = t, diff, "No frame under threshold, using closest match");
            Ok(t)
        }
        None => Err(StillframeError::NoMatchFound(format!(
            "No frames to compare between {:.3}s and {:.3}s",
            scan_start, scan_end
        ))),
    }
}

/// Detect the end time and return the segment start times.
pub async fn plan_start_end<S: RasterSource>(
    params: &StartEndParams,
    source: &mut S,
) -> Result<Vec<f64>> {
    let end = detect_end_time(params, source).await?;
    Ok(segment_starts(
        params.first_frame_time,
        end,
        params.segment_count,
    ))
}

/// Build the extraction plan for `strategy` against `source`.
pub async fn plan<S: RasterSource>(strategy: &PlanStrategy, source: &mut S) -> Result<Vec<f64>> {
    let duration = source.duration();
    let points = match strategy {
        PlanStrategy::Interval { step } => plan_interval(*step, duration)?,
        PlanStrategy::Explicit { list } => plan_explicit(list),
        PlanStrategy::TotalCount { count } => plan_total_count(*count, duration)?,
        PlanStrategy::StartEnd(params) => plan_start_end(params, source).await?,
    };

    info!(
        strategy = strategy.name(),
        duration,
        count = points.len(),
        "Planned extraction"
    );
    Ok(points)
}
