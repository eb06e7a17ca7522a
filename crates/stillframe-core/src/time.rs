//! Timestamp labels.

/// Format seconds as `mm:ss.cc` (minutes, seconds, centiseconds).
///
/// Every component is floored. Negative or non-finite input formats as zero.
pub fn format_timestamp(seconds: f64) -> String {
    let seconds = if seconds.is_finite() {
        seconds.max(0.0)
    } else {
        0.0
    };
    let mins = (seconds / 60.0).floor() as u64;
    let secs = (seconds % 60.0).floor() as u64;
    let centis = ((seconds % 1.0) * 100.0).floor() as u64;
    format!("{:02}:{:02}.{:02}", mins, secs, centis)
}
