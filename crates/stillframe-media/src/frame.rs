//! Encoded output frames.

use crate::encode::OutputFormat;
use stillframe_core::format_timestamp;

/// One encoded frame produced by an extraction run.
///
/// `index` is the 0-based position among successfully produced frames.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedFrame {
    pub bytes: Vec<u8>,
    pub timestamp: f64,
    pub index: usize,
    pub format: OutputFormat,
}

impl ExtractedFrame {
    /// Display label for the source timestamp, e.g. `01:02.50`.
    pub fn label(&self) -> String {
        format_timestamp(self.timestamp)
    }
}
