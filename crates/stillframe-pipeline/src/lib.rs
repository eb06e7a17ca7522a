//! Stillframe Pipeline - planning and running frame extractions
//!
//! - [`planner`]: turn a strategy into timestamps, including start/end
//!   detection by frame similarity
//! - [`extract`]: render, transform and encode each timestamp in order
//! - [`config`]: JSON-loadable extraction settings

pub mod cancel;
pub mod config;
pub mod extract;
pub mod planner;

pub use cancel::CancelToken;
pub use config::ExtractionConfig;
pub use extract::{
    extract_all, ExtractProgress, ExtractReport, FrameExtractor, FrameOutcome, SkippedFrame,
};
pub use planner::{plan, PlanStrategy, StartEndParams};
pub use stillframe_media::ExtractedFrame;
