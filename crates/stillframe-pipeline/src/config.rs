//! Serializable extraction settings.

use crate::planner::PlanStrategy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use stillframe_core::{NormalizedRegion, Result, Rgb, Session, StillframeError};
use stillframe_effects::{BackgroundKeyParams, TransformConfig};
use stillframe_media::EncodeConfig;
use tracing::debug;

/// Everything needed to plan and run one extraction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub strategy: PlanStrategy,
    /// Background keying, when enabled.
    pub background: Option<BackgroundKeyParams>,
    /// Watermark region to blank, when enabled.
    pub watermark: Option<NormalizedRegion>,
    /// Key color. Defaults to the top-left pixel of the first frame.
    pub background_color: Option<Rgb>,
    pub output: EncodeConfig,
}

impl ExtractionConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| StillframeError::Serialization(format!("Invalid config: {e}")))?;
        Ok(config)
    }

    /// Load a JSON config file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        debug!(path = %path.display(), strategy = config.strategy.name(), "Loaded config");
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| StillframeError::Serialization(e.to_string()))
    }

    /// Range-check every value before extraction starts.
    pub fn validate(&self) -> Result<()> {
        self.strategy.validate()?;

        let quality = self.output.quality;
        if !quality.is_finite() || !(0.0..=1.0).contains(&quality) {
            return Err(StillframeError::InvalidParameter(format!(
                "Quality must be between 0 and 1, got {}",
                quality
            )));
        }
        if let Some((w, h)) = self.output.resize {
            if w == 0 || h == 0 {
                return Err(StillframeError::InvalidParameter(format!(
                    "Output size must be positive, got {}x{}",
                    w, h
                )));
            }
        }
        Ok(())
    }

    /// Transforms to apply to each frame.
    pub fn transforms(&self) -> TransformConfig {
        TransformConfig {
            background: self.background,
            remove_watermark: self.watermark.is_some(),
        }
    }

    /// Fresh session seeded with the configured color and region.
    pub fn session(&self) -> Session {
        let mut session = Session::new();
        if let Some(color) = self.background_color {
            session.set_background(color);
        }
        if let Some(region) = self.watermark {
            session.set_watermark(region);
        }
        session
    }
}
