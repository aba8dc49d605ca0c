use std::path::Path;

use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};

use crate::error::AnalysisError;

/// Environment prefix used to override file settings, e.g. `CROP_ANALYSIS__VOTE_THRESHOLD=4`.
pub const ENV_PREFIX: &str = "CROP_ANALYSIS";

/// Largest sky filter sample grid side `validate` accepts.
pub const MAX_SKY_SAMPLE_SIZE: u32 = 512;

/// Thresholds driving the analysis pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Minimum confidence for a region classification to count as a vote,
    /// and the average confidence a non-prior crop needs in voting.
    pub confidence_threshold: f32,
    /// Votes a crop other than the full-image prior needs to be accepted.
    pub vote_threshold: u32,
    /// Votes the full-image prior crop needs to be accepted.
    pub prior_vote_threshold: u32,
    /// Average confidence the full-image prior crop needs to be accepted.
    pub prior_confidence_threshold: f32,
    /// Full-image crop confidence above which a barren verdict is treated as a false positive.
    pub false_positive_cutoff: f32,
    /// Average confidence that accepts a crop regardless of its vote count.
    pub super_high_confidence: f32,
    /// Full-image crop confidence above which the grid still runs on barren land.
    pub grid_skip_cutoff: f32,
    /// Classify grid regions on the rayon pool instead of sequentially.
    pub parallel_regions: bool,
    pub sky_filter: SkyFilterConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SkyFilterConfig {
    /// Side length of the square sample grid a region is downscaled to.
    pub sample_size: u32,
    /// Fraction of sky-like samples above which a region is skipped.
    pub sky_fraction_threshold: f32,
    pub hue_min: f32,
    pub hue_max: f32,
    pub bright_min: f32,
    pub saturation_max: f32,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            confidence_threshold: 0.65,
            vote_threshold: 3,
            prior_vote_threshold: 2,
            prior_confidence_threshold: 0.60,
            false_positive_cutoff: 0.90,
            super_high_confidence: 0.99,
            grid_skip_cutoff: 0.70,
            parallel_regions: false,
            sky_filter: SkyFilterConfig::default(),
        }
    }
}

impl Default for SkyFilterConfig {
    fn default() -> Self {
        Self {
            sample_size: 20,
            sky_fraction_threshold: 0.6,
            hue_min: 190.0, // blue range
            hue_max: 250.0,
            bright_min: 0.9, // white / grey overcast
            saturation_max: 0.2,
        }
    }
}

impl AnalysisConfig {
    /// Load configuration from a file, letting `CROP_ANALYSIS__*` variables override it.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, AnalysisError> {
        let settings = Config::builder()
            .add_source(File::from(path.as_ref()))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;
        Self::finish(settings)
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, AnalysisError> {
        let settings = Config::builder()
            .add_source(File::from_str(contents, FileFormat::Toml))
            .build()?;
        Self::finish(settings)
    }

    fn finish(settings: Config) -> Result<Self, AnalysisError> {
        let config: Self = settings.try_deserialize()?;
        config.validate().map_err(AnalysisError::InvalidConfig)?;
        Ok(config)
    }

    /// Validate configuration parameters
    pub fn validate(&self) -> Result<(), String> {
        let probabilities = [
            ("confidence_threshold", self.confidence_threshold),
            ("prior_confidence_threshold", self.prior_confidence_threshold),
            ("false_positive_cutoff", self.false_positive_cutoff),
            ("super_high_confidence", self.super_high_confidence),
            ("grid_skip_cutoff", self.grid_skip_cutoff),
            (
                "sky_filter.sky_fraction_threshold",
                self.sky_filter.sky_fraction_threshold,
            ),
            ("sky_filter.bright_min", self.sky_filter.bright_min),
            ("sky_filter.saturation_max", self.sky_filter.saturation_max),
        ];
        for (name, value) in probabilities {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be between 0.0 and 1.0, got {value}"));
            }
        }

        if self.vote_threshold == 0 || self.prior_vote_threshold == 0 {
            return Err("Vote thresholds must be greater than 0".to_string());
        }

        if self.sky_filter.sample_size == 0 {
            return Err("Sky filter sample size must be greater than 0".to_string());
        }

        if self.sky_filter.sample_size > MAX_SKY_SAMPLE_SIZE {
            return Err(format!(
                "Sky filter sample size must be at most {MAX_SKY_SAMPLE_SIZE}, got {}",
                self.sky_filter.sample_size
            ));
        }

        if self.sky_filter.hue_min > self.sky_filter.hue_max {
            return Err(format!(
                "Sky hue range is inverted: {} > {}",
                self.sky_filter.hue_min, self.sky_filter.hue_max
            ));
        }

        Ok(())
    }

    pub fn with_confidence_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_vote_threshold(mut self, votes: u32) -> Self {
        self.vote_threshold = votes;
        self
    }

    pub fn with_parallel_regions(mut self, enabled: bool) -> Self {
        self.parallel_regions = enabled;
        self
    }

    pub fn with_sky_filter(mut self, sky_filter: SkyFilterConfig) -> Self {
        self.sky_filter = sky_filter;
        self
    }
}
