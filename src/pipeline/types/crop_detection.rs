use serde::Serialize;
use std::fmt;

use super::CropLabel;

/// Location reported for detections derived from the whole image.
pub const ENTIRE_FIELD: &str = "Entire Field";

/// Pipeline stage that produced a detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DetectionSource {
    #[serde(rename = "Full-Image-Prior")]
    FullImagePrior,
    #[serde(rename = "Grid-Aligned")]
    GridAligned,
    #[serde(rename = "Grid-Offset")]
    GridOffset,
    #[serde(rename = "Grid-Consensus")]
    GridConsensus,
    #[serde(rename = "Full-Image-Override")]
    FullImageOverride,
    #[serde(rename = "Fallback-Mode")]
    FallbackMode,
}

impl DetectionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionSource::FullImagePrior => "Full-Image-Prior",
            DetectionSource::GridAligned => "Grid-Aligned",
            DetectionSource::GridOffset => "Grid-Offset",
            DetectionSource::GridConsensus => "Grid-Consensus",
            DetectionSource::FullImageOverride => "Full-Image-Override",
            DetectionSource::FallbackMode => "Fallback-Mode",
        }
    }
}

impl fmt::Display for DetectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the report: a crop, how sure we are, and where it was seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CropDetection {
    crop_name: CropLabel,
    confidence: f32,
    votes: u32,
    location: String,
    source: DetectionSource,
}

impl CropDetection {
    pub fn new(
        crop_name: CropLabel,
        confidence: f32,
        votes: u32,
        location: impl Into<String>,
        source: DetectionSource,
    ) -> Self {
        Self {
            crop_name,
            confidence,
            votes,
            location: location.into(),
            source,
        }
    }

    /// Whole-image classification used as the trusted prior.
    pub fn full_image_prior(crop_name: CropLabel, confidence: f32) -> Self {
        Self::new(
            crop_name,
            confidence,
            1,
            ENTIRE_FIELD,
            DetectionSource::FullImagePrior,
        )
    }

    pub fn full_image_override(crop_name: CropLabel, confidence: f32) -> Self {
        Self::new(
            crop_name,
            confidence,
            1,
            ENTIRE_FIELD,
            DetectionSource::FullImageOverride,
        )
    }

    /// Zero votes: no region supported this crop.
    pub fn fallback(crop_name: CropLabel, confidence: f32) -> Self {
        Self::new(
            crop_name,
            confidence,
            0,
            ENTIRE_FIELD,
            DetectionSource::FallbackMode,
        )
    }

    pub fn crop_name(&self) -> CropLabel {
        self.crop_name
    }

    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    pub fn votes(&self) -> u32 {
        self.votes
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn source(&self) -> DetectionSource {
        self.source
    }
}
