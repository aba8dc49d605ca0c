use serde::Serialize;

use super::CropDetection;

/// Final output of one `analyze` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    is_barren: bool,
    barren_confidence: f32,
    full_image_analysis: CropDetection,
    grid_detections: Vec<CropDetection>,
    execution_time_ms: u64,
}

impl AnalysisResult {
    pub fn new(
        is_barren: bool,
        barren_confidence: f32,
        full_image_analysis: CropDetection,
        grid_detections: Vec<CropDetection>,
        execution_time_ms: u64,
    ) -> Self {
        Self {
            is_barren,
            barren_confidence,
            full_image_analysis,
            grid_detections,
            execution_time_ms,
        }
    }

    pub fn is_barren(&self) -> bool {
        self.is_barren
    }

    /// Confidence of the barren model's own verdict. After a false-positive
    /// correction this still describes the barren hypothesis.
    pub fn barren_confidence(&self) -> f32 {
        self.barren_confidence
    }

    pub fn full_image_analysis(&self) -> &CropDetection {
        &self.full_image_analysis
    }

    pub fn grid_detections(&self) -> &[CropDetection] {
        &self.grid_detections
    }

    pub fn into_grid_detections(self) -> Vec<CropDetection> {
        self.grid_detections
    }

    pub fn execution_time_ms(&self) -> u64 {
        self.execution_time_ms
    }
}
