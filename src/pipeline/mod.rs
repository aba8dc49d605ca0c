pub mod orchestration;
pub mod services;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use orchestration::{AnalysisPipeline, AnalysisService};
pub use types::{AnalysisResult, CropDetection, CropLabel, DetectionSource};
