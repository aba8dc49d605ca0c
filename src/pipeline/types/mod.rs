pub mod analysis_result;
pub mod crop_detection;
pub mod crop_label;

pub use analysis_result::AnalysisResult;
pub use crop_detection::{CropDetection, DetectionSource, ENTIRE_FIELD};
pub use crop_label::CropLabel;
