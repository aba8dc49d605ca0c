pub mod config;
pub mod error;
pub mod pipeline;

pub use config::{AnalysisConfig, SkyFilterConfig};
pub use error::{AnalysisError, ClassifierError};

pub use pipeline::orchestration::{AnalysisPipeline, AnalysisService, BoxAnalysisService};
pub use pipeline::services::classifier::{
    BarrenVerdict, Classifier, CropPrediction, InferenceSession, ModelClassifier, ProbabilityModel,
    SerializedClassifier,
};
pub use pipeline::types::{AnalysisResult, CropDetection, CropLabel, DetectionSource};
