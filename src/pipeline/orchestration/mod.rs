pub mod analysis_pipeline;
pub mod analysis_service;

pub use analysis_pipeline::AnalysisPipeline;
pub use analysis_service::{AnalysisService, AnalysisServiceBuilder, BoxAnalysisService};
