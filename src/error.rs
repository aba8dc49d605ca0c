use thiserror::Error;

// Main Analysis Error Type

#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Classifier Error: {0}")]
    Classifier(#[from] ClassifierError),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("Failed to load configuration: {0}")]
    Config(#[from] ::config::ConfigError),
    #[error("Analysis worker failed: {0}")]
    Worker(String),
}

// Classifier capability error type
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClassifierError {
    #[error("Inference failed: {0}")]
    Inference(String),
    #[error("Model returned {actual} outputs, expected at least {expected}")]
    OutputShape { expected: usize, actual: usize },
    #[error("Classifier lock was poisoned by a panicking caller")]
    Poisoned,
}
