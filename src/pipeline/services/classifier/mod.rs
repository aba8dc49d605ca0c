pub mod interpretation;
pub mod model_classifier;
pub mod serialized;

use image::DynamicImage;
use serde::Serialize;
use std::sync::Arc;

use crate::error::ClassifierError;
use crate::pipeline::types::CropLabel;

pub use interpretation::{interpret_barren_probability, interpret_crop_probabilities};
pub use model_classifier::{InputScaling, InputSpec, ModelClassifier, ModelInput, ProbabilityModel};
pub use serialized::{InferenceSession, SerializedClassifier};

/// Outcome of the barren (fallow) check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct BarrenVerdict {
    pub is_barren: bool,
    /// Confidence of the winning class, not the raw probability.
    pub confidence: f32,
}

impl BarrenVerdict {
    /// Safe default for unusable model output: assume crop.
    pub const NAN_FALLBACK: BarrenVerdict = BarrenVerdict {
        is_barren: false,
        confidence: 0.5,
    };

    pub fn new(is_barren: bool, confidence: f32) -> Self {
        Self {
            is_barren,
            confidence,
        }
    }

    /// Replace NaN with the safe default and clamp the confidence into [0, 1].
    pub fn sanitized(self) -> Self {
        if self.confidence.is_nan() {
            Self::NAN_FALLBACK
        } else {
            Self {
                confidence: self.confidence.clamp(0.0, 1.0),
                ..self
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CropPrediction {
    pub label: CropLabel,
    pub confidence: f32,
}

impl CropPrediction {
    pub fn new(label: CropLabel, confidence: f32) -> Self {
        Self { label, confidence }
    }

    pub fn unknown() -> Self {
        Self::new(CropLabel::Unknown, 0.0)
    }

    /// NaN becomes `Unknown` with zero confidence; finite values are clamped into [0, 1].
    pub fn sanitized(self) -> Self {
        if self.confidence.is_nan() {
            Self::unknown()
        } else {
            Self {
                confidence: self.confidence.clamp(0.0, 1.0),
                ..self
            }
        }
    }
}

/// Inference capability consumed by the analysis pipeline.
///
/// Implementations must be safe to call from several analyses at once; wrap
/// runtimes that are not reentrant in a [`SerializedClassifier`].
pub trait Classifier: Send + Sync {
    fn is_barren(&self, image: &DynamicImage) -> Result<BarrenVerdict, ClassifierError>;
    fn classify_crop(&self, image: &DynamicImage) -> Result<CropPrediction, ClassifierError>;
}

impl<C: Classifier + ?Sized> Classifier for Arc<C> {
    fn is_barren(&self, image: &DynamicImage) -> Result<BarrenVerdict, ClassifierError> {
        (**self).is_barren(image)
    }

    fn classify_crop(&self, image: &DynamicImage) -> Result<CropPrediction, ClassifierError> {
        (**self).classify_crop(image)
    }
}

impl<C: Classifier + ?Sized> Classifier for Box<C> {
    fn is_barren(&self, image: &DynamicImage) -> Result<BarrenVerdict, ClassifierError> {
        (**self).is_barren(image)
    }

    fn classify_crop(&self, image: &DynamicImage) -> Result<CropPrediction, ClassifierError> {
        (**self).classify_crop(image)
    }
}
