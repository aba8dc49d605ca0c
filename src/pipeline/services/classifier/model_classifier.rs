use image::{imageops::FilterType, DynamicImage};

use super::{
    interpret_barren_probability, interpret_crop_probabilities, BarrenVerdict, Classifier,
    CropPrediction,
};
use crate::error::ClassifierError;
use crate::pipeline::types::CropLabel;

/// How pixel values are laid into the input tensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputScaling {
    /// 0-255, for models that normalize internally.
    Raw,
    /// Divided by 255.
    UnitRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputSpec {
    /// Side of the square input the image is resized to.
    pub size: u32,
    pub scaling: InputScaling,
}

impl InputSpec {
    /// Barren-vs-crop model: 224x224, trained on [0, 1] inputs.
    pub const BARREN: InputSpec = InputSpec {
        size: 224,
        scaling: InputScaling::UnitRange,
    };

    /// Crop type model: 260x260, raw pixel values.
    pub const CROP: InputSpec = InputSpec {
        size: 260,
        scaling: InputScaling::Raw,
    };
}

/// `[1, size, size, 3]` float tensor in HWC order.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInput {
    pub width: u32,
    pub height: u32,
    pub data: Vec<f32>,
}

impl ModelInput {
    pub const CHANNELS: usize = 3;

    pub fn from_image(image: &DynamicImage, spec: InputSpec) -> Self {
        let resized = image
            .resize_exact(spec.size, spec.size, FilterType::Triangle)
            .to_rgb8();
        let divisor = match spec.scaling {
            InputScaling::Raw => 1.0,
            InputScaling::UnitRange => 255.0,
        };
        let data = resized
            .as_raw()
            .iter()
            .map(|&channel| channel as f32 / divisor)
            .collect();

        Self {
            width: spec.size,
            height: spec.size,
            data,
        }
    }
}

/// Raw inference runtime for one model (e.g. a TFLite or ONNX session).
pub trait ProbabilityModel: Send + Sync {
    fn input_spec(&self) -> InputSpec;
    fn infer(&self, input: &ModelInput) -> Result<Vec<f32>, ClassifierError>;
}

/// [`Classifier`] backed by a barren model and a crop model.
pub struct ModelClassifier<B, C> {
    barren_model: B,
    crop_model: C,
}

impl<B: ProbabilityModel, C: ProbabilityModel> ModelClassifier<B, C> {
    pub fn new(barren_model: B, crop_model: C) -> Self {
        Self {
            barren_model,
            crop_model,
        }
    }
}

impl<B: ProbabilityModel, C: ProbabilityModel> Classifier for ModelClassifier<B, C> {
    fn is_barren(&self, image: &DynamicImage) -> Result<BarrenVerdict, ClassifierError> {
        let input = ModelInput::from_image(image, self.barren_model.input_spec());
        let output = self.barren_model.infer(&input)?;
        let prob = *output.first().ok_or(ClassifierError::OutputShape {
            expected: 1,
            actual: 0,
        })?;

        Ok(interpret_barren_probability(prob))
    }

    fn classify_crop(&self, image: &DynamicImage) -> Result<CropPrediction, ClassifierError> {
        let input = ModelInput::from_image(image, self.crop_model.input_spec());
        let probs = self.crop_model.infer(&input)?;
        let expected = CropLabel::MODEL_ORDER.len();
        if probs.len() < expected {
            return Err(ClassifierError::OutputShape {
                expected,
                actual: probs.len(),
            });
        }

        Ok(interpret_crop_probabilities(&probs))
    }
}
