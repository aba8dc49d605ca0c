use image::DynamicImage;
use std::sync::Mutex;

use super::{BarrenVerdict, Classifier, CropPrediction};
use crate::error::ClassifierError;

/// An inference runtime that needs exclusive access while running.
pub trait InferenceSession: Send {
    fn is_barren(&mut self, image: &DynamicImage) -> Result<BarrenVerdict, ClassifierError>;
    fn classify_crop(&mut self, image: &DynamicImage) -> Result<CropPrediction, ClassifierError>;
}

/// Serializes calls into a non-reentrant [`InferenceSession`] so it can be
/// shared between concurrent analyses.
pub struct SerializedClassifier<S> {
    session: Mutex<S>,
}

impl<S: InferenceSession> SerializedClassifier<S> {
    pub fn new(session: S) -> Self {
        Self {
            session: Mutex::new(session),
        }
    }

    pub fn into_inner(self) -> Result<S, ClassifierError> {
        self.session
            .into_inner()
            .map_err(|_| ClassifierError::Poisoned)
    }
}

impl<S: InferenceSession> Classifier for SerializedClassifier<S> {
    fn is_barren(&self, image: &DynamicImage) -> Result<BarrenVerdict, ClassifierError> {
        let mut session = self.session.lock().map_err(|_| ClassifierError::Poisoned)?;
        session.is_barren(image)
    }

    fn classify_crop(&self, image: &DynamicImage) -> Result<CropPrediction, ClassifierError> {
        let mut session = self.session.lock().map_err(|_| ClassifierError::Poisoned)?;
        session.classify_crop(image)
    }
}
