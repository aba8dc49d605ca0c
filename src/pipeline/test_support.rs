//! Scripted classifier and marker images shared by pipeline tests.

use image::{DynamicImage, Rgb, RgbImage};
use std::collections::HashMap;
use std::sync::Mutex;
use tracing::Level;

use crate::error::ClassifierError;
use crate::pipeline::services::classifier::{BarrenVerdict, Classifier, CropPrediction};
use crate::pipeline::types::CropLabel;

pub const FIELD_SIZE: u32 = 900;
const BLOCK: u32 = 150;
const MARKER_STEP: u8 = 40;
const SKY: Rgb<u8> = Rgb([110, 170, 235]);

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(Level::DEBUG)
        .try_init();
}

/// Which part of the test field a classifier call was made on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Full,
    Aligned(usize),
    Offset(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Call {
    Barren,
    Crop,
}

/// 900x900 field split into 150px blocks. Every block carries a colour that
/// encodes its block coordinates, so any aligned or offset cell can be
/// recognised from its top-left pixel.
pub fn marker_field() -> DynamicImage {
    marker_field_with_sky(&[])
}

/// Same as [`marker_field`] with the given aligned cells painted as sky.
/// Cells 0, 1, 3 and 4 hold the offset cells' markers and must stay unpainted.
pub fn marker_field_with_sky(sky_cells: &[usize]) -> DynamicImage {
    let image = RgbImage::from_fn(FIELD_SIZE, FIELD_SIZE, |x, y| {
        let cell = (y / 300 * 3 + x / 300) as usize;
        if sky_cells.contains(&cell) {
            SKY
        } else {
            let (bx, by) = ((x / BLOCK) as u8, (y / BLOCK) as u8);
            Rgb([bx * MARKER_STEP, by * MARKER_STEP, 0])
        }
    });
    DynamicImage::ImageRgb8(image)
}

/// Anything that is not a 300px cell of the test field is the full image.
pub fn target_of(image: &DynamicImage) -> Target {
    if image.width() != FIELD_SIZE / 3 {
        return Target::Full;
    }

    let px = image.to_rgb8().get_pixel(0, 0).0;
    let (bx, by) = ((px[0] / MARKER_STEP) as usize, (px[1] / MARKER_STEP) as usize);
    if bx % 2 == 0 && by % 2 == 0 {
        Target::Aligned(by / 2 * 3 + bx / 2)
    } else {
        Target::Offset((by - 1) / 2 * 2 + (bx - 1) / 2)
    }
}

/// Classifier answering from a per-target script. Unscripted targets are
/// cultivated (0.9) with an `Unknown` crop.
pub struct ScriptedClassifier {
    barren: HashMap<Target, BarrenVerdict>,
    crops: HashMap<Target, CropPrediction>,
    failing: Option<Target>,
    calls: Mutex<Vec<(Target, Call)>>,
}

impl ScriptedClassifier {
    pub fn new() -> Self {
        Self {
            barren: HashMap::new(),
            crops: HashMap::new(),
            failing: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub fn barren(mut self, target: Target, is_barren: bool, confidence: f32) -> Self {
        self.barren
            .insert(target, BarrenVerdict::new(is_barren, confidence));
        self
    }

    pub fn crop(mut self, target: Target, label: CropLabel, confidence: f32) -> Self {
        self.crops
            .insert(target, CropPrediction::new(label, confidence));
        self
    }

    pub fn failing_on(mut self, target: Target) -> Self {
        self.failing = Some(target);
        self
    }

    pub fn calls(&self) -> Vec<(Target, Call)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn was_called(&self, target: Target) -> bool {
        self.calls().iter().any(|(t, _)| *t == target)
    }

    fn record(&self, target: Target, call: Call) -> Result<(), ClassifierError> {
        self.calls.lock().unwrap().push((target, call));
        if self.failing == Some(target) {
            return Err(ClassifierError::Inference(format!(
                "scripted failure on {target:?}"
            )));
        }
        Ok(())
    }
}

impl Classifier for ScriptedClassifier {
    fn is_barren(&self, image: &DynamicImage) -> Result<BarrenVerdict, ClassifierError> {
        let target = target_of(image);
        self.record(target, Call::Barren)?;
        Ok(self
            .barren
            .get(&target)
            .copied()
            .unwrap_or(BarrenVerdict::new(false, 0.9)))
    }

    fn classify_crop(&self, image: &DynamicImage) -> Result<CropPrediction, ClassifierError> {
        let target = target_of(image);
        self.record(target, Call::Crop)?;
        Ok(self
            .crops
            .get(&target)
            .copied()
            .unwrap_or_else(CropPrediction::unknown))
    }
}
