use super::{BarrenVerdict, CropPrediction};
use crate::pipeline::types::CropLabel;

/// Decision boundary of the barren model's P(non-barren) output.
pub const BARREN_DECISION_BOUNDARY: f32 = 0.5;

/// Interpret the barren model's scalar output `p = P(non-barren | image)`.
///
/// The reported confidence belongs to the winning class, so it never drops
/// below 0.5 for a valid probability. NaN is read as "assume crop".
pub fn interpret_barren_probability(p: f32) -> BarrenVerdict {
    if p.is_nan() {
        return BarrenVerdict::NAN_FALLBACK;
    }

    let is_crop = p > BARREN_DECISION_BOUNDARY;
    let confidence = if is_crop { p } else { 1.0 - p };

    BarrenVerdict {
        is_barren: !is_crop,
        confidence,
    }
}

/// Argmax over the crop model's probability vector, skipping NaN entries.
pub fn interpret_crop_probabilities(probs: &[f32]) -> CropPrediction {
    let best = probs
        .iter()
        .take(CropLabel::MODEL_ORDER.len())
        .enumerate()
        .filter(|(_, p)| !p.is_nan())
        .fold(None, |best: Option<(usize, f32)>, (i, &p)| match best {
            Some((_, max)) if p <= max => best,
            _ => Some((i, p)),
        });

    match best {
        Some((index, prob)) if prob > 0.0 => CropLabel::from_model_index(index)
            .map(|label| CropPrediction::new(label, prob))
            .unwrap_or_else(CropPrediction::unknown),
        _ => CropPrediction::unknown(),
    }
}
