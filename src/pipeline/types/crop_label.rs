use serde::Serialize;
use std::fmt;

/// Closed set of crops the classifier can report, plus the `Unknown` sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CropLabel {
    Maize,
    Rice,
    Soybean,
    Sugarcane,
    Unknown,
}

impl CropLabel {
    /// Labels in the order of the crop model's output vector.
    pub const MODEL_ORDER: [CropLabel; 4] = [
        CropLabel::Maize,
        CropLabel::Rice,
        CropLabel::Soybean,
        CropLabel::Sugarcane,
    ];

    pub fn from_model_index(index: usize) -> Option<Self> {
        Self::MODEL_ORDER.get(index).copied()
    }

    pub fn is_known(&self) -> bool {
        *self != CropLabel::Unknown
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CropLabel::Maize => "Maize",
            CropLabel::Rice => "Rice",
            CropLabel::Soybean => "Soybean",
            CropLabel::Sugarcane => "Sugarcane",
            CropLabel::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CropLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
