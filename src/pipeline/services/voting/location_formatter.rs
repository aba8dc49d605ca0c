use indexmap::IndexSet;

use crate::pipeline::services::image::OFFSET_REGION;
use crate::pipeline::types::CropDetection;

/// Location reported when every supporting region was an offset region.
pub const MULTIPLE_REGIONS: &str = "Multiple Regions";

/// Renders the set of regions supporting a crop into the detection's location.
pub trait LocationFormatter: Send + Sync {
    fn format(&self, locations: &[&str]) -> String;
}

/// `"Top-Left, Center"` style comma separated list.
#[derive(Debug, Clone, Copy, Default)]
pub struct JoinedLocations;

impl LocationFormatter for JoinedLocations {
    fn format(&self, locations: &[&str]) -> String {
        if locations.is_empty() {
            MULTIPLE_REGIONS.to_string()
        } else {
            locations.join(", ")
        }
    }
}

/// Distinct named locations in first-seen order, without the offset placeholder.
pub fn distinct_locations<'a>(
    detections: impl IntoIterator<Item = &'a CropDetection>,
) -> Vec<&'a str> {
    detections
        .into_iter()
        .map(CropDetection::location)
        .filter(|location| *location != OFFSET_REGION)
        .collect::<IndexSet<_>>()
        .into_iter()
        .collect()
}
