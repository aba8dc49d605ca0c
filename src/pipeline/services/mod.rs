pub mod classifier;
pub mod image;
pub mod voting;

pub use classifier::{BarrenVerdict, Classifier, CropPrediction};
pub use voting::{LocationFormatter, VoteAggregator};
