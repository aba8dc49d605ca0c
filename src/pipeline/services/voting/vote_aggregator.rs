use indexmap::IndexMap;
use tracing::debug;

use super::location_formatter::{distinct_locations, JoinedLocations, LocationFormatter};
use crate::config::AnalysisConfig;
use crate::pipeline::types::{CropDetection, CropLabel, DetectionSource};

/// Acceptance rules for vote groups.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VoteThresholds {
    pub vote_threshold: u32,
    pub confidence_threshold: f32,
    pub prior_vote_threshold: u32,
    pub prior_confidence_threshold: f32,
    pub super_high_confidence: f32,
}

impl From<&AnalysisConfig> for VoteThresholds {
    fn from(config: &AnalysisConfig) -> Self {
        Self {
            vote_threshold: config.vote_threshold,
            confidence_threshold: config.confidence_threshold,
            prior_vote_threshold: config.prior_vote_threshold,
            prior_confidence_threshold: config.prior_confidence_threshold,
            super_high_confidence: config.super_high_confidence,
        }
    }
}

impl Default for VoteThresholds {
    fn default() -> Self {
        Self::from(&AnalysisConfig::default())
    }
}

impl VoteThresholds {
    /// The full-image prior gets a lower bar; a near-certain group passes on a single vote.
    pub fn accepts(&self, votes: u32, avg_confidence: f32, is_full_prior: bool) -> bool {
        let (vote_req, conf_req) = if is_full_prior {
            (self.prior_vote_threshold, self.prior_confidence_threshold)
        } else {
            (self.vote_threshold, self.confidence_threshold)
        };
        let super_high = votes >= 1 && avg_confidence >= self.super_high_confidence;

        (votes >= vote_req && avg_confidence >= conf_req) || super_high
    }
}

/// Groups per-region votes by crop and keeps the groups with enough support.
pub struct VoteAggregator {
    thresholds: VoteThresholds,
    formatter: Box<dyn LocationFormatter>,
}

impl VoteAggregator {
    pub fn new(thresholds: VoteThresholds) -> Self {
        Self {
            thresholds,
            formatter: Box::new(JoinedLocations),
        }
    }

    pub fn with_formatter(mut self, formatter: Box<dyn LocationFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn thresholds(&self) -> &VoteThresholds {
        &self.thresholds
    }

    /// Accepted detections, one per crop, in order of each crop's first vote.
    pub fn aggregate(&self, votes: &[CropDetection], full_crop: CropLabel) -> Vec<CropDetection> {
        let mut groups: IndexMap<CropLabel, Vec<&CropDetection>> = IndexMap::new();
        for vote in votes {
            groups.entry(vote.crop_name()).or_default().push(vote);
        }

        let mut accepted = Vec::new();
        for (crop, items) in groups {
            let vote_count = items.len() as u32;
            let avg_confidence = (items.iter().map(|d| d.confidence() as f64).sum::<f64>()
                / items.len() as f64) as f32;
            let is_full_prior = crop == full_crop;

            if !self
                .thresholds
                .accepts(vote_count, avg_confidence, is_full_prior)
            {
                debug!(
                    "Vote group {}: {} votes, avg {:.1}% (prior: {}) rejected",
                    crop,
                    vote_count,
                    avg_confidence * 100.0,
                    is_full_prior
                );
                continue;
            }

            debug!(
                "Vote group {}: {} votes, avg {:.1}% (prior: {}) accepted",
                crop,
                vote_count,
                avg_confidence * 100.0,
                is_full_prior
            );

            let locations = distinct_locations(items.iter().copied());
            let source = if is_full_prior {
                DetectionSource::FullImagePrior
            } else {
                DetectionSource::GridConsensus
            };
            accepted.push(CropDetection::new(
                crop,
                avg_confidence,
                vote_count,
                self.formatter.format(&locations),
                source,
            ));
        }

        accepted
    }
}

impl Default for VoteAggregator {
    fn default() -> Self {
        Self::new(VoteThresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::services::image::OFFSET_REGION;

    fn vote(crop: CropLabel, confidence: f32, location: &str) -> CropDetection {
        let source = if location == OFFSET_REGION {
            DetectionSource::GridOffset
        } else {
            DetectionSource::GridAligned
        };
        CropDetection::new(crop, confidence, 1, location, source)
    }

    #[test]
    fn prior_crop_needs_two_votes_at_sixty_percent() {
        let votes = [
            vote(CropLabel::Rice, 0.60, "Top-Left"),
            vote(CropLabel::Rice, 0.60, "Center"),
        ];
        let accepted = VoteAggregator::default().aggregate(&votes, CropLabel::Rice);

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].crop_name(), CropLabel::Rice);
        assert_eq!(accepted[0].votes(), 2);
        assert_eq!(accepted[0].source(), DetectionSource::FullImagePrior);
        assert_eq!(accepted[0].location(), "Top-Left, Center");
        assert!((accepted[0].confidence() - 0.60).abs() < 1e-6);
    }

    #[test]
    fn non_prior_crop_with_two_votes_is_rejected() {
        let votes = [
            vote(CropLabel::Maize, 0.70, "Top-Left"),
            vote(CropLabel::Maize, 0.70, "Top-Center"),
        ];
        let accepted = VoteAggregator::default().aggregate(&votes, CropLabel::Rice);
        assert!(accepted.is_empty());
    }

    #[test]
    fn non_prior_crop_with_three_votes_is_consensus() {
        let votes = [
            vote(CropLabel::Maize, 0.70, "Top-Left"),
            vote(CropLabel::Maize, 0.66, OFFSET_REGION),
            vote(CropLabel::Maize, 0.80, "Top-Left"),
        ];
        let accepted = VoteAggregator::default().aggregate(&votes, CropLabel::Rice);

        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].source(), DetectionSource::GridConsensus);
        assert_eq!(accepted[0].votes(), 3);
        assert_eq!(accepted[0].location(), "Top-Left");
    }

    #[test]
    fn single_super_high_confidence_vote_is_accepted() {
        let votes = [vote(CropLabel::Sugarcane, 0.995, OFFSET_REGION)];

        let accepted = VoteAggregator::default().aggregate(&votes, CropLabel::Rice);
        assert_eq!(accepted.len(), 1);
        assert_eq!(accepted[0].votes(), 1);
        assert_eq!(accepted[0].source(), DetectionSource::GridConsensus);
        assert_eq!(accepted[0].location(), "Multiple Regions");

        let accepted = VoteAggregator::default().aggregate(&votes, CropLabel::Sugarcane);
        assert_eq!(accepted[0].source(), DetectionSource::FullImagePrior);
    }

    #[test]
    fn average_below_threshold_rejects_even_with_votes() {
        let votes = [
            vote(CropLabel::Soybean, 0.65, "Top-Left"),
            vote(CropLabel::Soybean, 0.65, "Top-Center"),
            vote(CropLabel::Soybean, 0.64, "Top-Right"),
        ];
        let accepted = VoteAggregator::default().aggregate(&votes, CropLabel::Rice);
        assert!(accepted.is_empty());
    }

    #[test]
    fn groups_keep_first_vote_order() {
        let votes = [
            vote(CropLabel::Soybean, 0.995, "Center"),
            vote(CropLabel::Rice, 0.9, "Top-Left"),
            vote(CropLabel::Rice, 0.9, "Mid-Left"),
        ];
        let accepted = VoteAggregator::default().aggregate(&votes, CropLabel::Rice);
        let crops: Vec<_> = accepted.iter().map(CropDetection::crop_name).collect();
        assert_eq!(crops, vec![CropLabel::Soybean, CropLabel::Rice]);
    }

    #[test]
    fn custom_formatter_replaces_joined_locations() {
        struct Counted;
        impl LocationFormatter for Counted {
            fn format(&self, locations: &[&str]) -> String {
                format!("{} regions", locations.len())
            }
        }

        let votes = [
            vote(CropLabel::Rice, 0.8, "Top-Left"),
            vote(CropLabel::Rice, 0.8, "Center"),
        ];
        let accepted = VoteAggregator::default()
            .with_formatter(Box::new(Counted))
            .aggregate(&votes, CropLabel::Rice);
        assert_eq!(accepted[0].location(), "2 regions");
    }

    #[test]
    fn thresholds_follow_configuration() {
        let config = AnalysisConfig::default().with_vote_threshold(2);
        let thresholds = VoteThresholds::from(&config);
        assert!(thresholds.accepts(2, 0.7, false));
        assert!(!VoteThresholds::default().accepts(2, 0.7, false));
    }
}
