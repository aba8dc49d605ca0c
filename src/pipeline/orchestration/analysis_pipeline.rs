//! Crop analysis orchestrator: barren check, full-image prior, grid sweep and voting.
use image::DynamicImage;
use rayon::prelude::*;
use std::time::Instant;
use tracing::{debug, info};

use crate::{
    config::AnalysisConfig,
    error::{AnalysisError, ClassifierError},
    pipeline::services::{
        classifier::Classifier,
        image::{RegionSplitter, SkyFilter, Tile},
        voting::{LocationFormatter, VoteAggregator, VoteThresholds},
    },
    pipeline::types::{AnalysisResult, CropDetection},
};

/// What the sweep concluded about one region.
#[derive(Debug, Clone, PartialEq)]
enum RegionOutcome {
    Sky,
    Barren,
    LowConfidence,
    Vote(CropDetection),
}

#[derive(Default)]
struct GridSweepReport {
    regions: usize,
    sky: usize,
    barren: usize,
    low_confidence: usize,
    accepted: usize,
}

/// Runs the analysis stages in a fixed order over one image per call.
///
/// The pipeline keeps no state between calls; share it behind an `Arc` to
/// serve concurrent analyses with one classifier.
pub struct AnalysisPipeline<C> {
    classifier: C,
    config: AnalysisConfig,
    sky_filter: SkyFilter,
    aggregator: VoteAggregator,
}

impl<C: Classifier> AnalysisPipeline<C> {
    pub fn new(classifier: C, config: AnalysisConfig) -> Result<Self, AnalysisError> {
        config.validate().map_err(AnalysisError::InvalidConfig)?;

        Ok(Self {
            sky_filter: SkyFilter::new(config.sky_filter.clone()),
            aggregator: VoteAggregator::new(VoteThresholds::from(&config)),
            classifier,
            config,
        })
    }

    pub fn with_location_formatter(mut self, formatter: Box<dyn LocationFormatter>) -> Self {
        self.aggregator = self.aggregator.with_formatter(formatter);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn analyze(&self, image: &DynamicImage) -> Result<AnalysisResult, AnalysisError> {
        let start = Instant::now();
        info!(
            "Starting crop analysis on {}x{} image",
            image.width(),
            image.height()
        );

        // Stage 1: fallow check on the whole image
        let barren = self.classifier.is_barren(image)?.sanitized();
        let mut is_global_barren = barren.is_barren;
        let barren_confidence = barren.confidence;
        debug!(
            "Fallow check: barren={} confidence={:.1}%",
            is_global_barren,
            barren_confidence * 100.0
        );

        // Stage 2: full image crop prior, always computed
        let full = self.classifier.classify_crop(image)?.sanitized();
        let full_image_analysis = CropDetection::full_image_prior(full.label, full.confidence);
        debug!(
            "Full image crop: {} ({:.1}%)",
            full.label,
            full.confidence * 100.0
        );

        // Stage 3: a very confident crop model overrules the barren model.
        // barren_confidence keeps the barren model's value.
        if is_global_barren && full.confidence > self.config.false_positive_cutoff {
            debug!(
                "Fallow verdict overruled by {:.1}% crop confidence, treating as false positive",
                full.confidence * 100.0
            );
            is_global_barren = false;
        }

        // Stage 4: grid sweep
        let should_run_grid =
            !is_global_barren || full.confidence > self.config.grid_skip_cutoff;
        let votes = if should_run_grid {
            self.sweep_grid(image)?
        } else {
            debug!("Skipping grid sweep on confidently fallow land");
            Vec::new()
        };

        // Stage 5: voting
        let mut detections = self.aggregator.aggregate(&votes, full.label);
        debug!("{} detections after voting", detections.len());

        // Stage 6: the full-image crop must be part of a cultivated answer
        let prior_missing = !detections.iter().any(|d| d.crop_name() == full.label);
        if !is_global_barren && full.label.is_known() && !detections.is_empty() && prior_missing {
            debug!(
                "Full image crop {} missing from ensemble, replacing ensemble with it",
                full.label
            );
            detections = vec![CropDetection::full_image_override(
                full.label,
                full.confidence,
            )];
        }

        // Stage 7: nothing survived voting
        if !is_global_barren && detections.is_empty() && full.label.is_known() {
            debug!("No ensemble result, falling back to full image crop {}", full.label);
            detections.push(CropDetection::fallback(full.label, full.confidence));
        }

        let execution_time_ms = start.elapsed().as_millis() as u64;
        info!(
            "Crop analysis completed in {}ms: barren={} with {} detections",
            execution_time_ms,
            is_global_barren,
            detections.len()
        );

        Ok(AnalysisResult::new(
            is_global_barren,
            barren_confidence,
            full_image_analysis,
            detections,
            execution_time_ms,
        ))
    }

    /// Classify every aligned and offset region and return the accepted votes in tiling order.
    fn sweep_grid(&self, image: &DynamicImage) -> Result<Vec<CropDetection>, AnalysisError> {
        let tiles = RegionSplitter::sweep_tiles(image.width(), image.height());

        let outcomes: Vec<RegionOutcome> = if self.config.parallel_regions {
            tiles
                .par_iter()
                .map(|tile| self.classify_tile(image, tile))
                .collect::<Result<_, _>>()?
        } else {
            tiles
                .iter()
                .map(|tile| self.classify_tile(image, tile))
                .collect::<Result<_, _>>()?
        };

        let mut report = GridSweepReport {
            regions: outcomes.len(),
            ..GridSweepReport::default()
        };
        let mut votes = Vec::new();
        for outcome in outcomes {
            match outcome {
                RegionOutcome::Sky => report.sky += 1,
                RegionOutcome::Barren => report.barren += 1,
                RegionOutcome::LowConfidence => report.low_confidence += 1,
                RegionOutcome::Vote(detection) => {
                    report.accepted += 1;
                    votes.push(detection);
                }
            }
        }

        debug!(
            "Grid sweep over {} regions: {} sky, {} barren, {} low confidence, {} votes",
            report.regions, report.sky, report.barren, report.low_confidence, report.accepted
        );
        Ok(votes)
    }

    fn classify_tile(
        &self,
        image: &DynamicImage,
        tile: &Tile,
    ) -> Result<RegionOutcome, ClassifierError> {
        let cell = tile.region.crop(image);

        if self.sky_filter.is_mostly_sky(&cell) {
            debug!("Region {}: sky detected (skipped)", tile.index);
            return Ok(RegionOutcome::Sky);
        }

        if self.classifier.is_barren(&cell)?.sanitized().is_barren {
            debug!("Region {}: barren (skipped)", tile.index);
            return Ok(RegionOutcome::Barren);
        }

        let prediction = self.classifier.classify_crop(&cell)?.sanitized();
        if prediction.confidence < self.config.confidence_threshold {
            debug!(
                "Region {}: confidence too low ({:.1}%)",
                tile.index,
                prediction.confidence * 100.0
            );
            return Ok(RegionOutcome::LowConfidence);
        }

        debug!(
            "Region {}: {} ({:.1}%) at {}",
            tile.index,
            prediction.label,
            prediction.confidence * 100.0,
            tile.location()
        );
        Ok(RegionOutcome::Vote(CropDetection::new(
            prediction.label,
            prediction.confidence,
            1,
            tile.location(),
            tile.source(),
        )))
    }
}
