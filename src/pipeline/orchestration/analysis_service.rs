use std::sync::Arc;
use std::time::Duration;

use futures::future::BoxFuture;
use futures::task::{Context, Poll};
use image::DynamicImage;
use tower::timeout::TimeoutLayer;
use tower::util::BoxService;
use tower::{BoxError, Service, ServiceBuilder};

use super::analysis_pipeline::AnalysisPipeline;
use crate::error::AnalysisError;
use crate::pipeline::services::classifier::Classifier;
use crate::pipeline::types::AnalysisResult;

/// Boxed analysis service produced by [`AnalysisServiceBuilder::build`].
pub type BoxAnalysisService = BoxService<DynamicImage, AnalysisResult, BoxError>;

pub struct AnalysisServiceBuilder<C> {
    pipeline: Arc<AnalysisPipeline<C>>,
    analysis_timeout: Option<Duration>,
}

impl<C: Classifier + 'static> AnalysisServiceBuilder<C> {
    pub fn analysis_timeout(mut self, analysis_timeout: Duration) -> Self {
        self.analysis_timeout = Some(analysis_timeout);
        self
    }

    pub fn build(self) -> BoxAnalysisService {
        let service = ServiceBuilder::new()
            .option_layer(self.analysis_timeout.map(TimeoutLayer::new))
            .map_err(|err: AnalysisError| BoxError::from(err))
            .service(AnalysisService {
                pipeline: self.pipeline,
            });

        BoxService::new(service)
    }
}

/// Runs [`AnalysisPipeline::analyze`] on the blocking thread pool.
pub struct AnalysisService<C> {
    pipeline: Arc<AnalysisPipeline<C>>,
}

impl<C> Clone for AnalysisService<C> {
    fn clone(&self) -> Self {
        Self {
            pipeline: Arc::clone(&self.pipeline),
        }
    }
}

impl<C: Classifier + 'static> AnalysisService<C> {
    pub fn new(pipeline: AnalysisPipeline<C>) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn builder(pipeline: AnalysisPipeline<C>) -> AnalysisServiceBuilder<C> {
        AnalysisServiceBuilder {
            pipeline: Arc::new(pipeline),
            analysis_timeout: None,
        }
    }

    pub fn pipeline(&self) -> &AnalysisPipeline<C> {
        &self.pipeline
    }
}

impl<C: Classifier + 'static> Service<DynamicImage> for AnalysisService<C> {
    type Response = AnalysisResult;
    type Error = AnalysisError;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, image: DynamicImage) -> Self::Future {
        let pipeline = Arc::clone(&self.pipeline);

        Box::pin(async move {
            tokio::task::spawn_blocking(move || pipeline.analyze(&image))
                .await
                .map_err(|err| AnalysisError::Worker(err.to_string()))?
        })
    }
}
