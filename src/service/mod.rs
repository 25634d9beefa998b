//! Prediction service - loads a fitted pipeline once and scores single applicants
//!
//! The service holds the pipeline behind an `Arc`, so clones are cheap and can
//! be handed to concurrent callers. The pipeline is never mutated after load.

pub mod error;
pub mod request;

use std::path::Path;
use std::sync::Arc;

use crate::model::FittedPipeline;
use crate::pipeline::target::CreditClass;

pub use error::ServiceError;
pub use request::*;

#[derive(Debug, Clone, Default)]
pub struct PredictionService {
    pipeline: Option<Arc<FittedPipeline>>,
}

impl PredictionService {
    /// A service with no model; every prediction fails with `ModelUnavailable`
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_pipeline(pipeline: FittedPipeline) -> Self {
        Self {
            pipeline: Some(Arc::new(pipeline)),
        }
    }

    /// Load the artifact at `path`. A missing or unreadable artifact leaves the
    /// service running without a model.
    pub fn start(path: &Path) -> Self {
        match FittedPipeline::load(path) {
            Ok(pipeline) => {
                log::info!("Loaded model from {}", path.display());
                Self::with_pipeline(pipeline)
            }
            Err(e) => {
                log::error!("Error loading model from {}: {:#}", path.display(), e);
                Self::empty()
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        self.pipeline.is_some()
    }

    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok".to_string(),
            model_loaded: self.is_ready(),
        }
    }

    /// Score one applicant
    pub fn predict(&self, application: &CreditApplication) -> Result<PredictionResponse, ServiceError> {
        let pipeline = self
            .pipeline
            .as_ref()
            .ok_or(ServiceError::ModelUnavailable)?;

        let frame = application.to_frame().map_err(ServiceError::bad_input)?;
        let probs = pipeline
            .predict_proba(&frame)
            .map_err(ServiceError::bad_input)?;

        let row = probs.into_iter().next().ok_or_else(|| {
            ServiceError::bad_input(anyhow::anyhow!("Pipeline returned no prediction"))
        })?;

        let code = crate::model::gbdt::argmax(&row);
        let credit_score = CreditClass::from_code(code).ok_or_else(|| {
            ServiceError::bad_input(anyhow::anyhow!("Classifier produced unknown class {}", code))
        })?;

        Ok(PredictionResponse {
            credit_score,
            probability: ClassProbabilities::from_codes(&row),
            risk_level: credit_score.risk_tier(),
        })
    }

    /// Drop the loaded model
    pub fn shutdown(&mut self) {
        if self.pipeline.take().is_some() {
            log::info!("Prediction service released its model");
        }
    }
}
