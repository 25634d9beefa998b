//! Errors returned by the prediction service

use thiserror::Error;

/// Failures the prediction service reports to callers
#[derive(Debug, Error)]
pub enum ServiceError {
    /// No fitted pipeline is loaded
    #[error("Model not loaded")]
    ModelUnavailable,

    /// The request could not be turned into features or scored.
    /// The message carries the whole context chain of `reason`.
    #[error("Invalid input: {reason:#}")]
    BadInput { reason: anyhow::Error },
}

impl ServiceError {
    pub fn bad_input(reason: anyhow::Error) -> Self {
        ServiceError::BadInput { reason }
    }
}
