//! Error types for the snapshot pipeline.

use pricer_core::types::{InterpolationError, PricingError};
use thiserror::Error;

/// Snapshot pipeline error.
///
/// Every variant fails the whole request; nothing is retried and the
/// surface cache is left untouched.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// Malformed or out-of-range snapshot input.
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// Surface construction rejected the observations.
    #[error("Surface construction failed: {0}")]
    Surface(#[from] InterpolationError),

    /// A contract evaluation produced an unusable result.
    #[error("Pricing failed: {0}")]
    Pricing(#[from] PricingError),

    /// A worker task was lost before reporting back.
    #[error("Worker task failed: {0}")]
    WorkerFailed(String),
}

impl PipelineError {
    /// Whether the error was caused by the request payload.
    ///
    /// # Examples
    /// ```
    /// use pricer_pricing::PipelineError;
    ///
    /// assert!(PipelineError::InvalidSnapshot("no data".into()).is_client_error());
    /// assert!(!PipelineError::WorkerFailed("panic".into()).is_client_error());
    /// ```
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            PipelineError::InvalidSnapshot(_) | PipelineError::Surface(_)
        )
    }
}

impl From<serde_json::Error> for PipelineError {
    fn from(err: serde_json::Error) -> Self {
        PipelineError::InvalidSnapshot(err.to_string())
    }
}
