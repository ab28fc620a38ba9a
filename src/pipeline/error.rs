use thiserror::Error;

use crate::classifier::ClassifierError;
use crate::index::IndexError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum PipelineError {
    /// Unusable for every request (e.g. empty reference corpus).
    #[error("scoring pipeline misconfigured: {0}")]
    Configuration(String),

    #[error("sequence classifier failed: {0}")]
    Classifier(#[from] ClassifierError),

    #[error("similarity lookup failed: {0}")]
    Similarity(IndexError),

    #[error(transparent)]
    Scoring(#[from] ScoringError),
}

impl From<IndexError> for PipelineError {
    fn from(err: IndexError) -> Self {
        if err.is_fatal() {
            PipelineError::Configuration(err.to_string())
        } else {
            PipelineError::Similarity(err)
        }
    }
}

impl PipelineError {
    /// Returns `true` if the error only affects the unit being scored.
    pub fn is_unit_recoverable(&self) -> bool {
        matches!(
            self,
            PipelineError::Classifier(_) | PipelineError::Similarity(_)
        )
    }
}
