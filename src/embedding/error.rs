use std::path::PathBuf;
use thiserror::Error;

use crate::constants::DimValidationError;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedder model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load embedder: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("embedding inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("tokenization failed: {reason}")]
    TokenizationFailed { reason: String },

    #[error("embedding has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("invalid embedder configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<candle_core::Error> for EmbeddingError {
    fn from(err: candle_core::Error) -> Self {
        EmbeddingError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for EmbeddingError {
    fn from(err: std::io::Error) -> Self {
        EmbeddingError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}

impl From<DimValidationError> for EmbeddingError {
    fn from(err: DimValidationError) -> Self {
        match err {
            DimValidationError::ZeroDimension => EmbeddingError::InvalidConfig {
                reason: err.to_string(),
            },
            DimValidationError::DimensionMismatch { expected, actual } => {
                EmbeddingError::DimensionMismatch { expected, actual }
            }
        }
    }
}
