use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("classifier model not found at path: {path}")]
    ModelNotFound { path: PathBuf },

    #[error("failed to load classifier: {reason}")]
    ModelLoadFailed { reason: String },

    #[error("failed to load vocabulary from {path}: {reason}")]
    VocabularyLoadFailed { path: PathBuf, reason: String },

    #[error("classifier inference failed: {reason}")]
    InferenceFailed { reason: String },

    #[error("classifier produced non-finite output: {value}")]
    InvalidOutput { value: f32 },

    #[error("invalid classifier configuration: {reason}")]
    InvalidConfig { reason: String },
}

impl From<candle_core::Error> for ClassifierError {
    fn from(err: candle_core::Error) -> Self {
        ClassifierError::InferenceFailed {
            reason: err.to_string(),
        }
    }
}

impl From<std::io::Error> for ClassifierError {
    fn from(err: std::io::Error) -> Self {
        ClassifierError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}

impl From<crate::embedding::EmbeddingError> for ClassifierError {
    fn from(err: crate::embedding::EmbeddingError) -> Self {
        ClassifierError::ModelLoadFailed {
            reason: err.to_string(),
        }
    }
}
