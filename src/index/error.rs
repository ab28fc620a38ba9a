use std::path::PathBuf;
use thiserror::Error;

use crate::embedding::EmbeddingError;

#[derive(Debug, Error)]
pub enum IndexError {
    #[error("reference corpus is empty")]
    EmptyCorpus,

    #[error("failed to load reference corpus from {path}: {reason}")]
    CorpusLoad { path: PathBuf, reason: String },

    #[error("embeddings snapshot error at {path}: {reason}")]
    Snapshot { path: PathBuf, reason: String },

    #[error("reference vector has {actual} dimensions, expected {expected}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("reference count mismatch: {texts} texts, {vectors} vectors")]
    CountMismatch { texts: usize, vectors: usize },

    #[error(transparent)]
    Embedding(#[from] EmbeddingError),
}

impl IndexError {
    /// Returns `true` for errors that make the index unusable for every request.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, IndexError::Embedding(_))
    }
}
