use std::path::{Path, PathBuf};

use crate::embedding::error::EmbeddingError;

/// Default sentence embedding dimension.
pub const SENTENCE_EMBEDDING_DIM: usize = crate::constants::DEFAULT_EMBEDDING_DIM;

/// Default sentence embedder max sequence length.
pub const SENTENCE_MAX_SEQ_LEN: usize = crate::constants::DEFAULT_EMBEDDER_MAX_SEQ_LEN;

/// Files a model directory must contain.
pub const MODEL_FILES: [&str; 3] = ["config.json", "model.safetensors", "tokenizer.json"];

#[derive(Debug, Clone)]
/// Configuration for [`SentenceEmbedder`](super::SentenceEmbedder).
pub struct SentenceConfig {
    /// Directory holding `config.json`, `model.safetensors` and `tokenizer.json`.
    pub model_dir: PathBuf,
    /// Max tokens per input; longer inputs are truncated.
    pub max_seq_len: usize,
    /// Output embedding dimension (must equal the encoder hidden size).
    pub embedding_dim: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for SentenceConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            max_seq_len: SENTENCE_MAX_SEQ_LEN,
            embedding_dim: SENTENCE_EMBEDDING_DIM,
            testing_stub: false,
        }
    }
}

impl SentenceConfig {
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config (no model files; produces deterministic embeddings).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn with_embedding_dim(mut self, embedding_dim: usize) -> Self {
        self.embedding_dim = embedding_dim;
        self
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.embedding_dim == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "embedding_dim must be greater than zero".to_string(),
            });
        }

        if self.max_seq_len == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "max_seq_len must be greater than zero".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_dir.clone(),
            });
        }

        Ok(())
    }

    /// Returns the first required model file missing from `model_dir`.
    pub fn missing_file(&self) -> Option<PathBuf> {
        MODEL_FILES
            .iter()
            .map(|name| self.model_dir.join(name))
            .find(|path| !path.is_file())
    }

    pub fn model_dir(&self) -> &Path {
        &self.model_dir
    }
}
