use std::path::PathBuf;

use super::error::ClassifierError;

/// Default classifier sequence length.
pub const CLASSIFIER_MAX_LEN: usize = crate::constants::CLASSIFIER_MAX_LEN;

#[derive(Debug, Clone)]
/// Configuration for [`LstmModel`](super::LstmModel) and [`VocabEncoder`](super::VocabEncoder).
pub struct ClassifierConfig {
    /// Directory holding `config.json` and `model.safetensors`.
    pub model_dir: PathBuf,
    /// Vocabulary JSON file.
    pub vocab_path: PathBuf,
    /// Encoded sequence length fed to the model.
    pub max_len: usize,
    /// If true, run in deterministic stub mode (no model files required).
    pub testing_stub: bool,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            vocab_path: PathBuf::new(),
            max_len: CLASSIFIER_MAX_LEN,
            testing_stub: false,
        }
    }
}

impl ClassifierConfig {
    /// Uses `vocab.json` inside `model_dir` unless a vocabulary path is set later.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        let model_dir = model_dir.into();
        let vocab_path = model_dir.join("vocab.json");
        Self {
            model_dir,
            vocab_path,
            ..Default::default()
        }
    }

    pub fn with_vocab_path<P: Into<PathBuf>>(mut self, vocab_path: P) -> Self {
        self.vocab_path = vocab_path.into();
        self
    }

    /// Creates a stub config (hashing vocabulary, hash-derived probabilities).
    pub fn stub() -> Self {
        Self {
            testing_stub: true,
            ..Default::default()
        }
    }

    /// Validates required fields for non-stub mode.
    pub fn validate(&self) -> Result<(), ClassifierError> {
        if self.max_len == 0 {
            return Err(ClassifierError::InvalidConfig {
                reason: "max_len must be greater than zero".to_string(),
            });
        }

        if self.testing_stub {
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(ClassifierError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.model_dir.is_dir() {
            return Err(ClassifierError::ModelNotFound {
                path: self.model_dir.clone(),
            });
        }

        if !self.vocab_path.is_file() {
            return Err(ClassifierError::VocabularyLoadFailed {
                path: self.vocab_path.clone(),
                reason: "file not found".to_string(),
            });
        }

        Ok(())
    }
}
