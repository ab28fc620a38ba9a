//! Sequence classifier adapter.
//!
//! [`SequenceClassifier`] turns text into a plagiarism probability by encoding
//! it with a [`TextEncoder`] and running a [`SequenceModel`] over the fixed
//! length sequence.

/// Classifier configuration.
pub mod config;
mod error;
/// LSTM sequence model.
pub mod lstm;
/// Word-index encoder.
pub mod vocab;

#[cfg(any(test, feature = "mock"))]
mod mock;


pub use config::{CLASSIFIER_MAX_LEN, ClassifierConfig};
pub use error::ClassifierError;
pub use lstm::{LstmModel, LstmShape};
pub use vocab::{TextEncoder, VocabEncoder};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTextClassifier;

use tracing::debug;

/// Scores a fixed-length id sequence.
pub trait SequenceModel: Send + Sync {
    /// Returns the raw model output for `ids`.
    fn predict(&self, ids: &[u32]) -> Result<f32, ClassifierError>;
}

/// Maps text to a plagiarism probability in `[0, 1]`.
pub trait TextClassifier: Send + Sync {
    fn classify(&self, text: &str) -> Result<f32, ClassifierError>;
}

impl<T: TextClassifier + ?Sized> TextClassifier for std::sync::Arc<T> {
    fn classify(&self, text: &str) -> Result<f32, ClassifierError> {
        (**self).classify(text)
    }
}

/// Encoder + model pair used by the scoring pipeline.
#[derive(Debug)]
pub struct SequenceClassifier<M, T = VocabEncoder> {
    encoder: T,
    model: M,
    max_len: usize,
}

impl<M: SequenceModel, T: TextEncoder> SequenceClassifier<M, T> {
    pub fn new(encoder: T, model: M, max_len: usize) -> Self {
        Self {
            encoder,
            model,
            max_len,
        }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    pub fn encoder(&self) -> &T {
        &self.encoder
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }
}

impl SequenceClassifier<LstmModel, VocabEncoder> {
    /// Loads the vocabulary and LSTM weights (or their stubs).
    pub fn load(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        config.validate()?;

        let encoder = if config.testing_stub {
            VocabEncoder::default()
        } else {
            VocabEncoder::load(&config.vocab_path)?
        };
        let model = LstmModel::load(config)?;

        if let Some(shape) = model.shape()
            && encoder.id_bound() > shape.vocab_size
        {
            return Err(ClassifierError::InvalidConfig {
                reason: format!(
                    "vocabulary emits ids up to {} but the model embeds only {}",
                    encoder.id_bound(),
                    shape.vocab_size
                ),
            });
        }

        Ok(Self::new(encoder, model, config.max_len))
    }

    pub fn is_stub(&self) -> bool {
        self.model.is_stub()
    }
}

impl<M: SequenceModel, T: TextEncoder> TextClassifier for SequenceClassifier<M, T> {
    fn classify(&self, text: &str) -> Result<f32, ClassifierError> {
        let ids = self.encoder.encode_padded(text, self.max_len);
        let raw = self.model.predict(&ids)?;

        if !raw.is_finite() {
            return Err(ClassifierError::InvalidOutput { value: raw });
        }

        let prob = raw.clamp(0.0, 1.0);
        debug!(text_len = text.len(), prob, "Sequence classifier scored unit");
        Ok(prob)
    }
}
