//! Text embedding for the similarity index.
//!
//! - [`sentence`] provides the BERT-family sentence embedder.
//! - [`TextEmbedder`] is the seam used by [`crate::index`].

/// BERT encoder with mean pooling.
pub mod bert;
/// Device selection (CPU / Metal / CUDA).
pub mod device;
mod error;
/// Sentence embedder (model or stub backend).
pub mod sentence;
/// Tokenizer loading helpers.
pub mod utils;

#[cfg(any(test, feature = "mock"))]
mod mock;

pub use error::EmbeddingError;
pub use sentence::{SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceConfig, SentenceEmbedder};

#[cfg(any(test, feature = "mock"))]
pub use mock::MockTextEmbedder;

/// Maps text to a fixed-size vector.
pub trait TextEmbedder: Send + Sync {
    /// Embeds a single string.
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Output dimension of every vector returned by [`TextEmbedder::embed`].
    fn embedding_dim(&self) -> usize;

    /// Embeds each string in order.
    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        texts.iter().map(|text| self.embed(text)).collect()
    }
}

impl<T: TextEmbedder + ?Sized> TextEmbedder for std::sync::Arc<T> {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text)
    }

    fn embedding_dim(&self) -> usize {
        (**self).embedding_dim()
    }

    fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts)
    }
}
