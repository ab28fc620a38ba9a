//! Sentence embedder (BERT-family safetensors + tokenizer).
//!
//! Use [`SentenceConfig::stub`] for tests and local runs without model files.

/// Sentence embedder configuration.
pub mod config;


pub use config::{MODEL_FILES, SENTENCE_EMBEDDING_DIM, SENTENCE_MAX_SEQ_LEN, SentenceConfig};

use std::sync::Arc;

use candle_core::{Device, Tensor};
use tracing::{debug, info, warn};

use crate::constants::validate_embedding_dim;
use crate::embedding::TextEmbedder;
use crate::embedding::bert::BertEncoder;
use crate::embedding::device::select_device;
use crate::embedding::error::EmbeddingError;
use crate::embedding::utils::load_sentence_tokenizer;
use crate::hashing::hash_to_u64;

enum EmbedderBackend {
    Model {
        encoder: BertEncoder,
        tokenizer: Arc<tokenizers::Tokenizer>,
        device: Device,
    },
    Stub,
}

/// Multilingual sentence embedder (supports stub mode).
pub struct SentenceEmbedder {
    backend: EmbedderBackend,
    config: SentenceConfig,
}

impl std::fmt::Debug for SentenceEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SentenceEmbedder")
            .field(
                "backend",
                &match &self.backend {
                    EmbedderBackend::Model { device, .. } => format!("Model({:?})", device),
                    EmbedderBackend::Stub => "Stub".to_string(),
                },
            )
            .field("embedding_dim", &self.config.embedding_dim)
            .field("max_seq_len", &self.config.max_seq_len)
            .finish()
    }
}

impl SentenceEmbedder {
    /// Loads the embedder from a config (stub mode is supported).
    pub fn load(config: SentenceConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;

        if config.testing_stub {
            warn!("Sentence embedder running in STUB mode (testing only)");
            return Ok(Self {
                backend: EmbedderBackend::Stub,
                config,
            });
        }

        if let Some(path) = config.missing_file() {
            return Err(EmbeddingError::ModelNotFound { path });
        }

        let device = select_device();
        debug!(?device, "Selected compute device for sentence embedder");

        let tokenizer = load_sentence_tokenizer(&config.model_dir, config.max_seq_len)?;

        let encoder = BertEncoder::load(&config.model_dir, &device).map_err(|e| {
            EmbeddingError::ModelLoadFailed {
                reason: format!("Failed to load encoder: {}", e),
            }
        })?;

        if encoder.hidden_size() != config.embedding_dim {
            return Err(EmbeddingError::InvalidConfig {
                reason: format!(
                    "embedding_dim ({}) does not match encoder hidden_size ({})",
                    config.embedding_dim,
                    encoder.hidden_size()
                ),
            });
        }

        info!(
            model_dir = %config.model_dir.display(),
            embedding_dim = config.embedding_dim,
            max_seq_len = config.max_seq_len,
            "Sentence embedder loaded"
        );

        Ok(Self {
            backend: EmbedderBackend::Model {
                encoder,
                tokenizer: Arc::new(tokenizer),
                device,
            },
            config,
        })
    }

    fn embed_with_model(
        &self,
        text: &str,
        encoder: &BertEncoder,
        tokenizer: &tokenizers::Tokenizer,
        device: &Device,
    ) -> Result<Vec<f32>, EmbeddingError> {
        let encoding =
            tokenizer
                .encode(text, true)
                .map_err(|e| EmbeddingError::TokenizationFailed {
                    reason: e.to_string(),
                })?;

        let mut ids: Vec<u32> = encoding.get_ids().to_vec();
        let mut mask: Vec<u32> = encoding.get_attention_mask().to_vec();
        if ids.is_empty() {
            return Ok(vec![0.0; self.config.embedding_dim]);
        }
        ids.truncate(self.config.max_seq_len);
        mask.truncate(ids.len());

        debug!(
            text_len = text.len(),
            token_count = ids.len(),
            "Generating sentence embedding"
        );

        let input_ids = Tensor::new(&ids[..], device)?.unsqueeze(0)?;
        let attention_mask = Tensor::new(&mask[..], device)?.unsqueeze(0)?;

        let pooled = encoder
            .forward_pooled(&input_ids, &attention_mask)
            .map_err(|e| EmbeddingError::InferenceFailed {
                reason: format!("Encoder forward pass failed: {}", e),
            })?;

        let embedding = pooled.squeeze(0)?.to_vec1::<f32>()?;
        validate_embedding_dim(embedding.len(), self.config.embedding_dim)?;

        Ok(normalize(embedding))
    }

    fn embed_stub(&self, text: &str) -> Vec<f32> {
        let mut state = hash_to_u64(text.as_bytes());
        let mut embedding = Vec::with_capacity(self.config.embedding_dim);

        for _ in 0..self.config.embedding_dim {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            let value = ((state >> 32) as f32 / u32::MAX as f32) * 2.0 - 1.0;
            embedding.push(value);
        }

        normalize(embedding)
    }

    /// Returns `true` if running in stub mode.
    pub fn is_stub(&self) -> bool {
        matches!(self.backend, EmbedderBackend::Stub)
    }

    pub fn config(&self) -> &SentenceConfig {
        &self.config
    }
}

impl TextEmbedder for SentenceEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        match &self.backend {
            EmbedderBackend::Model {
                encoder,
                tokenizer,
                device,
            } => self.embed_with_model(text, encoder, tokenizer, device),
            EmbedderBackend::Stub => {
                debug!(text_len = text.len(), "Generating stub embedding");
                Ok(self.embed_stub(text))
            }
        }
    }

    fn embedding_dim(&self) -> usize {
        self.config.embedding_dim
    }
}

fn normalize(mut embedding: Vec<f32>) -> Vec<f32> {
    let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in &mut embedding {
            *x /= norm;
        }
    }
    embedding
}
