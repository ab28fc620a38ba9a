//! Embedding → LSTM → Dense(1) → sigmoid, in candle.
//!
//! Weights are read from `model.safetensors` in PyTorch layout:
//! `embedding.weight`, `lstm.{weight_ih_l0, weight_hh_l0, bias_ih_l0, bias_hh_l0}`
//! (gate order i, f, g, o) and `dense.{weight, bias}`. Shapes come from the
//! sibling `config.json`.

use candle_core::{DType, Device, Tensor};
use candle_nn::{Embedding, LSTM, LSTMConfig, Linear, Module, RNN, VarBuilder};
use serde::Deserialize;
use tracing::{debug, info, warn};

use super::SequenceModel;
use super::config::ClassifierConfig;
use super::error::ClassifierError;
use crate::embedding::device::select_device;
use crate::hashing::hash_to_u64;

/// Shape parameters stored next to the weights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct LstmShape {
    pub vocab_size: usize,
    pub embedding_dim: usize,
    pub hidden_size: usize,
}

struct LstmLayers {
    embedding: Embedding,
    lstm: LSTM,
    dense: Linear,
    device: Device,
}

enum ModelBackend {
    Model(Box<LstmLayers>),
    Stub,
}

/// Recurrent plagiarism classifier (supports stub mode).
pub struct LstmModel {
    backend: ModelBackend,
    shape: Option<LstmShape>,
}

impl std::fmt::Debug for LstmModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LstmModel")
            .field(
                "backend",
                &match &self.backend {
                    ModelBackend::Model(layers) => format!("Model({:?})", layers.device),
                    ModelBackend::Stub => "Stub".to_string(),
                },
            )
            .field("shape", &self.shape)
            .finish()
    }
}

impl LstmModel {
    pub fn load(config: &ClassifierConfig) -> Result<Self, ClassifierError> {
        config.validate()?;

        if config.testing_stub {
            warn!("LSTM classifier running in STUB mode (testing only)");
            return Ok(Self {
                backend: ModelBackend::Stub,
                shape: None,
            });
        }

        let config_path = config.model_dir.join("config.json");
        let weights_path = config.model_dir.join("model.safetensors");
        for path in [&config_path, &weights_path] {
            if !path.is_file() {
                return Err(ClassifierError::ModelNotFound {
                    path: path.to_path_buf(),
                });
            }
        }

        let shape: LstmShape = serde_json::from_str(&std::fs::read_to_string(&config_path)?)
            .map_err(|e| ClassifierError::ModelLoadFailed {
                reason: format!("Failed to parse config: {}", e),
            })?;

        let device = select_device();
        debug!(?device, "Selected compute device for LSTM classifier");

        let vb = unsafe {
            VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, &device)
                .map_err(|e| ClassifierError::ModelLoadFailed {
                    reason: format!("Failed to map weights: {}", e),
                })?
        };

        let layers = Self::build_layers(shape, vb, device).map_err(|e| {
            ClassifierError::ModelLoadFailed {
                reason: format!("Failed to build LSTM layers: {}", e),
            }
        })?;

        info!(
            model_dir = %config.model_dir.display(),
            vocab_size = shape.vocab_size,
            embedding_dim = shape.embedding_dim,
            hidden_size = shape.hidden_size,
            "LSTM classifier loaded"
        );

        Ok(Self {
            backend: ModelBackend::Model(Box::new(layers)),
            shape: Some(shape),
        })
    }

    fn build_layers(
        shape: LstmShape,
        vb: VarBuilder,
        device: Device,
    ) -> candle_core::Result<LstmLayers> {
        let embedding =
            candle_nn::embedding(shape.vocab_size, shape.embedding_dim, vb.pp("embedding"))?;
        let lstm = candle_nn::lstm(
            shape.embedding_dim,
            shape.hidden_size,
            LSTMConfig::default(),
            vb.pp("lstm"),
        )?;
        let dense = candle_nn::linear(shape.hidden_size, 1, vb.pp("dense"))?;

        Ok(LstmLayers {
            embedding,
            lstm,
            dense,
            device,
        })
    }

    pub fn stub() -> Self {
        Self {
            backend: ModelBackend::Stub,
            shape: None,
        }
    }

    pub fn shape(&self) -> Option<LstmShape> {
        self.shape
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, ModelBackend::Stub)
    }

    fn forward(&self, layers: &LstmLayers, ids: &[u32]) -> Result<f32, ClassifierError> {
        if let Some(shape) = self.shape
            && let Some(&bad) = ids.iter().find(|&&id| id as usize >= shape.vocab_size)
        {
            return Err(ClassifierError::InferenceFailed {
                reason: format!("token id {} outside vocabulary of {}", bad, shape.vocab_size),
            });
        }

        // [1, seq] -> [1, seq, emb] -> last hidden [1, hidden] -> [1, 1]
        let input = Tensor::new(ids, &layers.device)?.unsqueeze(0)?;
        let embedded = layers.embedding.forward(&input)?;
        let states = layers.lstm.seq(&embedded)?;
        let last = states
            .last()
            .ok_or_else(|| ClassifierError::InferenceFailed {
                reason: "empty input sequence".to_string(),
            })?;
        let logits = layers.dense.forward(last.h())?;
        let prob = candle_nn::ops::sigmoid(&logits)?.flatten_all()?.to_vec1::<f32>()?;

        prob.first()
            .copied()
            .ok_or_else(|| ClassifierError::InferenceFailed {
                reason: "classifier returned no output".to_string(),
            })
    }

    fn forward_stub(ids: &[u32]) -> f32 {
        let seed = hash_to_u64(bytemuck::cast_slice(ids));
        ((seed >> 40) as f32) / ((1u64 << 24) as f32)
    }
}

impl SequenceModel for LstmModel {
    fn predict(&self, ids: &[u32]) -> Result<f32, ClassifierError> {
        match &self.backend {
            ModelBackend::Model(layers) => self.forward(layers, ids),
            ModelBackend::Stub => Ok(Self::forward_stub(ids)),
        }
    }
}
