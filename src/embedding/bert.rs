use candle::{DType, Device, Result, Tensor};
use candle_core as candle;
use candle_nn::VarBuilder;
use candle_transformers::models::bert::{BertModel, Config};
use candle_transformers::models::xlm_roberta::{Config as XlmRobertaConfig, XLMRobertaModel};
use std::path::Path;

/// Architecture named by `model_type` in `config.json`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncoderFamily {
    Bert,
    /// Positions start at `pad_token_id + 1`.
    XlmRoberta,
}

impl EncoderFamily {
    pub fn from_config(config: &serde_json::Value) -> Self {
        match config.get("model_type").and_then(|v| v.as_str()) {
            Some("xlm-roberta") | Some("xlm_roberta") => Self::XlmRoberta,
            _ => Self::Bert,
        }
    }
}

enum Backbone {
    Bert(BertModel),
    XlmRoberta(XLMRobertaModel),
}

/// Transformer encoder with attention-masked mean pooling.
#[derive(Clone)]
pub struct BertEncoder {
    model: std::sync::Arc<Backbone>,
    family: EncoderFamily,
    hidden_size: usize,
}

fn parse_err(e: serde_json::Error) -> candle::Error {
    candle::Error::Msg(format!("Failed to parse config: {}", e))
}

impl BertEncoder {
    /// Loads `config.json` and `model.safetensors` from `model_dir`.
    pub fn load<P: AsRef<Path>>(model_dir: P, device: &Device) -> Result<Self> {
        let model_dir = model_dir.as_ref();
        let config_path = model_dir.join("config.json");
        let weights_path = model_dir.join("model.safetensors");

        let config_content = std::fs::read_to_string(config_path)?;
        let raw: serde_json::Value = serde_json::from_str(&config_content).map_err(parse_err)?;
        let family = EncoderFamily::from_config(&raw);

        let vb =
            unsafe { VarBuilder::from_mmaped_safetensors(&[weights_path], DType::F32, device)? };

        let (model, hidden_size) = match family {
            EncoderFamily::XlmRoberta => {
                let config: XlmRobertaConfig = serde_json::from_value(raw).map_err(parse_err)?;
                let vb = if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
                    vb.pp("roberta")
                } else {
                    vb
                };
                (
                    Backbone::XlmRoberta(XLMRobertaModel::new(&config, vb)?),
                    config.hidden_size,
                )
            }
            EncoderFamily::Bert => {
                let config: Config = serde_json::from_value(raw).map_err(parse_err)?;
                let model = if vb.contains_tensor("bert.embeddings.word_embeddings.weight") {
                    BertModel::load(vb.pp("bert"), &config)?
                } else if vb.contains_tensor("roberta.embeddings.word_embeddings.weight") {
                    BertModel::load(vb.pp("roberta"), &config)?
                } else {
                    BertModel::load(vb, &config)?
                };
                (Backbone::Bert(model), config.hidden_size)
            }
        };

        tracing::debug!(?family, hidden_size, "Encoder loaded");

        Ok(Self {
            model: std::sync::Arc::new(model),
            family,
            hidden_size,
        })
    }

    pub fn hidden_size(&self) -> usize {
        self.hidden_size
    }

    pub fn family(&self) -> EncoderFamily {
        self.family
    }

    /// Returns pooled sentence vectors, shape `[batch, hidden]`.
    pub fn forward_pooled(&self, input_ids: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
        let token_type_ids = input_ids.zeros_like()?;
        let hidden = match self.model.as_ref() {
            Backbone::Bert(model) => {
                model.forward(input_ids, &token_type_ids, Some(attention_mask))?
            }
            Backbone::XlmRoberta(model) => model.forward(
                input_ids,
                attention_mask,
                &token_type_ids,
                None,
                None,
                None,
            )?,
        };
        mean_pool(&hidden, attention_mask)
    }
}

/// hidden: `[batch, seq, hidden]`, mask: `[batch, seq]`.
pub fn mean_pool(hidden: &Tensor, attention_mask: &Tensor) -> Result<Tensor> {
    let mask = attention_mask.to_dtype(DType::F32)?.unsqueeze(2)?;
    let summed = hidden.broadcast_mul(&mask)?.sum(1)?;
    let counts = mask.sum(1)?.clamp(1e-9, f64::MAX)?;
    summed.broadcast_div(&counts)
}
