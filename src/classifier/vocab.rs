//! Fixed-vocabulary word encoder for the sequence classifier.
//!
//! Reproduces the Keras `Tokenizer.texts_to_sequences` rules the classifier
//! was trained with: lowercase, replace the filter characters by the split
//! string, split, then map words through the word index.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, info};

use super::error::ClassifierError;
use crate::constants::DEFAULT_VOCAB_SIZE;
use crate::hashing::hash_to_u64;

/// Keras default `filters` argument.
pub const DEFAULT_FILTERS: &str = "!\"#$%&()*+,-./:;<=>?@[\\]^_`{|}~\t\n";

/// Maps text onto classifier input ids.
pub trait TextEncoder: Send + Sync {
    /// Encodes `text` into word ids (unpadded).
    fn encode(&self, text: &str) -> Vec<u32>;

    /// Encodes and pads/truncates to `len` positions, both at the end.
    fn encode_padded(&self, text: &str, len: usize) -> Vec<u32> {
        let mut ids = self.encode(text);
        ids.truncate(len);
        ids.resize(len, 0);
        ids
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum VocabFile {
    /// Output of Keras `tokenizer.to_json()`.
    Keras {
        #[allow(dead_code)]
        class_name: String,
        config: KerasTokenizerConfig,
    },
    Flat(FlatVocab),
}

#[derive(Debug, Deserialize)]
struct KerasTokenizerConfig {
    num_words: Option<usize>,
    filters: Option<String>,
    lower: Option<bool>,
    split: Option<String>,
    oov_token: Option<String>,
    /// Keras stores this as a JSON-encoded string.
    word_index: String,
}

#[derive(Debug, Deserialize)]
struct FlatVocab {
    word_index: HashMap<String, u32>,
    num_words: Option<usize>,
    oov_token: Option<String>,
    filters: Option<String>,
    lower: Option<bool>,
    split: Option<String>,
}

#[derive(Debug, Clone)]
enum VocabBackend {
    Table {
        word_index: HashMap<String, u32>,
        num_words: Option<usize>,
        oov_index: Option<u32>,
    },
    Hashing {
        num_words: usize,
    },
}

/// Word-index encoder (supports a hashing stub mode).
#[derive(Debug, Clone)]
pub struct VocabEncoder {
    backend: VocabBackend,
    filters: HashSet<char>,
    lower: bool,
    split: String,
}

impl VocabEncoder {
    /// Builds an encoder from an in-memory word index with Keras defaults.
    pub fn from_word_index(
        word_index: HashMap<String, u32>,
        num_words: Option<usize>,
        oov_token: Option<&str>,
    ) -> Self {
        let oov_index = oov_token.and_then(|token| word_index.get(token).copied());
        Self {
            backend: VocabBackend::Table {
                word_index,
                num_words: num_words.filter(|&n| n > 0),
                oov_index,
            },
            filters: DEFAULT_FILTERS.chars().collect(),
            lower: true,
            split: " ".to_string(),
        }
    }

    /// Loads a vocabulary JSON file (flat layout or Keras `to_json()` output).
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let load_err = |reason: String| ClassifierError::VocabularyLoadFailed {
            path: path.to_path_buf(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let file: VocabFile =
            serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))?;

        let (word_index, num_words, oov_token, filters, lower, split) = match file {
            VocabFile::Keras { config, .. } => {
                let word_index: HashMap<String, u32> = serde_json::from_str(&config.word_index)
                    .map_err(|e| load_err(format!("invalid word_index: {}", e)))?;
                (
                    word_index,
                    config.num_words,
                    config.oov_token,
                    config.filters,
                    config.lower,
                    config.split,
                )
            }
            VocabFile::Flat(flat) => (
                flat.word_index,
                flat.num_words,
                flat.oov_token,
                flat.filters,
                flat.lower,
                flat.split,
            ),
        };

        if word_index.is_empty() {
            return Err(load_err("word_index is empty".to_string()));
        }

        let split = split.unwrap_or_else(|| " ".to_string());
        if split.is_empty() {
            return Err(load_err("split must not be empty".to_string()));
        }

        let mut encoder = Self::from_word_index(word_index, num_words, oov_token.as_deref());
        if let Some(filters) = filters {
            encoder.filters = filters.chars().collect();
        }
        encoder.lower = lower.unwrap_or(true);
        encoder.split = split;

        info!(
            path = %path.display(),
            words = encoder.len(),
            num_words = ?num_words,
            "Classifier vocabulary loaded"
        );

        Ok(encoder)
    }

    /// Hashing encoder: id 1 is OOV, words hash into `2..num_words`.
    pub fn stub(num_words: usize) -> Self {
        Self {
            backend: VocabBackend::Hashing {
                num_words: num_words.max(3),
            },
            filters: DEFAULT_FILTERS.chars().collect(),
            lower: true,
            split: " ".to_string(),
        }
    }

    /// Splits text into words the way the vocabulary was fitted.
    pub fn words(&self, text: &str) -> Vec<String> {
        let text = if self.lower {
            text.to_lowercase()
        } else {
            text.to_string()
        };

        let mut translated = String::with_capacity(text.len());
        for ch in text.chars() {
            if self.filters.contains(&ch) {
                translated.push_str(&self.split);
            } else {
                translated.push(ch);
            }
        }

        translated
            .split(self.split.as_str())
            .filter(|word| !word.is_empty())
            .map(str::to_string)
            .collect()
    }

    fn word_id(&self, word: &str) -> Option<u32> {
        match &self.backend {
            VocabBackend::Table {
                word_index,
                num_words,
                oov_index,
            } => match word_index.get(word) {
                Some(&id) if num_words.is_some_and(|n| id as usize >= n) => *oov_index,
                Some(&id) => Some(id),
                None => *oov_index,
            },
            VocabBackend::Hashing { num_words } => {
                let buckets = (*num_words - 2) as u64;
                Some(2 + (hash_to_u64(word.as_bytes()) % buckets) as u32)
            }
        }
    }

    /// Exclusive upper bound of every id this encoder can emit.
    pub fn id_bound(&self) -> usize {
        match &self.backend {
            VocabBackend::Table {
                word_index,
                num_words,
                ..
            } => {
                let max_id = word_index.values().copied().max().unwrap_or(0) as usize + 1;
                num_words.map_or(max_id, |n| n.min(max_id))
            }
            VocabBackend::Hashing { num_words } => *num_words,
        }
    }

    /// Number of words in the index (0 for the hashing stub).
    pub fn len(&self) -> usize {
        match &self.backend {
            VocabBackend::Table { word_index, .. } => word_index.len(),
            VocabBackend::Hashing { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_stub(&self) -> bool {
        matches!(self.backend, VocabBackend::Hashing { .. })
    }
}

impl Default for VocabEncoder {
    /// The hashing stub sized like the trained vocabulary.
    fn default() -> Self {
        Self::stub(DEFAULT_VOCAB_SIZE)
    }
}

impl TextEncoder for VocabEncoder {
    fn encode(&self, text: &str) -> Vec<u32> {
        let ids: Vec<u32> = self
            .words(text)
            .iter()
            .filter_map(|word| self.word_id(word))
            .collect();
        debug!(text_len = text.len(), ids = ids.len(), "Encoded classifier input");
        ids
    }
}
