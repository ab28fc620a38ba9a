//! Cross-cutting, shared constants.
//!
//! The scoring constants are the tuned defaults for the combiner; the
//! runtime [`CombinerConfig`](crate::scoring::CombinerConfig) starts from them.
//!
//! # Dimension Invariants
//!
//! The reference snapshot, the embedder and the index must agree on one vector
//! dimension. Use [`validate_embedding_dim`] at module boundaries to catch
//! mismatches early.

/// Fixed sequence length fed to the sequence classifier.
pub const CLASSIFIER_MAX_LEN: usize = 300;

/// Default vocabulary size (`num_words`) of the classifier tokenizer.
pub const DEFAULT_VOCAB_SIZE: usize = 20_000;

/// Default out-of-vocabulary token of the classifier tokenizer.
pub const DEFAULT_OOV_TOKEN: &str = "<OOV>";

/// Default output dimension of the sentence embedder.
pub const DEFAULT_EMBEDDING_DIM: usize = 768;

/// Default max tokens for the sentence embedder.
pub const DEFAULT_EMBEDDER_MAX_SEQ_LEN: usize = 128;

/// Units (and language probes) with fewer trimmed characters are not scored.
pub const MIN_SCORABLE_CHARS: usize = 10;

/// Weight of the sequence-model probability in the combined score.
pub const SEQUENCE_WEIGHT: f64 = 0.4;

/// Weight of the semantic similarity in the combined score.
pub const SEMANTIC_WEIGHT: f64 = 0.6;

/// Multiplier applied to the semantic score when unit and match languages differ.
pub const LANGUAGE_MISMATCH_PENALTY: f64 = 0.85;

/// Plagiarism threshold for English units.
pub const ENGLISH_THRESHOLD: f64 = 0.72;

/// Plagiarism threshold for non-English units.
pub const OTHER_THRESHOLD: f64 = 0.78;

/// Width of the near-miss band below the threshold.
pub const SUSPICIOUS_BAND: f64 = 0.10;

/// Sequence probability below which a high combined score is only suspicious.
pub const SEQUENCE_AGREEMENT_MIN: f64 = 0.55;

/// Semantic score below which a high combined score is only suspicious.
pub const SEMANTIC_AGREEMENT_MIN: f64 = 0.60;

/// Non-ASCII share of alphanumerics above which the heuristic picks `Other`.
pub const NON_ASCII_RATIO_THRESHOLD: f64 = 0.2;

/// Default capacity of the similarity lookup cache.
pub const DEFAULT_LOOKUP_CACHE_CAPACITY: u64 = 10_000;

/// Error returned when dimension validation fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DimValidationError {
    /// Embedding dimension cannot be zero.
    ZeroDimension,
    /// Runtime dimension does not match expected dimension.
    DimensionMismatch { expected: usize, actual: usize },
}

impl std::fmt::Display for DimValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::ZeroDimension => write!(f, "embedding dimension cannot be zero"),
            Self::DimensionMismatch { expected, actual } => {
                write!(
                    f,
                    "dimension mismatch: expected {}, got {}",
                    expected, actual
                )
            }
        }
    }
}

impl std::error::Error for DimValidationError {}

/// Validates that a runtime embedding dimension matches the expected dimension.
///
/// # Example
///
/// ```
/// use shield::constants::validate_embedding_dim;
///
/// validate_embedding_dim(768, 768).unwrap();
/// assert!(validate_embedding_dim(384, 768).is_err());
/// ```
pub fn validate_embedding_dim(actual: usize, expected: usize) -> Result<(), DimValidationError> {
    if expected == 0 {
        return Err(DimValidationError::ZeroDimension);
    }
    if actual != expected {
        return Err(DimValidationError::DimensionMismatch { expected, actual });
    }
    Ok(())
}
