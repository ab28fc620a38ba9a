//! PlagiariShield library crate (used by the server and integration tests).
//!
//! # Public API Surface
//!
//! The exports are organized by module:
//!
//! ## Core Types
//! - [`Config`], [`ConfigError`] - Server configuration
//! - [`ScoringPipeline`], [`UnitOutcome`] - Per-document scoring
//! - [`Verdict`], [`VerdictLabel`], [`ScoreCombiner`] - Verdict engine
//!
//! ## Models
//! - [`SequenceClassifier`], [`VocabEncoder`], [`LstmModel`] - Sequence classifier
//! - [`SentenceEmbedder`], [`SentenceConfig`] - Sentence embeddings
//!
//! ## Reference Corpus
//! - [`ReferenceCorpus`], [`ReferenceIndex`] - Reference texts and vectors
//! - [`SimilarityIndex`], [`SimilarityMatch`] - Nearest-reference lookup
//!
//! ## Text Utilities
//! - [`segment`] - Sentence segmentation
//! - [`LanguageIdentifier`], [`LanguageBucket`] - Language bucketing
//! - Hashing functions for cache keys and corpus fingerprints
//!
//! ## Test/Mock Support
//! Mock implementations are available behind `#[cfg(any(test, feature = "mock"))]`.

pub mod classifier;
pub mod config;
pub mod constants;
pub mod embedding;
pub mod gateway;
pub mod hashing;
pub mod index;
pub mod language;
pub mod pipeline;
pub mod scoring;
pub mod segment;

pub use classifier::{
    ClassifierConfig, ClassifierError, LstmModel, SequenceClassifier, SequenceModel,
    TextClassifier, TextEncoder, VocabEncoder,
};
#[cfg(any(test, feature = "mock"))]
pub use classifier::MockTextClassifier;

pub use config::{Config, ConfigError};
pub use constants::{DimValidationError, validate_embedding_dim};
pub use embedding::{EmbeddingError, SentenceConfig, SentenceEmbedder, TextEmbedder};
#[cfg(any(test, feature = "mock"))]
pub use embedding::MockTextEmbedder;

pub use gateway::{GatewayError, HandlerState, create_router_with_state};
pub use hashing::{corpus_fingerprint, hash_text, hash_to_u64};
pub use index::{
    EmbeddingSnapshot, IndexError, ReferenceCorpus, ReferenceIndex, SimilarityIndex,
    SimilarityMatch,
};
pub use language::{Detection, LanguageBucket, LanguageDetector, LanguageIdentifier};
pub use pipeline::{PipelineError, ScoringPipeline, UnitFailure, UnitOutcome};
pub use scoring::{CombinerConfig, ScoreBundle, ScoreCombiner, ScoringError, Verdict, VerdictLabel};
pub use segment::{TextUnit, segment};
