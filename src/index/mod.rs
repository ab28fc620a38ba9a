//! Reference corpus, its embeddings and nearest-neighbor lookup.
//!
//! [`ReferenceIndex`] holds the corpus texts with their f16 vectors and is
//! built once at startup ([`ReferenceIndex::load_or_build`]). [`SimilarityIndex`]
//! pairs it with a [`TextEmbedder`] to answer [`SimilarityIndex::lookup`].

mod error;
/// Cosine similarity helpers.
pub mod similarity;
/// Embeddings snapshot persistence.
pub mod store;


pub use error::IndexError;
pub use similarity::{best_match, cosine_similarity_f16_f32, rescale_similarity};
pub use store::{EmbeddingSnapshot, read_snapshot, write_snapshot};

use std::path::Path;
use std::sync::Arc;

use half::f16;
use moka::sync::Cache;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::embedding::{EmbeddingError, TextEmbedder};
use crate::hashing::{corpus_fingerprint, hash_text};
use similarity::f32_to_f16_vec;

/// One record of the reference dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReferenceRecord {
    pub text: String,
    /// Dataset label (unused for scoring).
    #[serde(default)]
    pub label: Option<serde_json::Value>,
}

/// The known texts, in dataset order.
#[derive(Debug, Clone, Default)]
pub struct ReferenceCorpus {
    records: Vec<ReferenceRecord>,
}

impl ReferenceCorpus {
    /// Loads a JSON array of `{text, label}` records.
    pub fn load(path: &Path) -> Result<Self, IndexError> {
        let load_err = |reason: String| IndexError::CorpusLoad {
            path: path.to_path_buf(),
            reason,
        };

        let content = std::fs::read_to_string(path).map_err(|e| load_err(e.to_string()))?;
        let records: Vec<ReferenceRecord> =
            serde_json::from_str(&content).map_err(|e| load_err(e.to_string()))?;

        if records.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        info!(path = %path.display(), records = records.len(), "Reference corpus loaded");
        Ok(Self { records })
    }

    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            records: texts
                .into_iter()
                .map(|text| ReferenceRecord {
                    text: text.into(),
                    label: None,
                })
                .collect(),
        }
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.records.iter().map(|r| r.text.as_str())
    }

    pub fn records(&self) -> &[ReferenceRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn fingerprint(&self) -> [u8; 32] {
        corpus_fingerprint(self.texts())
    }
}

/// Reference texts with their row-major f16 embeddings.
#[derive(Debug, Clone)]
pub struct ReferenceIndex {
    texts: Vec<String>,
    vectors: Vec<f16>,
    dim: usize,
}

impl ReferenceIndex {
    /// Builds an index from precomputed parts. Rejects an empty corpus.
    pub fn from_parts(
        texts: Vec<String>,
        vectors: Vec<f16>,
        dim: usize,
    ) -> Result<Self, IndexError> {
        if texts.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }
        if dim == 0 {
            return Err(IndexError::DimensionMismatch {
                expected: 1,
                actual: 0,
            });
        }
        if vectors.len() != texts.len() * dim {
            return Err(IndexError::CountMismatch {
                texts: texts.len(),
                vectors: vectors.len() / dim,
            });
        }

        Ok(Self { texts, vectors, dim })
    }

    /// Builds an index from f32 embeddings, one per text.
    pub fn from_embeddings(
        texts: Vec<String>,
        embeddings: Vec<Vec<f32>>,
        dim: usize,
    ) -> Result<Self, IndexError> {
        if embeddings.len() != texts.len() {
            return Err(IndexError::CountMismatch {
                texts: texts.len(),
                vectors: embeddings.len(),
            });
        }

        let mut vectors = Vec::with_capacity(texts.len() * dim);
        for embedding in &embeddings {
            if embedding.len() != dim {
                return Err(IndexError::DimensionMismatch {
                    expected: dim,
                    actual: embedding.len(),
                });
            }
            vectors.extend(f32_to_f16_vec(embedding));
        }

        Self::from_parts(texts, vectors, dim)
    }

    /// Embeds every corpus text.
    pub fn build<E: TextEmbedder + ?Sized>(
        corpus: &ReferenceCorpus,
        embedder: &E,
    ) -> Result<Self, IndexError> {
        if corpus.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        info!(records = corpus.len(), "Computing reference embeddings (one-time)");
        let texts: Vec<&str> = corpus.texts().collect();
        let embeddings = embedder.embed_batch(&texts)?;

        Self::from_embeddings(
            texts.into_iter().map(str::to_string).collect(),
            embeddings,
            embedder.embedding_dim(),
        )
    }

    /// Reuses the snapshot at `snapshot_path` when it matches `corpus` and the
    /// embedder dimension; otherwise embeds the corpus and rewrites the snapshot.
    pub fn load_or_build<E: TextEmbedder + ?Sized>(
        corpus: &ReferenceCorpus,
        embedder: &E,
        snapshot_path: &Path,
    ) -> Result<Self, IndexError> {
        if corpus.is_empty() {
            return Err(IndexError::EmptyCorpus);
        }

        let dim = embedder.embedding_dim();
        let fingerprint = corpus.fingerprint();

        if snapshot_path.exists() {
            match read_snapshot(snapshot_path) {
                Ok(snapshot) if snapshot.matches(dim, corpus.len(), &fingerprint) => {
                    if let Some(vectors) = snapshot.to_f16_vectors() {
                        info!(
                            path = %snapshot_path.display(),
                            count = corpus.len(),
                            dim,
                            "Reference embeddings loaded from snapshot"
                        );
                        let texts = corpus.texts().map(str::to_string).collect();
                        return Self::from_parts(texts, vectors, dim);
                    }
                    warn!(
                        path = %snapshot_path.display(),
                        "Snapshot payload is truncated, rebuilding"
                    );
                }
                Ok(snapshot) => {
                    warn!(
                        path = %snapshot_path.display(),
                        snapshot_dim = snapshot.dim,
                        snapshot_count = snapshot.count,
                        dim,
                        count = corpus.len(),
                        "Embeddings snapshot is stale, rebuilding"
                    );
                }
                Err(e) => {
                    warn!(error = %e, "Embeddings snapshot unreadable, rebuilding");
                }
            }
        }

        let index = Self::build(corpus, embedder)?;
        let snapshot = EmbeddingSnapshot::new(index.dim, fingerprint, &index.vectors);
        match write_snapshot(snapshot_path, &snapshot) {
            Ok(()) => info!(path = %snapshot_path.display(), "Embeddings snapshot written"),
            Err(e) => warn!(error = %e, "Failed to write embeddings snapshot"),
        }

        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.texts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.texts.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn text(&self, idx: usize) -> Option<&str> {
        self.texts.get(idx).map(String::as_str)
    }

    pub fn vector(&self, idx: usize) -> Option<&[f16]> {
        self.vectors.chunks_exact(self.dim).nth(idx)
    }

    pub fn vectors(&self) -> impl Iterator<Item = &[f16]> {
        self.vectors.chunks_exact(self.dim)
    }

    /// Index and raw cosine of the closest reference for `query`.
    pub fn nearest(&self, query: &[f32]) -> Result<(usize, f32), IndexError> {
        if query.len() != self.dim {
            return Err(IndexError::DimensionMismatch {
                expected: self.dim,
                actual: query.len(),
            });
        }

        best_match(query, self.vectors()).ok_or_else(|| {
            IndexError::Embedding(EmbeddingError::InferenceFailed {
                reason: "query produced no comparable similarity score".to_string(),
            })
        })
    }
}

/// Closest reference text and its similarity in `[0, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SimilarityMatch {
    pub text: String,
    pub score: f32,
}

/// Embedder + reference index with an optional exact-text lookup cache.
pub struct SimilarityIndex<E> {
    embedder: E,
    index: Arc<ReferenceIndex>,
    cache: Option<Cache<[u8; 32], SimilarityMatch>>,
}

impl<E> std::fmt::Debug for SimilarityIndex<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SimilarityIndex")
            .field("references", &self.index.len())
            .field("dim", &self.index.dim())
            .field("cache", &self.cache.as_ref().map(|c| c.entry_count()))
            .finish()
    }
}

impl<E: TextEmbedder> SimilarityIndex<E> {
    /// `cache_capacity == 0` disables the lookup cache.
    pub fn new(
        embedder: E,
        index: Arc<ReferenceIndex>,
        cache_capacity: u64,
    ) -> Result<Self, IndexError> {
        if embedder.embedding_dim() != index.dim() {
            return Err(IndexError::DimensionMismatch {
                expected: index.dim(),
                actual: embedder.embedding_dim(),
            });
        }

        let cache = (cache_capacity > 0).then(|| Cache::new(cache_capacity));
        Ok(Self {
            embedder,
            index,
            cache,
        })
    }

    /// Best-matching reference text for `text` (first maximum in corpus order).
    pub fn lookup(&self, text: &str) -> Result<SimilarityMatch, IndexError> {
        let key = hash_text(text);
        if let Some(cache) = &self.cache
            && let Some(hit) = cache.get(&key)
        {
            debug!(text_len = text.len(), "Similarity lookup cache hit");
            return Ok(hit);
        }

        let query = self.embedder.embed(text)?;
        if query.iter().any(|v| !v.is_finite()) {
            return Err(IndexError::Embedding(EmbeddingError::InferenceFailed {
                reason: "embedding contains non-finite values".to_string(),
            }));
        }

        let (idx, raw) = self.index.nearest(&query)?;
        let text_match = self.index.text(idx).ok_or(IndexError::CountMismatch {
            texts: self.index.len(),
            vectors: idx + 1,
        })?;

        let result = SimilarityMatch {
            text: text_match.to_string(),
            score: rescale_similarity(raw),
        };

        debug!(
            text_len = text.len(),
            reference = idx,
            raw_cosine = raw,
            score = result.score,
            "Similarity lookup"
        );

        if let Some(cache) = &self.cache {
            cache.insert(key, result.clone());
        }

        Ok(result)
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    pub fn reference(&self) -> &ReferenceIndex {
        &self.index
    }

    pub fn cache_enabled(&self) -> bool {
        self.cache.is_some()
    }
}
