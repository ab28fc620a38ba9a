use std::collections::{HashMap, HashSet};

use super::{EmbeddingError, TextEmbedder};

/// In-memory embedder returning preset vectors.
#[derive(Debug, Clone)]
pub struct MockTextEmbedder {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
    default_vector: Vec<f32>,
    failing: HashSet<String>,
}

impl MockTextEmbedder {
    /// Every unknown text maps to a unit vector along the first axis.
    pub fn new(dim: usize) -> Self {
        let mut default_vector = vec![0.0; dim];
        if let Some(first) = default_vector.first_mut() {
            *first = 1.0;
        }
        Self {
            dim,
            vectors: HashMap::new(),
            default_vector,
            failing: HashSet::new(),
        }
    }

    /// Registers the vector returned for `text`. Vectors are padded or cut to `dim`.
    pub fn with_vector(mut self, text: impl Into<String>, mut vector: Vec<f32>) -> Self {
        vector.resize(self.dim, 0.0);
        self.vectors.insert(text.into(), vector);
        self
    }

    pub fn with_default(mut self, mut vector: Vec<f32>) -> Self {
        vector.resize(self.dim, 0.0);
        self.default_vector = vector;
        self
    }

    /// Makes `embed` fail for `text`.
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.failing.insert(text.into());
        self
    }
}

impl TextEmbedder for MockTextEmbedder {
    fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        if self.failing.contains(text) {
            return Err(EmbeddingError::InferenceFailed {
                reason: format!("mock embedder configured to fail on {text:?}"),
            });
        }
        Ok(self
            .vectors
            .get(text)
            .cloned()
            .unwrap_or_else(|| self.default_vector.clone()))
    }

    fn embedding_dim(&self) -> usize {
        self.dim
    }
}
