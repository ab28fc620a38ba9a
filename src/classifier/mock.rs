use std::collections::{HashMap, HashSet};

use super::{ClassifierError, TextClassifier};

/// In-memory classifier returning preset probabilities.
#[derive(Debug, Clone)]
pub struct MockTextClassifier {
    probabilities: HashMap<String, f32>,
    default_probability: f32,
    failing: HashSet<String>,
}

impl MockTextClassifier {
    pub fn new(default_probability: f32) -> Self {
        Self {
            probabilities: HashMap::new(),
            default_probability,
            failing: HashSet::new(),
        }
    }

    pub fn with_probability(mut self, text: impl Into<String>, probability: f32) -> Self {
        self.probabilities.insert(text.into(), probability);
        self
    }

    /// Makes `classify` fail for `text`.
    pub fn failing_on(mut self, text: impl Into<String>) -> Self {
        self.failing.insert(text.into());
        self
    }
}

impl TextClassifier for MockTextClassifier {
    fn classify(&self, text: &str) -> Result<f32, ClassifierError> {
        if self.failing.contains(text) {
            return Err(ClassifierError::InferenceFailed {
                reason: format!("mock classifier configured to fail on {text:?}"),
            });
        }
        Ok(self
            .probabilities
            .get(text)
            .copied()
            .unwrap_or(self.default_probability))
    }
}
