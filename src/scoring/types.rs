use serde::{Deserialize, Serialize};

use crate::language::LanguageBucket;

/// Graded plagiarism verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerdictLabel {
    Original,
    Suspicious,
    Plagiarized,
}

impl VerdictLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerdictLabel::Original => "Original",
            VerdictLabel::Suspicious => "Suspicious",
            VerdictLabel::Plagiarized => "Plagiarized",
        }
    }
}

impl std::fmt::Display for VerdictLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrounded per-unit state the verdict is decided from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreBundle {
    /// Sequence-model probability.
    pub sequence_prob: f64,
    /// Semantic similarity before the language penalty.
    pub semantic_raw: f64,
    /// Semantic similarity after the language penalty.
    pub semantic: f64,
    /// `w_seq * sequence_prob + w_sem * semantic`.
    pub combined: f64,
    pub unit_language: LanguageBucket,
    pub match_language: LanguageBucket,
    /// Plagiarism threshold selected from `unit_language`.
    pub threshold: f64,
}

impl ScoreBundle {
    pub fn language_mismatch(&self) -> bool {
        self.unit_language != self.match_language
    }
}

/// Scored unit as returned to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub label: VerdictLabel,
    /// Combined score as a percentage, two decimals.
    pub confidence: f64,
    pub lstm_prob: f64,
    /// Post-penalty semantic similarity.
    pub semantic_similarity: f64,
    pub closest_text: String,
    pub combined_score: f64,
    pub text: String,
}

impl Verdict {
    /// `Original` with no evidence, for text too short to score.
    pub fn zero_evidence(text: impl Into<String>) -> Self {
        Self {
            label: VerdictLabel::Original,
            confidence: 0.0,
            lstm_prob: 0.0,
            semantic_similarity: 0.0,
            closest_text: String::new(),
            combined_score: 0.0,
            text: text.into(),
        }
    }
}
