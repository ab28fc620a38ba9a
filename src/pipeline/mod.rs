//! Per-unit scoring and per-document orchestration.
//!
//! [`ScoringPipeline`] owns the read-only collaborators built at startup.
//! Units are scored independently; a unit whose classifier or embedder call
//! fails becomes a [`UnitOutcome::Failed`] marker in its position.

mod error;

#[cfg(test)]
mod tests;

pub use error::PipelineError;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::classifier::TextClassifier;
use crate::constants::MIN_SCORABLE_CHARS;
use crate::embedding::TextEmbedder;
use crate::index::SimilarityIndex;
use crate::language::LanguageIdentifier;
use crate::scoring::{ScoreCombiner, Verdict};
use crate::segment::segment;

/// Label carried by failed units on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FailureLabel {
    Error,
}

/// Error marker for a unit that could not be scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitFailure {
    pub label: FailureLabel,
    pub text: String,
    pub error: String,
}

impl UnitFailure {
    pub fn new(text: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            label: FailureLabel::Error,
            text: text.into(),
            error: error.into(),
        }
    }
}

/// Result for one unit, in segmentation order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitOutcome {
    Scored(Verdict),
    Failed(UnitFailure),
}

impl UnitOutcome {
    pub fn text(&self) -> &str {
        match self {
            UnitOutcome::Scored(verdict) => &verdict.text,
            UnitOutcome::Failed(failure) => &failure.text,
        }
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        match self {
            UnitOutcome::Scored(verdict) => Some(verdict),
            UnitOutcome::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, UnitOutcome::Failed(_))
    }
}

pub struct ScoringPipeline<C, E> {
    identifier: LanguageIdentifier,
    classifier: C,
    index: SimilarityIndex<E>,
    combiner: ScoreCombiner,
}

impl<C, E> std::fmt::Debug for ScoringPipeline<C, E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScoringPipeline")
            .field("identifier", &self.identifier)
            .field("index", &self.index)
            .field("combiner", &self.combiner)
            .finish()
    }
}

impl<C: TextClassifier, E: TextEmbedder> ScoringPipeline<C, E> {
    pub fn new(
        identifier: LanguageIdentifier,
        classifier: C,
        index: SimilarityIndex<E>,
        combiner: ScoreCombiner,
    ) -> Self {
        Self {
            identifier,
            classifier,
            index,
            combiner,
        }
    }

    /// Scores one unit. Text shorter than the scorable minimum (after trimming)
    /// yields a zero-evidence `Original` without calling any collaborator.
    pub fn score_unit(&self, text: &str) -> Result<Verdict, PipelineError> {
        if text.trim().chars().count() < MIN_SCORABLE_CHARS {
            debug!(text_len = text.len(), "Unit too short, zero evidence");
            return Ok(Verdict::zero_evidence(text));
        }

        let sequence_prob = self.classifier.classify(text)?;
        let matched = self.index.lookup(text)?;

        let unit_language = self.identifier.identify(text);
        let match_language = self.identifier.identify(&matched.text);

        let bundle = self.combiner.combine(
            f64::from(sequence_prob),
            f64::from(matched.score),
            unit_language,
            match_language,
        );

        Ok(self.combiner.verdict(&bundle, matched.text, text))
    }

    /// Segments `document` and scores every non-blank unit in order.
    pub fn score_document(&self, document: &str) -> Result<Vec<UnitOutcome>, PipelineError> {
        let units = segment(document);
        let mut outcomes = Vec::with_capacity(units.len());

        for (position, unit) in units.iter().enumerate() {
            if unit.is_blank() {
                continue;
            }

            match self.score_unit(unit.text()) {
                Ok(verdict) => outcomes.push(UnitOutcome::Scored(verdict)),
                Err(e) if e.is_unit_recoverable() => {
                    warn!(position, error = %e, "Unit scoring failed");
                    outcomes.push(UnitOutcome::Failed(UnitFailure::new(
                        unit.text(),
                        e.to_string(),
                    )));
                }
                Err(e) => return Err(e),
            }
        }

        info!(
            units = outcomes.len(),
            failed = outcomes.iter().filter(|o| o.is_failed()).count(),
            "Document scored"
        );

        Ok(outcomes)
    }

    pub fn identifier(&self) -> &LanguageIdentifier {
        &self.identifier
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn index(&self) -> &SimilarityIndex<E> {
        &self.index
    }

    pub fn combiner(&self) -> &ScoreCombiner {
        &self.combiner
    }

    /// Number of texts in the reference corpus.
    pub fn reference_count(&self) -> usize {
        self.index.reference().len()
    }
}
