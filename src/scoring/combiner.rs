use tracing::debug;

use crate::constants::{
    ENGLISH_THRESHOLD, LANGUAGE_MISMATCH_PENALTY, OTHER_THRESHOLD, SEMANTIC_AGREEMENT_MIN,
    SEMANTIC_WEIGHT, SEQUENCE_AGREEMENT_MIN, SEQUENCE_WEIGHT, SUSPICIOUS_BAND,
};
use crate::language::LanguageBucket;

use super::error::ScoringError;
use super::types::{ScoreBundle, Verdict, VerdictLabel};

const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// Weights, penalty and thresholds of the verdict engine.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CombinerConfig {
    pub sequence_weight: f64,
    pub semantic_weight: f64,
    /// Semantic multiplier when unit and match languages differ.
    pub mismatch_penalty: f64,
    pub english_threshold: f64,
    pub other_threshold: f64,
    /// Width of the `Suspicious` band below the threshold.
    pub suspicious_band: f64,
    /// Above-threshold units need at least this sequence probability to be `Plagiarized`.
    pub sequence_agreement_min: f64,
    /// Above-threshold units need at least this semantic score to be `Plagiarized`.
    pub semantic_agreement_min: f64,
}

impl Default for CombinerConfig {
    fn default() -> Self {
        Self {
            sequence_weight: SEQUENCE_WEIGHT,
            semantic_weight: SEMANTIC_WEIGHT,
            mismatch_penalty: LANGUAGE_MISMATCH_PENALTY,
            english_threshold: ENGLISH_THRESHOLD,
            other_threshold: OTHER_THRESHOLD,
            suspicious_band: SUSPICIOUS_BAND,
            sequence_agreement_min: SEQUENCE_AGREEMENT_MIN,
            semantic_agreement_min: SEMANTIC_AGREEMENT_MIN,
        }
    }
}

impl CombinerConfig {
    pub fn validate(&self) -> Result<(), ScoringError> {
        for (name, value) in [
            ("sequence_weight", self.sequence_weight),
            ("semantic_weight", self.semantic_weight),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(ScoringError::InvalidConfig {
                    reason: format!("{name} must be a non-negative number, got {value}"),
                });
            }
        }

        let sum = self.sequence_weight + self.semantic_weight;
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(ScoringError::InvalidConfig {
                reason: format!("weights must sum to 1, got {sum}"),
            });
        }

        for (name, value) in [
            ("mismatch_penalty", self.mismatch_penalty),
            ("english_threshold", self.english_threshold),
            ("other_threshold", self.other_threshold),
            ("suspicious_band", self.suspicious_band),
            ("sequence_agreement_min", self.sequence_agreement_min),
            ("semantic_agreement_min", self.semantic_agreement_min),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ScoringError::InvalidConfig {
                    reason: format!("{name} must be within [0, 1], got {value}"),
                });
            }
        }

        Ok(())
    }

    /// Threshold applied to a unit in `bucket`.
    pub fn threshold_for(&self, bucket: LanguageBucket) -> f64 {
        match bucket {
            LanguageBucket::English => self.english_threshold,
            LanguageBucket::Other => self.other_threshold,
        }
    }
}

/// Combines the two signals into a [`ScoreBundle`] and grades it.
#[derive(Debug, Clone, Default)]
pub struct ScoreCombiner {
    config: CombinerConfig,
}

impl ScoreCombiner {
    pub fn new(config: CombinerConfig) -> Result<Self, ScoringError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &CombinerConfig {
        &self.config
    }

    /// Weighted combination with the language-mismatch penalty on the semantic term.
    pub fn combine(
        &self,
        sequence_prob: f64,
        semantic: f64,
        unit_language: LanguageBucket,
        match_language: LanguageBucket,
    ) -> ScoreBundle {
        let sequence_prob = sequence_prob.clamp(0.0, 1.0);
        let semantic_raw = semantic.clamp(0.0, 1.0);

        let semantic = if unit_language != match_language {
            semantic_raw * self.config.mismatch_penalty
        } else {
            semantic_raw
        };

        let combined =
            self.config.sequence_weight * sequence_prob + self.config.semantic_weight * semantic;

        ScoreBundle {
            sequence_prob,
            semantic_raw,
            semantic,
            combined,
            unit_language,
            match_language,
            threshold: self.config.threshold_for(unit_language),
        }
    }

    /// Grades `bundle`; the first matching rule wins.
    pub fn label(&self, bundle: &ScoreBundle) -> VerdictLabel {
        let cfg = &self.config;
        if bundle.combined >= bundle.threshold {
            if bundle.sequence_prob < cfg.sequence_agreement_min
                || bundle.semantic < cfg.semantic_agreement_min
            {
                VerdictLabel::Suspicious
            } else {
                VerdictLabel::Plagiarized
            }
        } else if bundle.combined >= bundle.threshold - cfg.suspicious_band {
            VerdictLabel::Suspicious
        } else {
            VerdictLabel::Original
        }
    }

    /// Builds the client-facing record; rounding only affects reported values.
    pub fn verdict(
        &self,
        bundle: &ScoreBundle,
        closest_text: impl Into<String>,
        text: impl Into<String>,
    ) -> Verdict {
        let label = self.label(bundle);

        debug!(
            label = %label,
            combined = bundle.combined,
            threshold = bundle.threshold,
            mismatch = bundle.language_mismatch(),
            "Unit graded"
        );

        Verdict {
            label,
            confidence: round_to(bundle.combined * 100.0, 2),
            lstm_prob: round_to(bundle.sequence_prob, 3),
            semantic_similarity: round_to(bundle.semantic, 3),
            closest_text: closest_text.into(),
            combined_score: round_to(bundle.combined, 3),
            text: text.into(),
        }
    }
}

/// Rounds to `places` decimals, exact ties to even.
pub fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round_ties_even() / factor
}
