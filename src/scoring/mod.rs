//! Score combination and graded verdicts.
//!
//! [`ScoreCombiner::combine`] merges the sequence probability and the
//! semantic similarity into a [`ScoreBundle`]; [`ScoreCombiner::verdict`]
//! grades it as `Original`, `Suspicious` or `Plagiarized`.

pub mod combiner;
pub mod error;
pub mod types;


pub use combiner::{CombinerConfig, ScoreCombiner, round_to};
pub use error::ScoringError;
pub use types::{ScoreBundle, Verdict, VerdictLabel};
