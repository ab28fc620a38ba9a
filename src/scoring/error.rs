use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScoringError {
    #[error("invalid combiner configuration: {reason}")]
    InvalidConfig { reason: String },
}
