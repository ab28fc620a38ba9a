use std::path::Path;
use tokenizers::{Tokenizer, TruncationParams};

use super::error::EmbeddingError;

/// Loads `tokenizer.json` from `model_dir`, truncating encodings to `max_seq_len`.
///
/// Padding is cleared; sentences are encoded one at a time.
pub fn load_sentence_tokenizer(
    model_dir: &Path,
    max_seq_len: usize,
) -> Result<Tokenizer, EmbeddingError> {
    let path = model_dir.join("tokenizer.json");
    let mut tokenizer =
        Tokenizer::from_file(&path).map_err(|e| EmbeddingError::TokenizationFailed {
            reason: format!("failed to load {}: {}", path.display(), e),
        })?;

    tokenizer
        .with_truncation(Some(TruncationParams {
            max_length: max_seq_len,
            ..Default::default()
        }))
        .map_err(|e| EmbeddingError::TokenizationFailed {
            reason: format!("failed to configure truncation: {}", e),
        })?;
    tokenizer.with_padding(None);

    Ok(tokenizer)
}
