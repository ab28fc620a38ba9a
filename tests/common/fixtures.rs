use std::path::{Path, PathBuf};

pub const ENGLISH_REFERENCE: &str = "The quick brown fox jumps over the lazy dog.";
pub const TAGALOG_REFERENCE: &str = "Ang mabilis na kayumangging soro ay tumalon sa tamad na aso.";
pub const SCIENCE_REFERENCE: &str = "Photosynthesis converts light energy into chemical energy.";

pub fn reference_texts() -> Vec<&'static str> {
    vec![ENGLISH_REFERENCE, TAGALOG_REFERENCE, SCIENCE_REFERENCE]
}

/// Writes `texts` as a `[{text, label}]` dataset and returns its path.
pub fn write_corpus(dir: &Path, texts: &[&str]) -> PathBuf {
    let records: Vec<serde_json::Value> = texts
        .iter()
        .enumerate()
        .map(|(i, text)| serde_json::json!({ "text": text, "label": i % 2 }))
        .collect();

    let path = dir.join("dataset.json");
    std::fs::write(&path, serde_json::to_vec_pretty(&records).unwrap()).unwrap();
    path
}
