//! Sentence segmentation on terminal punctuation.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

static SENTENCE_BOUNDARY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([.!?])\s*").expect("sentence boundary pattern is valid"));

/// A contiguous span of text to be scored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextUnit {
    text: String,
}

impl TextUnit {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// The unit text as produced by the segmenter (or passed by the caller).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// The unit text without surrounding whitespace.
    pub fn trimmed(&self) -> &str {
        self.text.trim()
    }

    /// Returns `true` if the unit is empty after trimming.
    pub fn is_blank(&self) -> bool {
        self.trimmed().is_empty()
    }

    pub fn into_text(self) -> String {
        self.text
    }
}

impl From<&str> for TextUnit {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

/// Splits `document` into ordered sentence units.
///
/// Each piece before a `.`, `!` or `?` is trimmed and keeps its punctuation mark.
/// Pieces that are blank after trimming are dropped together with their mark.
/// A trailing fragment without terminal punctuation becomes its own unit.
pub fn segment(document: &str) -> Vec<TextUnit> {
    let mut units = Vec::new();
    let mut cursor = 0usize;

    for caps in SENTENCE_BOUNDARY.captures_iter(document) {
        let (Some(whole), Some(mark)) = (caps.get(0), caps.get(1)) else {
            continue;
        };

        let body = document[cursor..whole.start()].trim();
        if !body.is_empty() {
            units.push(TextUnit::new(format!("{}{}", body, mark.as_str())));
        }
        cursor = whole.end();
    }

    let tail = document[cursor..].trim();
    if !tail.is_empty() {
        units.push(TextUnit::new(tail));
    }

    units
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(document: &str) -> Vec<String> {
        segment(document).into_iter().map(TextUnit::into_text).collect()
    }

    #[test]
    fn test_three_units_with_trailing_fragment() {
        assert_eq!(
            texts("This is a test. Is it working? Yes it is"),
            vec!["This is a test.", "Is it working?", "Yes it is"]
        );
    }

    #[test]
    fn test_exclamation_and_no_space_after_mark() {
        assert_eq!(
            texts("Stop!Go now.Wait?"),
            vec!["Stop!", "Go now.", "Wait?"]
        );
    }

    #[test]
    fn test_empty_and_whitespace_input() {
        assert!(segment("").is_empty());
        assert!(segment("   \n\t  ").is_empty());
    }

    #[test]
    fn test_punctuation_only_input() {
        assert!(segment("...!?!").is_empty());
        assert!(segment(" . . ! ").is_empty());
    }

    #[test]
    fn test_ellipsis_keeps_single_mark() {
        assert_eq!(texts("Wait... what?"), vec!["Wait.", "what?"]);
    }

    #[test]
    fn test_leading_and_inner_whitespace_trimmed() {
        assert_eq!(
            texts("   Una pangungusap.    Pangalawa!   "),
            vec!["Una pangungusap.", "Pangalawa!"]
        );
    }

    #[test]
    fn test_no_punctuation_single_unit() {
        assert_eq!(texts("  no punctuation here  "), vec!["no punctuation here"]);
    }

    #[test]
    fn test_multibyte_text_boundaries() {
        assert_eq!(
            texts("Mañana ay maganda. Ñandú? Oo"),
            vec!["Mañana ay maganda.", "Ñandú?", "Oo"]
        );
    }

    #[test]
    fn test_units_preserve_order() {
        let units = segment("One. Two. Three. Four.");
        let order: Vec<&str> = units.iter().map(|u| u.text()).collect();
        assert_eq!(order, vec!["One.", "Two.", "Three.", "Four."]);
    }

    #[test]
    fn test_text_unit_accessors() {
        let unit = TextUnit::new("  padded  ");
        assert_eq!(unit.trimmed(), "padded");
        assert!(!unit.is_blank());
        assert!(TextUnit::from("   ").is_blank());
    }
}
