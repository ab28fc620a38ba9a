//! Probabilistic language detectors.

/// Outcome of a detector call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Detection {
    /// The detector settled on a language code (lowercase, ISO 639-1 where one exists).
    Language(String),
    /// The detector could not decide; callers fall back to a heuristic.
    Undetermined,
}

impl Detection {
    /// Returns the detected code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Detection::Language(code) => Some(code.as_str()),
            Detection::Undetermined => None,
        }
    }
}

/// Pluggable language detector.
///
/// Implementations must not panic on arbitrary input; report
/// [`Detection::Undetermined`] instead.
pub trait LanguageDetector: Send + Sync {
    /// Short engine name for logs and readiness output.
    fn name(&self) -> &'static str;

    /// Detects the language of `text`.
    fn detect(&self, text: &str) -> Detection;
}

/// Detector backed by `whatlang` trigram profiles.
#[cfg(feature = "langdetect")]
#[derive(Debug, Default, Clone, Copy)]
pub struct WhatlangDetector;

#[cfg(feature = "langdetect")]
impl WhatlangDetector {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(feature = "langdetect")]
impl LanguageDetector for WhatlangDetector {
    fn name(&self) -> &'static str {
        "whatlang"
    }

    fn detect(&self, text: &str) -> Detection {
        match whatlang::detect(text) {
            // Short sentences are rarely marked reliable, so the best guess is kept.
            Some(info) => {
                tracing::trace!(
                    lang = info.lang().code(),
                    confidence = info.confidence(),
                    reliable = info.is_reliable(),
                    "Language guess"
                );
                Detection::Language(normalize_code(info.lang().code()))
            }
            None => Detection::Undetermined,
        }
    }
}

/// Maps ISO 639-3 codes onto the short codes the bucket rules expect.
pub fn normalize_code(code: &str) -> String {
    match code {
        "eng" => "en".to_string(),
        "tgl" => "tl".to_string(),
        other => other.to_lowercase(),
    }
}

/// Detector that always returns the same answer.
#[cfg(any(test, feature = "mock"))]
#[derive(Debug, Clone)]
pub struct FixedDetector {
    detection: Detection,
}

#[cfg(any(test, feature = "mock"))]
impl FixedDetector {
    pub fn language(code: &str) -> Self {
        Self {
            detection: Detection::Language(code.to_string()),
        }
    }

    pub fn undetermined() -> Self {
        Self {
            detection: Detection::Undetermined,
        }
    }
}

#[cfg(any(test, feature = "mock"))]
impl LanguageDetector for FixedDetector {
    fn name(&self) -> &'static str {
        "fixed"
    }

    fn detect(&self, _text: &str) -> Detection {
        self.detection.clone()
    }
}
