//! Coarse language bucketing (English vs. everything else).
//!
//! The bucket only selects thresholds and the mismatch penalty in
//! [`crate::scoring`]. Every non-English language lands in [`LanguageBucket::Other`],
//! which carries the Tagalog-tuned threshold.

pub mod detector;


#[cfg(any(test, feature = "mock"))]
pub use detector::FixedDetector;
#[cfg(feature = "langdetect")]
pub use detector::WhatlangDetector;
pub use detector::{Detection, LanguageDetector, normalize_code};

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::constants::{MIN_SCORABLE_CHARS, NON_ASCII_RATIO_THRESHOLD};

/// Language bucket of a text fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LanguageBucket {
    /// English (`"en"`).
    #[serde(rename = "en")]
    English,
    /// Catch-all for any non-English input (`"tl"`).
    #[serde(rename = "tl")]
    Other,
}

impl LanguageBucket {
    /// Wire code of the bucket.
    pub fn code(&self) -> &'static str {
        match self {
            LanguageBucket::English => "en",
            LanguageBucket::Other => "tl",
        }
    }

    /// Maps a detector code onto a bucket.
    pub fn from_code(code: &str) -> Self {
        let code = code.trim().to_lowercase();
        if code == "tl" || code == "fil" {
            LanguageBucket::Other
        } else if code.starts_with("en") {
            LanguageBucket::English
        } else {
            LanguageBucket::Other
        }
    }
}

impl std::fmt::Display for LanguageBucket {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

/// Buckets text using an optional detector and a script heuristic.
pub struct LanguageIdentifier {
    detector: Option<Box<dyn LanguageDetector>>,
}

impl std::fmt::Debug for LanguageIdentifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LanguageIdentifier")
            .field("detector", &self.detector_name())
            .finish()
    }
}

impl Default for LanguageIdentifier {
    fn default() -> Self {
        Self::heuristic_only()
    }
}

impl LanguageIdentifier {
    /// Identifier that uses `detector` first.
    pub fn new(detector: Box<dyn LanguageDetector>) -> Self {
        Self {
            detector: Some(detector),
        }
    }

    /// Identifier that only uses the script heuristic.
    pub fn heuristic_only() -> Self {
        Self { detector: None }
    }

    /// Identifier with the compiled-in detector when `enabled`, heuristic otherwise.
    pub fn with_default_detector(enabled: bool) -> Self {
        #[cfg(feature = "langdetect")]
        {
            if enabled {
                return Self::new(Box::new(WhatlangDetector::new()));
            }
        }
        #[cfg(not(feature = "langdetect"))]
        {
            if enabled {
                tracing::warn!("Language detection requested but the `langdetect` feature is off");
            }
        }
        Self::heuristic_only()
    }

    /// Name of the configured detector (`"heuristic"` when none).
    pub fn detector_name(&self) -> &'static str {
        self.detector
            .as_ref()
            .map(|d| d.name())
            .unwrap_or("heuristic")
    }

    /// Returns the bucket of `text`.
    pub fn identify(&self, text: &str) -> LanguageBucket {
        if text.trim().chars().count() < MIN_SCORABLE_CHARS {
            return LanguageBucket::English;
        }

        if let Some(detector) = &self.detector {
            match detector.detect(text) {
                Detection::Language(code) => {
                    let bucket = LanguageBucket::from_code(&code);
                    trace!(code = %code, bucket = %bucket, "Detector classified text");
                    return bucket;
                }
                Detection::Undetermined => {
                    trace!(detector = detector.name(), "Detector undetermined, using heuristic");
                }
            }
        }

        heuristic_bucket(text)
    }
}

/// Script heuristic: share of non-ASCII characters among alphanumerics.
pub fn heuristic_bucket(text: &str) -> LanguageBucket {
    let mut alnum = 0usize;
    let mut non_ascii = 0usize;
    for c in text.chars().filter(|c| c.is_alphanumeric()) {
        alnum += 1;
        if c as u32 > 128 {
            non_ascii += 1;
        }
    }

    if alnum < MIN_SCORABLE_CHARS {
        return LanguageBucket::English;
    }

    let ratio = non_ascii as f64 / alnum as f64;
    if ratio > NON_ASCII_RATIO_THRESHOLD {
        LanguageBucket::Other
    } else {
        LanguageBucket::English
    }
}
