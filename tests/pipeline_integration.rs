//! Integration tests for document scoring through the public API.

use std::sync::Arc;

use shield::classifier::{ClassifierConfig, SequenceClassifier, TextClassifier};
use shield::embedding::MockTextEmbedder;
use shield::index::{ReferenceIndex, SimilarityIndex};
use shield::language::{Detection, LanguageBucket, LanguageIdentifier, LanguageDetector};
use shield::pipeline::{ScoringPipeline, UnitOutcome};
use shield::scoring::{ScoreCombiner, VerdictLabel};
use shield::{MockTextClassifier, segment};

const REFERENCES: [&str; 3] = [
    "Water boils at one hundred degrees Celsius.",
    "Ang tubig ay kumukulo sa isang daang digri.",
    "Water boils at one hundred degrees Celsius!",
];

/// Detector that tags everything containing "ang" as Tagalog.
struct KeywordDetector;

impl LanguageDetector for KeywordDetector {
    fn detect(&self, text: &str) -> Detection {
        if text.to_lowercase().split_whitespace().any(|w| w == "ang") {
            Detection::Language("tl".to_string())
        } else if text.contains('?') {
            Detection::Undetermined
        } else {
            Detection::Language("en".to_string())
        }
    }

    fn name(&self) -> &'static str {
        "keyword"
    }
}

fn reference(vectors: Vec<Vec<f32>>) -> Arc<ReferenceIndex> {
    Arc::new(
        ReferenceIndex::from_embeddings(
            REFERENCES.iter().map(|s| s.to_string()).collect(),
            vectors,
            3,
        )
        .unwrap(),
    )
}

fn pipeline<C: TextClassifier>(
    classifier: C,
    embedder: MockTextEmbedder,
) -> ScoringPipeline<C, MockTextEmbedder> {
    let index = SimilarityIndex::new(
        embedder,
        reference(vec![
            vec![1.0, 0.0, 0.0],
            vec![0.0, 1.0, 0.0],
            vec![1.0, 0.0, 0.0],
        ]),
        64,
    )
    .unwrap();

    ScoringPipeline::new(
        LanguageIdentifier::new(Box::new(KeywordDetector)),
        classifier,
        index,
        ScoreCombiner::default(),
    )
}

#[test]
fn test_every_non_blank_unit_has_an_outcome() {
    let document = "First sentence here. Second one follows! Is this the third? \
                    Yes. Trailing fragment without punctuation";
    let p = pipeline(MockTextClassifier::new(0.2), MockTextEmbedder::new(3));

    let outcomes = p.score_document(document).unwrap();
    let units: Vec<String> = segment(document)
        .into_iter()
        .filter(|u| !u.is_blank())
        .map(|u| u.into_text())
        .collect();

    assert_eq!(outcomes.len(), units.len());
    for (outcome, unit) in outcomes.iter().zip(&units) {
        assert_eq!(outcome.text(), unit);
    }
}

#[test]
fn test_tied_references_resolve_to_first() {
    // References 0 and 2 share a vector; the earlier one must win.
    let text = "Water boils at a hundred degrees.";
    let p = pipeline(
        MockTextClassifier::new(0.9),
        MockTextEmbedder::new(3).with_vector(text, vec![1.0, 0.0, 0.0]),
    );

    let verdict = p.score_unit(text).unwrap();
    assert_eq!(verdict.closest_text, REFERENCES[0]);
    assert_eq!(verdict.label, VerdictLabel::Plagiarized);
}

#[test]
fn test_cross_language_match_is_penalized() {
    let text = "Water is boiling in the kettle now.";
    let p = pipeline(
        MockTextClassifier::new(0.6),
        MockTextEmbedder::new(3).with_vector(text, vec![0.0, 1.0, 0.0]),
    );

    assert_eq!(
        p.identifier().identify(text),
        LanguageBucket::English
    );
    assert_eq!(
        p.identifier().identify(REFERENCES[1]),
        LanguageBucket::Other
    );

    let verdict = p.score_unit(text).unwrap();
    assert_eq!(verdict.closest_text, REFERENCES[1]);
    assert_eq!(verdict.semantic_similarity, 0.85);
    // 0.4 * 0.6 + 0.6 * 0.85 = 0.75
    assert_eq!(verdict.combined_score, 0.75);
    assert_eq!(verdict.label, VerdictLabel::Plagiarized);
}

#[test]
fn test_undetermined_detection_falls_back_to_heuristic() {
    let identifier = LanguageIdentifier::new(Box::new(KeywordDetector));
    assert_eq!(
        identifier.identify("Is this plain English text?"),
        LanguageBucket::English
    );
    assert_eq!(
        identifier.identify("Ñoño ñaña ñeñe ñiñi?"),
        LanguageBucket::Other
    );
}

#[test]
fn test_embedder_failure_is_isolated() {
    let broken = "This unit cannot be embedded.";
    let p = pipeline(
        MockTextClassifier::new(0.3),
        MockTextEmbedder::new(3).failing_on(broken),
    );

    let document = format!("A perfectly fine sentence. {broken} Another fine sentence.");
    let outcomes = p.score_document(&document).unwrap();

    assert_eq!(outcomes.len(), 3);
    assert!(matches!(outcomes[1], UnitOutcome::Failed(_)));
    assert!(outcomes[0].verdict().is_some());
    assert!(outcomes[2].verdict().is_some());

    let json = serde_json::to_value(&outcomes).unwrap();
    assert_eq!(json[1]["label"], "Error");
    assert_eq!(json[1]["text"], broken);
}

#[test]
fn test_stub_classifier_is_deterministic_and_bounded() {
    let classifier = SequenceClassifier::load(&ClassifierConfig::stub()).unwrap();
    assert!(classifier.is_stub());

    let text = "Ang tubig ay kumukulo sa isang daang digri.";
    let first = classifier.classify(text).unwrap();
    let second = classifier.classify(text).unwrap();
    assert_eq!(first, second);
    assert!((0.0..=1.0).contains(&first));
}

#[test]
fn test_pipeline_with_stub_classifier() {
    let classifier = SequenceClassifier::load(&ClassifierConfig::stub()).unwrap();
    let p = pipeline(classifier, MockTextEmbedder::new(3));

    let outcomes = p
        .score_document("One sentence to score. And a second one to score.")
        .unwrap();
    assert_eq!(outcomes.len(), 2);
    for outcome in outcomes {
        let verdict = outcome.verdict().expect("stub models never fail");
        assert!((0.0..=100.0).contains(&verdict.confidence));
        assert!((0.0..=1.0).contains(&verdict.lstm_prob));
    }
}
