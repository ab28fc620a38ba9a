use super::*;
use std::sync::Arc;

use crate::classifier::MockTextClassifier;
use crate::embedding::MockTextEmbedder;
use crate::index::ReferenceIndex;
use crate::scoring::VerdictLabel;

const COPIED: &str = "The mitochondria is the powerhouse of the cell.";
const FRESH: &str = "My grandmother grows tomatoes on the balcony.";
const REF_COPY: &str = "The mitochondria is the powerhouse of the cell";
const REF_OTHER: &str = "Ang mga bituin ay nagniningning sa langit.";

fn reference() -> Arc<ReferenceIndex> {
    Arc::new(
        ReferenceIndex::from_embeddings(
            vec![REF_COPY.to_string(), REF_OTHER.to_string()],
            vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]],
            3,
        )
        .unwrap(),
    )
}

fn pipeline(
    classifier: MockTextClassifier,
    embedder: MockTextEmbedder,
) -> ScoringPipeline<MockTextClassifier, MockTextEmbedder> {
    let index = SimilarityIndex::new(embedder, reference(), 0).unwrap();
    ScoringPipeline::new(
        LanguageIdentifier::heuristic_only(),
        classifier,
        index,
        ScoreCombiner::default(),
    )
}

fn default_embedder() -> MockTextEmbedder {
    MockTextEmbedder::new(3)
        .with_vector(COPIED, vec![1.0, 0.0, 0.0])
        // cos = 0 against both references -> similarity 0.5
        .with_default(vec![0.0, 0.0, 1.0])
}

mod unit_tests {
    use super::*;

    #[test]
    fn test_copied_unit_is_plagiarized() {
        let p = pipeline(
            MockTextClassifier::new(0.1).with_probability(COPIED, 0.9),
            default_embedder(),
        );

        let verdict = p.score_unit(COPIED).unwrap();
        assert_eq!(verdict.label, VerdictLabel::Plagiarized);
        assert_eq!(verdict.closest_text, REF_COPY);
        assert_eq!(verdict.semantic_similarity, 1.0);
        assert_eq!(verdict.lstm_prob, 0.9);
        assert_eq!(verdict.text, COPIED);
    }

    #[test]
    fn test_fresh_unit_is_original() {
        let p = pipeline(MockTextClassifier::new(0.1), default_embedder());

        let verdict = p.score_unit(FRESH).unwrap();
        // 0.4 * 0.1 + 0.6 * 0.5 = 0.34
        assert_eq!(verdict.label, VerdictLabel::Original);
        assert_eq!(verdict.combined_score, 0.34);
        assert_eq!(verdict.closest_text, REF_COPY);
    }

    #[test]
    fn test_short_unit_is_zero_evidence_without_collaborators() {
        // Both collaborators would fail if called.
        let p = pipeline(
            MockTextClassifier::new(0.9).failing_on("Hi there."),
            MockTextEmbedder::new(3).failing_on("Hi there."),
        );

        let verdict = p.score_unit("Hi there.").unwrap();
        assert_eq!(verdict, Verdict::zero_evidence("Hi there."));
    }

    #[test]
    fn test_ten_characters_is_scored() {
        let p = pipeline(MockTextClassifier::new(0.2), default_embedder());
        let verdict = p.score_unit("abcdefghij").unwrap();
        assert!(!verdict.closest_text.is_empty());
    }

    #[test]
    fn test_language_mismatch_penalizes_semantic() {
        let tagalog = "Ñaño ñiño ñuño ñeño ñaño.";
        let p = pipeline(
            MockTextClassifier::new(0.5),
            MockTextEmbedder::new(3).with_vector(tagalog, vec![1.0, 0.0, 0.0]),
        );

        // Unit is Other by heuristic, matched English reference.
        let verdict = p.score_unit(tagalog).unwrap();
        assert_eq!(verdict.closest_text, REF_COPY);
        assert_eq!(verdict.semantic_similarity, 0.85);
    }

    #[test]
    fn test_classifier_failure_is_recoverable() {
        let p = pipeline(
            MockTextClassifier::new(0.1).failing_on(FRESH),
            default_embedder(),
        );

        let err = p.score_unit(FRESH).unwrap_err();
        assert!(matches!(err, PipelineError::Classifier(_)));
        assert!(err.is_unit_recoverable());
    }
}

mod document_tests {
    use super::*;

    #[test]
    fn test_document_outcomes_follow_segmentation_order() {
        let p = pipeline(
            MockTextClassifier::new(0.1).with_probability(COPIED, 0.9),
            default_embedder(),
        );

        let document = format!("{FRESH} {COPIED} Ok. Is this still working today");
        let outcomes = p.score_document(&document).unwrap();

        let texts: Vec<&str> = outcomes.iter().map(UnitOutcome::text).collect();
        assert_eq!(
            texts,
            vec![FRESH, COPIED, "Ok.", "Is this still working today"]
        );
        assert_eq!(
            outcomes[1].verdict().map(|v| v.label),
            Some(VerdictLabel::Plagiarized)
        );
        assert_eq!(
            outcomes[2].verdict(),
            Some(&Verdict::zero_evidence("Ok."))
        );
    }

    #[test]
    fn test_empty_document_yields_no_outcomes() {
        let p = pipeline(MockTextClassifier::new(0.1), default_embedder());
        assert!(p.score_document("").unwrap().is_empty());
        assert!(p.score_document("  ... !? ").unwrap().is_empty());
    }

    #[test]
    fn test_failing_unit_becomes_marker_others_scored() {
        let p = pipeline(
            MockTextClassifier::new(0.1),
            default_embedder().failing_on(COPIED),
        );

        let document = format!("{FRESH} {COPIED} {FRESH}");
        let outcomes = p.score_document(&document).unwrap();

        assert_eq!(outcomes.len(), 3);
        assert!(!outcomes[0].is_failed());
        assert!(outcomes[1].is_failed());
        assert!(!outcomes[2].is_failed());

        match &outcomes[1] {
            UnitOutcome::Failed(failure) => {
                assert_eq!(failure.text, COPIED);
                assert!(failure.error.contains("mock embedder"));
            }
            other => panic!("expected failure marker, got {other:?}"),
        }
    }

    #[test]
    fn test_failure_marker_wire_shape() {
        let outcome = UnitOutcome::Failed(UnitFailure::new("Some text.", "boom"));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"label": "Error", "text": "Some text.", "error": "boom"})
        );
    }

    #[test]
    fn test_scored_outcome_serializes_flat() {
        let outcome = UnitOutcome::Scored(Verdict::zero_evidence("Hi."));
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["label"], "Original");
        assert_eq!(json["confidence"], 0.0);
        assert_eq!(json["closest_text"], "");
    }

    #[test]
    fn test_reference_count() {
        let p = pipeline(MockTextClassifier::new(0.1), default_embedder());
        assert_eq!(p.reference_count(), 2);
    }
}
