//! Router-level tests for the gateway, driven through `oneshot`.

use axum::{Router, body::Body, http::Request, http::StatusCode, response::IntoResponse};
use http_body_util::BodyExt;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use crate::classifier::{ClassifierError, MockTextClassifier, TextClassifier};
use crate::embedding::{EmbeddingError, MockTextEmbedder, TextEmbedder};
use crate::gateway::error::{ErrorResponse, GatewayError};
use crate::gateway::handler::{ROOT_GET_MESSAGE, ROOT_POST_MESSAGE};
use crate::gateway::state::{HandlerState, ModelMode};
use crate::gateway::{
    HealthResponse, MessageResponse, ReadyResponse, SHIELD_STATUS_HEADER, create_router_with_state,
};
use crate::index::{ReferenceIndex, SimilarityIndex};
use crate::language::LanguageIdentifier;
use crate::pipeline::{PipelineError, ScoringPipeline};
use crate::scoring::ScoreCombiner;

const REF_COPY: &str = "The mitochondria is the powerhouse of the cell.";
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

fn state_with<C, E>(classifier: C, embedder: E, timeout: Duration) -> HandlerState<C, E>
where
    C: TextClassifier + 'static,
    E: TextEmbedder + 'static,
{
    let index = SimilarityIndex::new(embedder, reference(), 16).unwrap();
    let pipeline = ScoringPipeline::new(
        LanguageIdentifier::heuristic_only(),
        classifier,
        index,
        ScoreCombiner::default(),
    );
    HandlerState::new(Arc::new(pipeline), timeout, 200)
}

fn mock_router() -> Router {
    let classifier = MockTextClassifier::new(0.1).with_probability(REF_COPY, 0.9);
    let embedder = MockTextEmbedder::new(3).with_default(vec![0.0, 0.0, 1.0]).with_vector(
        REF_COPY,
        vec![1.0, 0.0, 0.0],
    );
    create_router_with_state(state_with(classifier, embedder, Duration::from_secs(5)))
}

fn check_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/check")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

fn shield_status(response: &axum::response::Response) -> &str {
    response
        .headers()
        .get(SHIELD_STATUS_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Classifier that blocks longer than any test timeout.
struct SlowClassifier(Duration);

impl TextClassifier for SlowClassifier {
    fn classify(&self, _text: &str) -> Result<f32, ClassifierError> {
        std::thread::sleep(self.0);
        Ok(0.5)
    }
}

/// Slow classifier that records when it finishes.
struct FlaggingClassifier {
    delay: Duration,
    finished: Arc<std::sync::atomic::AtomicBool>,
}

impl TextClassifier for FlaggingClassifier {
    fn classify(&self, _text: &str) -> Result<f32, ClassifierError> {
        std::thread::sleep(self.delay);
        self.finished.store(true, std::sync::atomic::Ordering::SeqCst);
        Ok(0.5)
    }
}

/// Embedder whose vectors disagree with its advertised dimension.
struct TruncatingEmbedder;

impl TextEmbedder for TruncatingEmbedder {
    fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(vec![1.0, 0.0])
    }

    fn embedding_dim(&self) -> usize {
        3
    }
}

mod check_tests {
    use super::*;

    #[tokio::test]
    async fn test_check_returns_ordered_outcomes() {
        let body = serde_json::json!({
            "text": format!("{REF_COPY} My dog likes long walks. Ok.")
        })
        .to_string();

        let response = mock_router().oneshot(check_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(shield_status(&response), "scored");

        let outcomes: Vec<serde_json::Value> = body_json(response).await;
        assert_eq!(outcomes.len(), 3);
        assert_eq!(outcomes[0]["text"], REF_COPY);
        assert_eq!(outcomes[0]["label"], "Plagiarized");
        assert_eq!(outcomes[0]["closest_text"], REF_COPY);
        assert_eq!(outcomes[1]["text"], "My dog likes long walks.");
        assert_eq!(outcomes[1]["label"], "Original");
        assert_eq!(outcomes[2]["text"], "Ok.");
        assert_eq!(outcomes[2]["confidence"], 0.0);
    }

    #[tokio::test]
    async fn test_check_empty_text_returns_empty_array() {
        let response = mock_router()
            .oneshot(check_request(r#"{"text": ""}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let outcomes: Vec<serde_json::Value> = body_json(response).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test]
    async fn test_check_failing_unit_becomes_marker() {
        let failing = "This sentence breaks the classifier.";
        let classifier = MockTextClassifier::new(0.2).failing_on(failing);
        let embedder = MockTextEmbedder::new(3);
        let router =
            create_router_with_state(state_with(classifier, embedder, Duration::from_secs(5)));

        let body = serde_json::json!({ "text": format!("{failing} {REF_COPY}") }).to_string();
        let response = router.oneshot(check_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let outcomes: Vec<serde_json::Value> = body_json(response).await;
        assert_eq!(outcomes.len(), 2);
        assert_eq!(outcomes[0]["label"], "Error");
        assert_eq!(outcomes[0]["text"], failing);
        assert!(
            outcomes[0]["error"]
                .as_str()
                .unwrap()
                .contains("mock classifier")
        );
        assert_ne!(outcomes[1]["label"], "Error");
    }

    #[tokio::test]
    async fn test_check_rejects_missing_text_field() {
        let response = mock_router()
            .oneshot(check_request(r#"{"content": "hello"}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(shield_status(&response), "invalid_request");

        let error: ErrorResponse = body_json(response).await;
        assert_eq!(error.code, 400);
        assert!(error.error.starts_with("invalid request"));
    }

    #[tokio::test]
    async fn test_check_rejects_malformed_json() {
        let response = mock_router()
            .oneshot(check_request("{not json"))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_check_rejects_missing_content_type() {
        let request = Request::builder()
            .method("POST")
            .uri("/check")
            .body(Body::from(r#"{"text": "hello"}"#))
            .unwrap();
        let response = mock_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_check_rejects_oversized_document() {
        let body = serde_json::json!({ "text": "a".repeat(201) }).to_string();
        let response = mock_router().oneshot(check_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let error: ErrorResponse = body_json(response).await;
        assert!(error.error.contains("limit is 200"));
    }

    #[tokio::test]
    async fn test_check_counts_characters_not_bytes() {
        // 200 two-byte characters stay within a 200-character limit.
        let body = serde_json::json!({ "text": "ñ".repeat(200) }).to_string();
        let response = mock_router().oneshot(check_request(&body)).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_check_times_out() {
        let router = create_router_with_state(state_with(
            SlowClassifier(Duration::from_millis(500)),
            MockTextEmbedder::new(3),
            Duration::from_millis(20),
        ));

        let response = router
            .oneshot(check_request(
                r#"{"text": "A sentence long enough to be scored."}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert_eq!(shield_status(&response), "timeout");
    }

    #[tokio::test]
    async fn test_timed_out_scoring_still_runs_to_completion() {
        let finished = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let router = create_router_with_state(state_with(
            FlaggingClassifier {
                delay: Duration::from_millis(150),
                finished: Arc::clone(&finished),
            },
            MockTextEmbedder::new(3),
            Duration::from_millis(20),
        ));

        let response = router
            .oneshot(check_request(r#"{"text": "Scoring outlives the request."}"#))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::GATEWAY_TIMEOUT);
        assert!(!finished.load(std::sync::atomic::Ordering::SeqCst));

        let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
        while !finished.load(std::sync::atomic::Ordering::SeqCst) {
            assert!(tokio::time::Instant::now() < deadline, "scoring task never finished");
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[tokio::test]
    async fn test_check_configuration_fault_is_unavailable() {
        let router = create_router_with_state(state_with(
            MockTextClassifier::new(0.1),
            TruncatingEmbedder,
            Duration::from_secs(5),
        ));

        let response = router
            .oneshot(check_request(
                r#"{"text": "A sentence long enough to be scored."}"#,
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(shield_status(&response), "unavailable");

        let error: ErrorResponse = body_json(response).await;
        assert_eq!(error.code, 503);
    }
}

mod probe_tests {
    use super::*;

    #[tokio::test]
    async fn test_healthz() {
        let request = Request::builder()
            .uri("/healthz")
            .body(Body::empty())
            .unwrap();
        let response = mock_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(shield_status(&response), "healthy");

        let health: HealthResponse = body_json(response).await;
        assert_eq!(health.status, "ok");
    }

    #[tokio::test]
    async fn test_ready_reports_components() {
        let classifier = MockTextClassifier::new(0.1);
        let embedder = MockTextEmbedder::new(3);
        let state = state_with(classifier, embedder, Duration::from_secs(5))
            .with_modes(ModelMode::Model, ModelMode::Stub);
        let router = create_router_with_state(state);

        let request = Request::builder().uri("/ready").body(Body::empty()).unwrap();
        let response = router.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(shield_status(&response), "ready");

        let ready: ReadyResponse = body_json(response).await;
        assert_eq!(ready.status, "ok");
        assert_eq!(ready.components.classifier_mode, "model");
        assert_eq!(ready.components.embedder_mode, "stub");
        assert_eq!(ready.components.references, 2);
        assert_eq!(ready.components.language_detector, "heuristic");
    }

    #[tokio::test]
    async fn test_root_get_banner() {
        let request = Request::builder().uri("/").body(Body::empty()).unwrap();
        let response = mock_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let message: MessageResponse = body_json(response).await;
        assert_eq!(message.message, ROOT_GET_MESSAGE);
    }

    #[tokio::test]
    async fn test_root_post_banner() {
        let request = Request::builder()
            .method("POST")
            .uri("/")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"text": "anything"}"#))
            .unwrap();
        let response = mock_router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let message: MessageResponse = body_json(response).await;
        assert_eq!(message.message, ROOT_POST_MESSAGE);
    }

    #[tokio::test]
    async fn test_cors_preflight_allowed() {
        let request = Request::builder()
            .method("OPTIONS")
            .uri("/check")
            .header("origin", "https://example.org")
            .header("access-control-request-method", "POST")
            .body(Body::empty())
            .unwrap();
        let response = mock_router().oneshot(request).await.unwrap();
        assert!(response.status().is_success());
        assert!(
            response
                .headers()
                .contains_key("access-control-allow-origin")
        );
    }
}

mod error_tests {
    use super::*;

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (
                GatewayError::InvalidRequest("bad".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                GatewayError::Unavailable("empty".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (GatewayError::Timeout(30), StatusCode::GATEWAY_TIMEOUT),
            (
                GatewayError::InternalError("oops".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }

    #[test]
    fn test_pipeline_error_mapping() {
        let config = GatewayError::from(PipelineError::Configuration("empty corpus".into()));
        assert!(matches!(config, GatewayError::Unavailable(_)));

        let classifier = GatewayError::from(PipelineError::Classifier(
            ClassifierError::InferenceFailed {
                reason: "nan".into(),
            },
        ));
        assert!(matches!(classifier, GatewayError::InternalError(_)));
    }
}
