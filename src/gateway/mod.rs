//! HTTP gateway (Axum) for plagiarism checks.
//!
//! This module is primarily used by the `plagiarishield` server binary.

#![allow(missing_docs)]

pub mod error;
pub mod handler;
pub mod state;

#[cfg(test)]
mod handler_tests;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, StatusCode, header::HeaderValue},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub use error::{ErrorResponse, GatewayError};
pub use handler::{CheckRequest, MessageResponse, check_handler};
pub use state::{HandlerState, ModelMode};

use crate::classifier::TextClassifier;
use crate::embedding::TextEmbedder;

pub const SHIELD_STATUS_HEADER: &str = "X-Shield-Status";
pub const SHIELD_STATUS_HEALTHY: &str = "healthy";
pub const SHIELD_STATUS_READY: &str = "ready";
pub const SHIELD_STATUS_NOT_READY: &str = "not_ready";
pub const SHIELD_STATUS_SCORED: &str = "scored";

pub fn create_router_with_state<C, E>(state: HandlerState<C, E>) -> Router
where
    C: TextClassifier + 'static,
    E: TextEmbedder + 'static,
{
    Router::new()
        .route(
            "/",
            get(handler::root_get_handler).post(handler::root_post_handler),
        )
        .route("/check", post(check_handler::<C, E>))
        .route("/healthz", get(health_handler))
        .route("/ready", get(ready_handler::<C, E>))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ReadyResponse {
    pub status: String,
    pub components: ComponentStatus,
}

#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ComponentStatus {
    pub http: String,
    pub classifier_mode: String,
    pub embedder_mode: String,
    pub references: usize,
    pub language_detector: String,
}

#[tracing::instrument]
pub async fn health_handler() -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        SHIELD_STATUS_HEADER,
        HeaderValue::from_static(SHIELD_STATUS_HEALTHY),
    );

    (
        StatusCode::OK,
        headers,
        Json(HealthResponse {
            status: "ok".to_string(),
        }),
    )
        .into_response()
}

#[tracing::instrument(skip(state))]
pub async fn ready_handler<C, E>(State(state): State<HandlerState<C, E>>) -> Response
where
    C: TextClassifier + 'static,
    E: TextEmbedder + 'static,
{
    let references = state.pipeline.reference_count();

    let components = ComponentStatus {
        http: SHIELD_STATUS_READY.to_string(),
        classifier_mode: state.classifier_mode.as_str().to_string(),
        embedder_mode: state.embedder_mode.as_str().to_string(),
        references,
        language_detector: state.pipeline.identifier().detector_name().to_string(),
    };

    let is_ready = references > 0;
    let (status_code, status_msg, header) = if is_ready {
        (StatusCode::OK, "ok", SHIELD_STATUS_READY)
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            "pending",
            SHIELD_STATUS_NOT_READY,
        )
    };

    let mut headers = HeaderMap::new();
    headers.insert(SHIELD_STATUS_HEADER, HeaderValue::from_static(header));

    (
        status_code,
        headers,
        Json(ReadyResponse {
            status: status_msg.to_string(),
            components,
        }),
    )
        .into_response()
}
