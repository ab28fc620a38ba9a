use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::{HeaderMap, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error, info, instrument};

use super::error::GatewayError;
use super::state::HandlerState;
use super::{SHIELD_STATUS_HEADER, SHIELD_STATUS_SCORED};
use crate::classifier::TextClassifier;
use crate::embedding::TextEmbedder;
use crate::pipeline::UnitOutcome;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckRequest {
    pub text: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

pub const ROOT_GET_MESSAGE: &str = "PlagiariShield Multilingual API is running.";
pub const ROOT_POST_MESSAGE: &str = "PlagiariShield API is running. Use /check for plagiarism.";

pub(crate) fn parse_check_request(
    body: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<CheckRequest, GatewayError> {
    body.map(|Json(request)| request)
        .map_err(|rejection| GatewayError::InvalidRequest(rejection.body_text()))
}

#[instrument(skip(state, body), fields(chars = tracing::field::Empty))]
pub async fn check_handler<C, E>(
    State(state): State<HandlerState<C, E>>,
    body: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Response, GatewayError>
where
    C: TextClassifier + 'static,
    E: TextEmbedder + 'static,
{
    let request = parse_check_request(body)?;

    let chars = request.text.chars().count();
    tracing::Span::current().record("chars", chars);

    if chars > state.max_document_chars {
        return Err(GatewayError::InvalidRequest(format!(
            "document has {} characters, limit is {}",
            chars, state.max_document_chars
        )));
    }

    let pipeline = Arc::clone(&state.pipeline);
    let text = request.text;
    // Blocking tasks cannot be cancelled: on timeout the caller gets 504 and the
    // task still runs to completion on the blocking pool, its result discarded.
    let task = tokio::task::spawn_blocking(move || pipeline.score_document(&text));

    let outcomes = match tokio::time::timeout(state.request_timeout, task).await {
        Err(_) => {
            error!(
                timeout_secs = state.request_timeout.as_secs(),
                "Document scoring timed out"
            );
            return Err(GatewayError::Timeout(state.request_timeout.as_secs()));
        }
        Ok(Err(join_err)) => {
            error!(error = %join_err, "Scoring task failed");
            return Err(GatewayError::InternalError(join_err.to_string()));
        }
        Ok(Ok(result)) => result?,
    };

    info!(units = outcomes.len(), "Check complete");
    Ok(make_response(outcomes))
}

fn make_response(outcomes: Vec<UnitOutcome>) -> Response {
    let mut headers = HeaderMap::new();
    headers.insert(
        SHIELD_STATUS_HEADER,
        HeaderValue::from_static(SHIELD_STATUS_SCORED),
    );

    (StatusCode::OK, headers, Json(outcomes)).into_response()
}

#[instrument]
pub async fn root_get_handler() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: ROOT_GET_MESSAGE.to_string(),
    })
}

#[instrument(skip(body))]
pub async fn root_post_handler(
    body: Result<Json<CheckRequest>, JsonRejection>,
) -> Result<Json<MessageResponse>, GatewayError> {
    let request = parse_check_request(body)?;
    debug!(chars = request.text.chars().count(), "Root POST received");

    Ok(Json(MessageResponse {
        message: ROOT_POST_MESSAGE.to_string(),
    }))
}
