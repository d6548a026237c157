//! REST endpoint for processing text.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;

use super::registry::AgentRegistry;
use super::translate::to_http_response;

#[derive(Debug, Deserialize)]
struct ProcessRequest {
    text: String,
}

/// POST /api/conversation/process
///
/// Always 200 with an intent response once the body is valid. Intent
/// failures and unmatched text come back as speech, not as HTTP errors.
async fn process(State(agents): State<Arc<AgentRegistry>>, body: Bytes) -> Response {
    let request: ProcessRequest = match serde_json::from_slice(&body) {
        Ok(request) => request,
        Err(e) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(serde_json::json!({"message": format!("Message format incorrect: {e}")})),
            )
                .into_response();
        }
    };

    let outcome = match agents.get_or_create().await {
        Ok(agent) => agent.process(&request.text).await,
        Err(e) => Err(e),
    };

    match outcome {
        Ok(outcome) => Json(to_http_response(outcome)).into_response(),
        Err(e) => {
            tracing::error!(text = %request.text, error = %e, "Conversation processing failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"message": e.to_string()})),
            )
                .into_response()
        }
    }
}

/// Build the conversation REST routes.
pub fn conversation_routes(agents: Arc<AgentRegistry>) -> Router {
    Router::new()
        .route("/api/conversation/process", post(process))
        .with_state(agents)
}
