//! Request handlers: webhook intake, health check, and agent-tracker introspection.

use std::sync::Arc;

use axum::extract::{OriginalUri, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pipeline::WebhookError;
use serde_json::json;
use uuid::Uuid;

use crate::app::AppState;

fn status_for(err: &WebhookError) -> StatusCode {
    match err {
        WebhookError::MalformedJson(_) => StatusCode::BAD_REQUEST,
    }
}

/// Handles `POST /webhook` and `POST /webhook/letta` — both routes run the identical pipeline.
/// The request id is logged but not returned to the caller.
pub(crate) async fn webhook_handler(
    State(state): State<Arc<AppState>>,
    uri: OriginalUri,
    body: String,
) -> Response {
    let request_id = Uuid::new_v4();
    let path = uri.0.path().to_string();
    let span = tracing::info_span!("webhook", %request_id, %path);
    let _enter = span.enter();

    let request = match serde_json::from_str(&body) {
        Ok(request) => request,
        Err(e) => {
            let err = WebhookError::MalformedJson(e.to_string());
            tracing::warn!(error = %err, "rejecting malformed webhook request");
            return (status_for(&err), Json(json!({ "error": err.to_string() }))).into_response();
        }
    };

    match state.pipeline.process(&request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "rejecting webhook request");
            (status_for(&err), Json(json!({ "error": err.to_string() }))).into_response()
        }
    }
}

pub(crate) async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}

pub(crate) async fn agent_tracker_status(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let status = state.pipeline.tracker().status();
    (StatusCode::OK, Json(json!({ "count": status.count, "ids": status.ids })))
}

/// Clears the tracker and reports success with a plain 200, not 204 — callers expect a body.
pub(crate) async fn agent_tracker_reset(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    state.pipeline.tracker().reset();
    (StatusCode::OK, Json(json!({ "status": "reset" })))
}
