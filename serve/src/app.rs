//! Axum app: state and router.

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use pipeline::SharedPipeline;

use crate::handlers;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) pipeline: SharedPipeline,
}

pub(crate) fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", post(handlers::webhook_handler))
        .route("/webhook/letta", post(handlers::webhook_handler))
        .route("/health", get(handlers::health_handler))
        .route("/agent-tracker/status", get(handlers::agent_tracker_status))
        .route("/agent-tracker/reset", post(handlers::agent_tracker_reset))
        .with_state(state)
}
