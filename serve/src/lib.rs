//! HTTP server exposing the webhook context-enrichment pipeline (axum).
//!
//! **Public API**: [`run_serve`], [`run_serve_on_listener`].

mod app;
mod handlers;
pub mod logging;

use std::sync::Arc;

use pipeline::SharedPipeline;
use tokio::net::TcpListener;
use tracing::info;

use app::{router, AppState};

const DEFAULT_ADDR: &str = "127.0.0.1:8088";

/// Runs the server on an existing listener. Used by tests, which bind to `127.0.0.1:0` so the
/// OS picks a free port.
pub async fn run_serve_on_listener(
    listener: TcpListener,
    pipeline: SharedPipeline,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let addr = listener.local_addr()?;
    info!("webhook pipeline listening on http://{}", addr);

    let state = Arc::new(AppState { pipeline });
    let app = router(state);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Runs the server. Listens on `addr` (default `127.0.0.1:8088`, or `$BIND_ADDR` when `addr`
/// is `None`).
pub async fn run_serve(
    addr: Option<&str>,
    pipeline: SharedPipeline,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let owned;
    let addr = match addr {
        Some(a) => a,
        None => {
            owned = std::env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_ADDR.to_string());
            owned.as_str()
        }
    };
    let listener = TcpListener::bind(addr).await?;
    run_serve_on_listener(listener, pipeline).await
}
