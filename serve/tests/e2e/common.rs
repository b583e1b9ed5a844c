//! Shared helpers for e2e tests: spin the real axum app on `127.0.0.1:0` and drive it with a
//! plain `reqwest::Client` over JSON-over-HTTP.

use std::sync::Arc;

use clients::PipelineConfig;
use pipeline::Pipeline;
use tokio::net::TcpListener;

/// Loads `.env` from the current directory, if present, so local runs can set e.g.
/// `GRAPHITI_URL` without exporting it manually.
pub fn load_dotenv() {
    let _ = dotenv::dotenv();
}

fn config_for(graphiti_url: &str) -> PipelineConfig {
    PipelineConfig {
        graphiti_url: graphiti_url.to_string(),
        graphiti_max_nodes: 10,
        graphiti_max_facts: 10,
        letta_base_url: None,
        letta_password: None,
        matrix_client_url: None,
        agent_registry_url: None,
        agent_registry_max_agents: 5,
        agent_registry_min_score: 0.5,
    }
}

/// Binds to a random port and spawns the server with only the knowledge-graph client
/// configured (pointed at `graphiti_url`). Returns (`base_url`, server join handle).
pub async fn spawn_server(
    graphiti_url: &str,
) -> (String, tokio::task::JoinHandle<Result<(), Box<dyn std::error::Error + Send + Sync>>>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let base_url = format!("http://{addr}");
    let pipeline = Arc::new(Pipeline::from_config(&config_for(graphiti_url)).unwrap());
    let handle = tokio::spawn(serve::run_serve_on_listener(listener, pipeline));
    (base_url, handle)
}
