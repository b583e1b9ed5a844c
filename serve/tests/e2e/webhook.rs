use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::common;

/// Happy path: a fresh knowledge-graph result with no agent runtime configured, so no
/// memory block is written, but the formatted context is still returned.
#[tokio::test]
async fn webhook_happy_path_returns_formatted_context() {
    common::load_dotenv();
    let graph = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            { "name": "N", "summary": "S" }
        ])))
        .mount(&graph)
        .await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&graph)
        .await;

    let (base_url, server_handle) = common::spawn_server(&graph.uri()).await;
    let client = reqwest::Client::new();
    let resp: serde_json::Value = client
        .post(format!("{base_url}/webhook"))
        .json(&serde_json::json!({
            "type": "message_sent",
            "prompt": "hello",
            "response": { "agent_id": "agent-A" }
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(resp["success"], true);
    assert_eq!(resp["agent_id"], "agent-A");
    assert!(resp["graphiti"]["context"].as_str().unwrap().contains("Node: N"));
    assert!(resp["graphiti"]["context"].as_str().unwrap().contains("Summary: S"));

    server_handle.abort();
}

/// `/webhook` and `/webhook/letta` are the same handler routed twice.
#[tokio::test]
async fn webhook_and_letta_alias_behave_identically() {
    common::load_dotenv();
    let graph = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/search/nodes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&graph)
        .await;
    Mock::given(method("POST"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([])))
        .mount(&graph)
        .await;

    let (base_url, server_handle) = common::spawn_server(&graph.uri()).await;
    let client = reqwest::Client::new();
    let body = serde_json::json!({ "prompt": "hi" });

    let webhook_resp: serde_json::Value = client
        .post(format!("{base_url}/webhook"))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let letta_resp: serde_json::Value = client
        .post(format!("{base_url}/webhook/letta"))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    assert_eq!(webhook_resp["graphiti"]["context"], letta_resp["graphiti"]["context"]);
    assert_eq!(webhook_resp["success"], letta_resp["success"]);

    server_handle.abort();
}

/// `agent_id` absent still returns 200 with the generated context.
#[tokio::test]
async fn webhook_without_agent_id_still_returns_200() {
    common::load_dotenv();
    let (base_url, server_handle) = common::spawn_server("http://127.0.0.1:1").await;
    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base_url}/webhook"))
        .json(&serde_json::json!({ "prompt": "hi" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["agent_id"].is_null());
    assert_eq!(body["success"], true);

    server_handle.abort();
}
