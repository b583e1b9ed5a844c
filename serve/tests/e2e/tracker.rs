use super::common;

/// `/agent-tracker/status` returns `{count, ids}`, and `/agent-tracker/reset` clears it —
/// both with status 200.
#[tokio::test]
async fn tracker_status_reflects_webhook_activity_and_reset_clears_it() {
    common::load_dotenv();
    let (base_url, server_handle) = common::spawn_server("http://127.0.0.1:1").await;
    let client = reqwest::Client::new();

    client
        .post(format!("{base_url}/webhook"))
        .json(&serde_json::json!({
            "prompt": "hello",
            "response": { "agent_id": "agent-tracked" }
        }))
        .send()
        .await
        .unwrap();

    let status: serde_json::Value = client
        .get(format!("{base_url}/agent-tracker/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["count"], 1);
    assert_eq!(status["ids"][0], "agent-tracked");

    let reset_resp = client
        .post(format!("{base_url}/agent-tracker/reset"))
        .send()
        .await
        .unwrap();
    assert_eq!(reset_resp.status(), 200);

    let status_after: serde_json::Value = client
        .get(format!("{base_url}/agent-tracker/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status_after["count"], 0);

    server_handle.abort();
}
