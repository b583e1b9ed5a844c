use super::common;

/// Malformed JSON returns 400 with a short diagnostic, no external calls made.
#[tokio::test]
async fn malformed_json_returns_400() {
    common::load_dotenv();
    let (base_url, server_handle) = common::spawn_server("http://127.0.0.1:1").await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base_url}/webhook"))
        .header("content-type", "application/json")
        .body("not valid json")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);

    server_handle.abort();
}

/// The webhook handler never returns 5xx for any payload that parses as JSON.
#[tokio::test]
async fn prompt_missing_text_segments_does_not_crash() {
    common::load_dotenv();
    let (base_url, server_handle) = common::spawn_server("http://127.0.0.1:1").await;

    let client = reqwest::Client::new();
    let resp = client
        .post(format!("{base_url}/webhook"))
        .json(&serde_json::json!({ "prompt": [] }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    server_handle.abort();
}
