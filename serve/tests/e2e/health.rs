use super::common;

#[tokio::test]
async fn health_returns_200() {
    common::load_dotenv();
    let (base_url, server_handle) = common::spawn_server("http://127.0.0.1:1").await;

    let resp = reqwest::get(format!("{base_url}/health")).await.unwrap();
    assert_eq!(resp.status(), 200);

    server_handle.abort();
}
