//! Chat-bridge client: fire-and-forget notification of a newly-seen agent id.

use std::time::Duration;

use crate::error::ClientError;
use crate::http::validate_base_url;
use crate::retry::{with_retries, RetryPolicy};

const SERVICE: &str = "chat-bridge";
const TIMEOUT: Duration = Duration::from_secs(5);
const RETRY: RetryPolicy = RetryPolicy::none();

pub struct ChatBridgeClient {
    base_url: String,
    http: reqwest::Client,
}

impl ChatBridgeClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(ChatBridgeClient {
            base_url: validate_base_url(SERVICE, base_url)?,
            http: reqwest::Client::new(),
        })
    }

    /// Notifies the chat bridge that `agent_id` was seen for the first time this process.
    /// Meant to be called from a background worker, not the request path.
    pub async fn notify_new_agent(&self, agent_id: &str) -> Result<(), ClientError> {
        let url = format!("{}/api/v1/notifications/new-agent", self.base_url);
        let body = serde_json::json!({ "agent_id": agent_id });
        with_retries(&RETRY, SERVICE, || {
            self.http.post(&url).timeout(TIMEOUT).json(&body).send()
        })
        .await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn rejects_empty_base_url() {
        let err = ChatBridgeClient::new("").unwrap_err();
        assert!(matches!(err, ClientError::Config { .. }));
    }

    #[tokio::test]
    async fn notify_new_agent_posts_agent_id() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/notifications/new-agent"))
            .and(body_json(serde_json::json!({ "agent_id": "agent-A" })))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let client = ChatBridgeClient::new(&server.uri()).unwrap();
        client.notify_new_agent("agent-A").await.unwrap();
    }

    #[tokio::test]
    async fn notify_failure_is_reported_not_retried() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503))
            .expect(1)
            .mount(&server)
            .await;

        let client = ChatBridgeClient::new(&server.uri()).unwrap();
        let err = client.notify_new_agent("agent-A").await.unwrap_err();
        assert_eq!(err.status(), Some(503));
    }
}
