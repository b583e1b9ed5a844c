//! Tool-attachment client: attaches relevant tools to an agent, preserving a keep-list.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::http::validate_base_url;
use crate::retry::{with_retries, RetryPolicy};

const SERVICE: &str = "tool-attachment";
const TIMEOUT: Duration = Duration::from_secs(15);
const RETRY: RetryPolicy = RetryPolicy::none();

/// Wildcard meaning "preserve all currently attached tools". Preserved verbatim at this
/// client's boundary; never expanded locally.
pub const KEEP_ALL_WILDCARD: &str = "*";

pub const DEFAULT_LIMIT: u32 = 3;
pub const DEFAULT_MIN_SCORE: f64 = 70.0;

#[derive(Debug, Clone, Serialize)]
struct AttachRequest<'a> {
    query: &'a str,
    agent_id: &'a str,
    keep_tools: &'a [String],
    limit: u32,
    min_score: f64,
    request_heartbeat: bool,
}

/// Result of one tool-attachment call.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolAttachmentResult {
    #[serde(default)]
    pub attached: Vec<String>,
    #[serde(default)]
    pub preserved: Vec<String>,
}

pub struct ToolAttachmentClient {
    base_url: String,
    http: reqwest::Client,
}

impl ToolAttachmentClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(ToolAttachmentClient {
            base_url: validate_base_url(SERVICE, base_url)?,
            http: reqwest::Client::new(),
        })
    }

    /// Attaches tools relevant to `query` to `agent_id`, preserving every tool named in
    /// `keep_tools` (typically `["*", <find-tools utility id>]`).
    pub async fn attach(
        &self,
        query: &str,
        agent_id: &str,
        keep_tools: &[String],
        request_heartbeat: bool,
    ) -> Result<ToolAttachmentResult, ClientError> {
        let url = format!("{}/api/v1/tools/attach", self.base_url);
        let body = AttachRequest {
            query,
            agent_id,
            keep_tools,
            limit: DEFAULT_LIMIT,
            min_score: DEFAULT_MIN_SCORE,
            request_heartbeat,
        };
        let resp = with_retries(&RETRY, SERVICE, || {
            self.http.post(&url).timeout(TIMEOUT).json(&body).send()
        })
        .await?;
        resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))
    }
}
