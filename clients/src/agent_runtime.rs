//! Agent-runtime client: list/get/create/update memory blocks, attach a block to an agent.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::http::validate_base_url;
use crate::retry::{with_retries, RetryPolicy};

const SERVICE: &str = "agent-runtime";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);
const RETRY: RetryPolicy = RetryPolicy::none();

/// Header carrying the configured shared secret for every agent-runtime call.
pub const HEADER_SHARED_SECRET: &str = "X-Letta-Api-Key";
/// Header identifying the agent this call acts on behalf of, when applicable.
pub const HEADER_CALLER_AGENT: &str = "X-Agent-Id";

/// A memory block as returned by the agent runtime.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct MemoryBlock {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlexibleList<T> {
    Bare(Vec<T>),
    Wrapped { blocks: Vec<T> },
}

impl<T> FlexibleList<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            FlexibleList::Bare(v) => v,
            FlexibleList::Wrapped { blocks } => blocks,
        }
    }
}

pub struct AgentRuntimeClient {
    base_url: String,
    shared_secret: String,
    http: reqwest::Client,
}

impl AgentRuntimeClient {
    pub fn new(base_url: &str, shared_secret: &str) -> Result<Self, ClientError> {
        Ok(AgentRuntimeClient {
            base_url: validate_base_url(SERVICE, base_url)?,
            shared_secret: shared_secret.to_string(),
            http: reqwest::Client::new(),
        })
    }

    fn authed(&self, builder: reqwest::RequestBuilder, acting_as: Option<&str>) -> reqwest::RequestBuilder {
        let builder = builder
            .timeout(DEFAULT_TIMEOUT)
            .bearer_auth(&self.shared_secret)
            .header(HEADER_SHARED_SECRET, &self.shared_secret);
        match acting_as {
            Some(agent_id) => builder.header(HEADER_CALLER_AGENT, agent_id),
            None => builder,
        }
    }

    async fn send(&self, req: reqwest::RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let req = req.build().map_err(|e| ClientError::Transport(e.to_string()))?;
        with_retries(&RETRY, SERVICE, || {
            let req = req.try_clone().expect("agent-runtime requests are always clonable");
            self.http.execute(req)
        })
        .await
    }

    /// Lists memory blocks attached to `agent_id`.
    pub async fn list_blocks_for_agent(&self, agent_id: &str) -> Result<Vec<MemoryBlock>, ClientError> {
        let url = format!("{}/v1/agents/{}/core-memory/blocks", self.base_url, agent_id);
        let resp = self
            .send(self.authed(self.http.get(&url), Some(agent_id)))
            .await?;
        let parsed: FlexibleList<MemoryBlock> = resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(parsed.into_vec())
    }

    /// Lists process-wide blocks matching `label`, paging until exhaustion.
    pub async fn list_blocks_by_label(&self, label: &str) -> Result<Vec<MemoryBlock>, ClientError> {
        let mut out = Vec::new();
        let mut after: Option<String> = None;
        loop {
            let mut url = format!("{}/v1/blocks?label={}&limit=100", self.base_url, label);
            if let Some(cursor) = &after {
                url.push_str(&format!("&after={cursor}"));
            }
            let resp = self.send(self.authed(self.http.get(&url), None)).await?;
            let parsed: FlexibleList<MemoryBlock> =
                resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))?;
            let page = parsed.into_vec();
            if page.is_empty() {
                break;
            }
            let page_len = page.len();
            after = page.last().map(|b| b.id.clone());
            out.extend(page);
            if page_len < 100 {
                break;
            }
        }
        Ok(out)
    }

    pub async fn get_block(&self, block_id: &str) -> Result<MemoryBlock, ClientError> {
        let url = format!("{}/v1/blocks/{}", self.base_url, block_id);
        let resp = self.send(self.authed(self.http.get(&url), None)).await?;
        resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn create_block(
        &self,
        label: &str,
        value: &str,
        agent_id: Option<&str>,
    ) -> Result<MemoryBlock, ClientError> {
        let url = format!("{}/v1/blocks", self.base_url);
        let body = serde_json::json!({ "label": label, "value": value });
        let resp = self
            .send(self.authed(self.http.post(&url).json(&body), agent_id))
            .await?;
        resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn update_block(
        &self,
        block_id: &str,
        value: &str,
        agent_id: Option<&str>,
    ) -> Result<MemoryBlock, ClientError> {
        let url = format!("{}/v1/blocks/{}", self.base_url, block_id);
        let body = serde_json::json!({ "value": value });
        let resp = self
            .send(self.authed(self.http.patch(&url).json(&body), agent_id))
            .await?;
        resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))
    }

    pub async fn attach_block(&self, agent_id: &str, block_id: &str) -> Result<(), ClientError> {
        let url = format!(
            "{}/v1/agents/{}/core-memory/blocks/attach/{}",
            self.base_url, agent_id, block_id
        );
        self.send(self.authed(self.http.patch(&url), Some(agent_id))).await?;
        Ok(())
    }

    /// Resolves the tool id of the named runtime utility (the `find-tools` utility referenced
    /// by the tool-attachment client's `keep_tools` list). Falls back to
    /// [`FIND_TOOLS_UTILITY_FALLBACK_ID`] when the runtime is unreachable or the tool is not
    /// found by name, rather than failing the whole tool-attachment step over it.
    pub async fn find_tool_id(&self, tool_name: &str) -> String {
        let url = format!("{}/v1/tools", self.base_url);
        let result: Result<FlexibleToolList<ToolSummary>, ClientError> = async {
            let resp = self.send(self.authed(self.http.get(&url), None)).await?;
            resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))
        }
        .await;

        match result {
            Ok(list) => list
                .into_vec()
                .into_iter()
                .find(|t| t.name == tool_name)
                .map(|t| t.id)
                .unwrap_or_else(|| FIND_TOOLS_UTILITY_FALLBACK_ID.to_string()),
            Err(_) => FIND_TOOLS_UTILITY_FALLBACK_ID.to_string(),
        }
    }
}

/// Name of the runtime utility tool that the tool-attachment service always preserves alongside
/// the `"*"` wildcard.
pub const FIND_TOOLS_UTILITY_NAME: &str = "find_tools";
/// Hard-coded id used when the runtime's tool list is unreachable or omits the utility,
/// resolved via the agent-runtime client with a hard-coded fallback.
pub const FIND_TOOLS_UTILITY_FALLBACK_ID: &str = "tool-find-tools-00000000";

#[derive(Debug, Clone, Deserialize)]
struct ToolSummary {
    id: String,
    #[serde(default)]
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlexibleToolList<T> {
    Bare(Vec<T>),
    Wrapped { tools: Vec<T> },
}

impl<T> FlexibleToolList<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            FlexibleToolList::Bare(v) => v,
            FlexibleToolList::Wrapped { tools } => tools,
        }
    }
}
