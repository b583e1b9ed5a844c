//! Agent-registry client: semantic search over known agents.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::http::validate_base_url;
use crate::retry::{with_retries, RetryPolicy};

const SERVICE: &str = "agent-registry";
const TIMEOUT: Duration = Duration::from_secs(15);
const RETRY: RetryPolicy = RetryPolicy::none();

/// One agent returned by a registry search.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentSearchResult {
    pub agent_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub score: f64,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlexibleList<T> {
    Bare(Vec<T>),
    Wrapped { agents: Vec<T> },
}

impl<T> FlexibleList<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            FlexibleList::Bare(v) => v,
            FlexibleList::Wrapped { agents } => agents,
        }
    }
}

pub struct AgentRegistryClient {
    base_url: String,
    http: reqwest::Client,
}

impl AgentRegistryClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(AgentRegistryClient {
            base_url: validate_base_url(SERVICE, base_url)?,
            http: reqwest::Client::new(),
        })
    }

    pub async fn search(
        &self,
        query: &str,
        limit: u32,
        min_score: f64,
    ) -> Result<Vec<AgentSearchResult>, ClientError> {
        let url = format!("{}/api/v1/agents/search", self.base_url);
        let resp = with_retries(&RETRY, SERVICE, || {
            self.http
                .get(&url)
                .timeout(TIMEOUT)
                .query(&[
                    ("query", query.to_string()),
                    ("limit", limit.to_string()),
                    ("min_score", min_score.to_string()),
                ])
                .send()
        })
        .await?;
        let parsed: FlexibleList<AgentSearchResult> =
            resp.json().await.map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(parsed.into_vec())
    }
}
