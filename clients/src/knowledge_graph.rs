//! Knowledge-graph client: semantic search over nodes and facts.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ClientError;
use crate::http::validate_base_url;
use crate::retry::{with_retries, KNOWLEDGE_GRAPH_RETRY};

const SERVICE: &str = "knowledge-graph";
const TIMEOUT: Duration = Duration::from_secs(30);

/// A node returned by the knowledge graph: an entity with a name and summary.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KgNode {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub summary: String,
}

/// A fact returned by the knowledge graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KgFact {
    #[serde(default)]
    pub fact: String,
}

/// Combined node + fact search result for one webhook. Facts are deduplicated
/// by exact text equality, preserving first occurrence.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct KnowledgeGraphResult {
    pub nodes: Vec<KgNode>,
    pub facts: Vec<KgFact>,
}

/// The knowledge-graph service's response is either a bare JSON array, or an object with a
/// `results` field — both shapes are accepted.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum FlexibleList<T> {
    Bare(Vec<T>),
    Wrapped { results: Vec<T> },
}

impl<T> FlexibleList<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            FlexibleList::Bare(v) => v,
            FlexibleList::Wrapped { results } => results,
        }
    }
}

pub struct KnowledgeGraphClient {
    base_url: String,
    http: reqwest::Client,
}

impl KnowledgeGraphClient {
    pub fn new(base_url: &str) -> Result<Self, ClientError> {
        Ok(KnowledgeGraphClient {
            base_url: validate_base_url(SERVICE, base_url)?,
            http: reqwest::Client::new(),
        })
    }

    async fn search_nodes(&self, query: &str, max_nodes: u32) -> Result<Vec<KgNode>, ClientError> {
        let url = format!("{}/search/nodes", self.base_url);
        let body = serde_json::json!({
            "query": query,
            "max_nodes": max_nodes,
            "group_ids": [],
        });
        let resp = with_retries(&KNOWLEDGE_GRAPH_RETRY, SERVICE, || {
            self.http.post(&url).timeout(TIMEOUT).json(&body).send()
        })
        .await?;
        let parsed: FlexibleList<KgNode> = resp
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(parsed.into_vec())
    }

    async fn search_facts(&self, query: &str, max_facts: u32) -> Result<Vec<KgFact>, ClientError> {
        let url = format!("{}/search", self.base_url);
        let body = serde_json::json!({
            "query": query,
            "max_facts": max_facts,
            "group_ids": [],
        });
        let resp = with_retries(&KNOWLEDGE_GRAPH_RETRY, SERVICE, || {
            self.http.post(&url).timeout(TIMEOUT).json(&body).send()
        })
        .await?;
        let parsed: FlexibleList<KgFact> = resp
            .json()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))?;
        Ok(parsed.into_vec())
    }

    /// Runs node search and fact search concurrently (both must complete before the context
    /// formatter runs). On failure, returns a human-readable error string rather than
    /// aborting the pipeline.
    pub async fn search(
        &self,
        query: &str,
        max_nodes: u32,
        max_facts: u32,
    ) -> Result<KnowledgeGraphResult, String> {
        let (nodes_res, facts_res) =
            tokio::join!(self.search_nodes(query, max_nodes), self.search_facts(query, max_facts));

        match (nodes_res, facts_res) {
            (Ok(nodes), Ok(facts)) => Ok(KnowledgeGraphResult {
                nodes: nodes.into_iter().take(max_nodes as usize).collect(),
                facts: dedup_facts(facts, max_facts),
            }),
            (Err(e1), Err(e2)) => Err(format!(
                "knowledge graph unavailable: node search failed ({e1}); fact search failed ({e2})"
            )),
            (Err(e), Ok(_)) => Err(format!("knowledge graph node search failed: {e}")),
            (Ok(_), Err(e)) => Err(format!("knowledge graph fact search failed: {e}")),
        }
    }
}

/// Deduplicates facts by exact text equality, preserving first occurrence, then truncates
/// to `max_facts`.
fn dedup_facts(facts: Vec<KgFact>, max_facts: u32) -> Vec<KgFact> {
    let mut seen = std::collections::HashSet::new();
    let mut out = Vec::new();
    for fact in facts {
        if seen.insert(fact.fact.clone()) {
            out.push(fact);
            if out.len() >= max_facts as usize {
                break;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_base_url() {
        let err = KnowledgeGraphClient::new("").unwrap_err();
        assert!(matches!(err, ClientError::Config { .. }));
    }

    #[test]
    fn dedup_facts_preserves_first_occurrence_and_caps() {
        let facts = vec![
            KgFact { fact: "a".into() },
            KgFact { fact: "b".into() },
            KgFact { fact: "a".into() },
            KgFact { fact: "c".into() },
        ];
        let out = dedup_facts(facts, 10);
        assert_eq!(out.len(), 3);
        assert_eq!(out[0].fact, "a");
        assert_eq!(out[1].fact, "b");
        assert_eq!(out[2].fact, "c");
    }

    #[test]
    fn dedup_facts_respects_max_facts() {
        let facts = vec![
            KgFact { fact: "a".into() },
            KgFact { fact: "b".into() },
            KgFact { fact: "c".into() },
        ];
        let out = dedup_facts(facts, 2);
        assert_eq!(out.len(), 2);
    }

    #[tokio::test]
    async fn search_reports_both_failures_when_base_url_unreachable() {
        let client = KnowledgeGraphClient {
            base_url: "http://127.0.0.1:1".to_string(),
            http: reqwest::Client::new(),
        };
        let err = client.search("q", 5, 5).await.unwrap_err();
        assert!(err.contains("node search failed"));
        assert!(err.contains("fact search failed"));
    }
}
