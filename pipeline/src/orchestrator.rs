//! Composes the five external clients into the end-to-end webhook pipeline.
//!
//! Steps run strictly in order on the request task: track, context generation, graphiti memory
//! block, agent discovery, tool attachment. Only step 3 (graphiti) can flip the overall
//! `success` flag; every other subsystem is failure-contained and surfaced through its own
//! `success` field in the response.

use std::sync::Arc;

use clients::{
    AgentRegistryClient, AgentRuntimeClient, ChatBridgeClient, KnowledgeGraphClient, PipelineConfig,
    ToolAttachmentClient, FIND_TOOLS_UTILITY_FALLBACK_ID, FIND_TOOLS_UTILITY_NAME,
};
use tokio::sync::mpsc;

use crate::agent_tracker::AgentTracker;
use crate::error::WebhookError;
use crate::formatter::{format_agent_discovery, format_context};
use crate::memory_block_manager::{MemoryBlockManager, UpdateMode};
use crate::response::WebhookResponseBody;
use crate::webhook::{resolve_agent_id, WebhookRequest};

/// Label of the memory block holding the running knowledge-graph context log.
pub const CONTEXT_BLOCK_LABEL: &str = "graphiti_context";
/// Label of the memory block holding the most recent agent-registry search, replaced wholesale
/// on every webhook rather than appended.
pub const AVAILABLE_AGENTS_BLOCK_LABEL: &str = "available_agents";

/// Capacity of the background channel that decouples "notify chat bridge of a new agent" from
/// the request path — sized generously above normal new-agent burst rates.
const NEW_AGENT_CHANNEL_CAPACITY: usize = 16;

fn spawn_new_agent_worker(client: ChatBridgeClient) -> mpsc::Sender<String> {
    let (tx, mut rx) = mpsc::channel::<String>(NEW_AGENT_CHANNEL_CAPACITY);
    tokio::spawn(async move {
        while let Some(agent_id) = rx.recv().await {
            if let Err(err) = client.notify_new_agent(&agent_id).await {
                tracing::warn!(%agent_id, error = %err, "chat bridge notification failed");
            }
        }
    });
    tx
}

pub struct Pipeline {
    knowledge_graph: KnowledgeGraphClient,
    agent_runtime: Option<AgentRuntimeClient>,
    tool_attachment: Option<ToolAttachmentClient>,
    agent_registry: Option<AgentRegistryClient>,
    tracker: AgentTracker,
    new_agent_tx: Option<mpsc::Sender<String>>,
    graphiti_max_nodes: u32,
    graphiti_max_facts: u32,
    agent_registry_max_agents: u32,
    agent_registry_min_score: f64,
}

impl Pipeline {
    /// Builds every configured client up front: a missing `LETTA_BASE_URL`,
    /// `MATRIX_CLIENT_URL`, or `AGENT_REGISTRY_URL` disables that part of the pipeline rather
    /// than refusing to start, since only the knowledge graph is load-bearing for every call.
    pub fn from_config(config: &PipelineConfig) -> Result<Self, clients::ClientError> {
        let knowledge_graph = KnowledgeGraphClient::new(&config.graphiti_url)?;

        let agent_runtime = config
            .letta_base_url
            .as_ref()
            .map(|url| AgentRuntimeClient::new(url, config.letta_password.as_deref().unwrap_or("")))
            .transpose()?;

        let tool_attachment = config
            .letta_base_url
            .as_ref()
            .map(|url| ToolAttachmentClient::new(url))
            .transpose()?;

        let agent_registry = config
            .agent_registry_url
            .as_ref()
            .map(|url| AgentRegistryClient::new(url))
            .transpose()?;

        let new_agent_tx = config
            .matrix_client_url
            .as_ref()
            .map(|url| ChatBridgeClient::new(url))
            .transpose()?
            .map(spawn_new_agent_worker);

        Ok(Pipeline {
            knowledge_graph,
            agent_runtime,
            tool_attachment,
            agent_registry,
            tracker: AgentTracker::new(),
            new_agent_tx,
            graphiti_max_nodes: config.graphiti_max_nodes,
            graphiti_max_facts: config.graphiti_max_facts,
            agent_registry_max_agents: config.agent_registry_max_agents,
            agent_registry_min_score: config.agent_registry_min_score,
        })
    }

    pub fn tracker(&self) -> &AgentTracker {
        &self.tracker
    }

    /// Runs the full pipeline for one webhook call, in order: track the agent, search the
    /// knowledge graph and append formatted context to its memory block, refresh the
    /// `available_agents` block from a registry search, and attach relevant tools. A
    /// parse-level failure is the only thing that can still reach the caller as an error —
    /// every subsystem failure past that point is contained in the response body.
    pub async fn process(&self, request: &WebhookRequest) -> Result<WebhookResponseBody, WebhookError> {
        let agent_id = resolve_agent_id(request);
        let mut body = WebhookResponseBody::new(agent_id.clone());

        let query = request.prompt.as_query_text();
        let max_nodes = request.max_nodes.unwrap_or(self.graphiti_max_nodes);
        let max_facts = request.max_facts.unwrap_or(self.graphiti_max_facts);

        // Step 1: track the agent, non-blocking notification on first sighting.
        if let Some(agent_id) = &agent_id {
            if self.tracker.observe(agent_id) {
                if let Some(tx) = &self.new_agent_tx {
                    if tx.try_send(agent_id.clone()).is_err() {
                        tracing::warn!(%agent_id, "new agent notification channel full or closed, dropping");
                    }
                }
            }
        }

        // Step 2: context generation, always attempted regardless of agent id.
        let (formatted, kg_ok) = match self.knowledge_graph.search(&query, max_nodes, max_facts).await {
            Ok(result) => (format_context(&result), true),
            Err(err) => (err, false),
        };
        body.graphiti.context = formatted.clone();
        if !kg_ok {
            body.graphiti.error = Some(formatted.clone());
        }

        // Step 3: graphiti memory block, append mode. Skipped cleanly without an agent id.
        let mut graphiti_ok = kg_ok;
        if let Some(runtime) = &self.agent_runtime {
            let manager = MemoryBlockManager::new(runtime);
            match manager
                .apply(agent_id.as_deref(), CONTEXT_BLOCK_LABEL, UpdateMode::Append, &formatted)
                .await
            {
                Ok(Some(outcome)) => {
                    body.graphiti.block_id = Some(outcome.block.id.clone());
                    body.graphiti.block_name = Some(outcome.block.label.clone());
                    body.graphiti.updated = outcome.updated();
                }
                Ok(None) => {}
                Err(err) => {
                    graphiti_ok = false;
                    body.graphiti.error = Some(format!("failed to update context block: {err}"));
                }
            }
        }
        body.graphiti.success = graphiti_ok;
        // Overall success is true iff step 3 succeeded when an agent id was present, else true.
        body.success = agent_id.is_none() || graphiti_ok;

        // Step 4: agent discovery, registry search + `available_agents` block replace.
        if let Some(registry) = &self.agent_registry {
            match registry
                .search(&query, self.agent_registry_max_agents, self.agent_registry_min_score)
                .await
            {
                Ok(matches) => {
                    body.agent_discovery.success = true;
                    body.agent_discovery.count = matches.len();
                    let formatted_agents = format_agent_discovery(&matches);
                    if let Some(runtime) = &self.agent_runtime {
                        let manager = MemoryBlockManager::new(runtime);
                        match manager
                            .apply(
                                agent_id.as_deref(),
                                AVAILABLE_AGENTS_BLOCK_LABEL,
                                UpdateMode::Replace,
                                &formatted_agents,
                            )
                            .await
                        {
                            Ok(Some(outcome)) => body.agent_discovery.block_id = Some(outcome.block.id),
                            Ok(None) => {}
                            Err(err) => {
                                body.agent_discovery.success = false;
                                body.agent_discovery.error =
                                    Some(format!("failed to update available_agents block: {err}"));
                            }
                        }
                    }
                }
                Err(err) => {
                    body.agent_discovery.success = false;
                    body.agent_discovery.error = Some(format!("agent registry search failed: {err}"));
                }
            }
        } else {
            body.agent_discovery.success = true;
        }

        // Step 5: tool attachment, fire-and-report.
        if let Some(tool_attachment) = &self.tool_attachment {
            let find_tools_id = match &self.agent_runtime {
                Some(runtime) => runtime.find_tool_id(FIND_TOOLS_UTILITY_NAME).await,
                None => FIND_TOOLS_UTILITY_FALLBACK_ID.to_string(),
            };
            let keep_tools = vec![clients::tool_attachment::KEEP_ALL_WILDCARD.to_string(), find_tools_id];
            match agent_id.as_deref() {
                Some(agent_id) => match tool_attachment.attach(&query, agent_id, &keep_tools, false).await {
                    Ok(result) => {
                        body.tool_attachment.success = true;
                        body.tool_attachment.attached = result.attached;
                        body.tool_attachment.preserved = result.preserved;
                    }
                    Err(err) => {
                        body.tool_attachment.success = false;
                        body.tool_attachment.error = Some(format!("tool attachment failed: {err}"));
                    }
                },
                None => body.tool_attachment.success = true,
            }
        } else {
            body.tool_attachment.success = true;
        }

        Ok(body.finalize())
    }
}

/// Shared handle to a `Pipeline`, the type `serve` hands to every axum handler.
pub type SharedPipeline = Arc<Pipeline>;
