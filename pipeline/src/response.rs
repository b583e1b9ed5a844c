//! JSON response shape returned to the webhook caller.

use serde::Serialize;

/// Outcome of the cumulative-context memory block step.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct GraphitiResult {
    pub success: bool,
    /// The formatted knowledge-graph context generated this request, regardless of whether it
    /// was written anywhere — skipped cleanly if `agent_id` is empty, but the generated context
    /// is still returned in the response.
    pub context: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_name: Option<String>,
    /// True only when an existing block's value was rewritten with new content — false for a
    /// freshly created block, a skipped agent-less request, or an unchanged no-op write
    /// (`update_memory_block` is a strict no-op when the value is unchanged).
    pub updated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of the agent-discovery step: registry search + `available_agents` block replace.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct AgentDiscoveryResult {
    pub success: bool,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Outcome of the tool-attachment step.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct ToolAttachmentResultBody {
    pub success: bool,
    #[serde(default)]
    pub attached: Vec<String>,
    #[serde(default)]
    pub preserved: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Full webhook response body. `success` reflects only whether the graphiti memory-block
/// step succeeded when an agent id was present — the other three subsystems fail independently
/// and are surfaced through their own `success` flags without ever flipping the overall
/// result.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct WebhookResponseBody {
    pub success: bool,
    pub message: String,
    pub graphiti: GraphitiResult,
    pub agent_discovery: AgentDiscoveryResult,
    pub tool_attachment: ToolAttachmentResultBody,
    pub agent_id: Option<String>,
    pub block_id: Option<String>,
    pub block_name: Option<String>,
}

impl WebhookResponseBody {
    pub fn new(agent_id: Option<String>) -> Self {
        WebhookResponseBody {
            success: true,
            message: String::new(),
            graphiti: GraphitiResult::default(),
            agent_discovery: AgentDiscoveryResult::default(),
            tool_attachment: ToolAttachmentResultBody::default(),
            agent_id,
            block_id: None,
            block_name: None,
        }
    }

    /// Assembles the human-readable `message` summarizing every subsystem's outcome, and mirrors
    /// the graphiti block's id/label up to the top level: `block_id`/`block_name` are carried
    /// both nested under `graphiti` and at the top.
    pub fn finalize(mut self) -> Self {
        self.block_id = self.graphiti.block_id.clone();
        self.block_name = self.graphiti.block_name.clone();

        let mut parts = Vec::new();
        if self.agent_id.is_some() {
            parts.push(if self.graphiti.success {
                "context updated".to_string()
            } else {
                "context update failed".to_string()
            });
        } else {
            parts.push("context generated (no agent id, memory steps skipped)".to_string());
        }
        parts.push(if self.agent_discovery.success {
            format!("{} agent(s) discovered", self.agent_discovery.count)
        } else {
            "agent discovery failed".to_string()
        });
        parts.push(if self.tool_attachment.success {
            format!("{} tool(s) attached", self.tool_attachment.attached.len())
        } else {
            "tool attachment failed".to_string()
        });
        self.message = parts.join("; ");
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finalize_mirrors_block_identity_to_top_level() {
        let mut body = WebhookResponseBody::new(Some("agent-A".into()));
        body.graphiti.block_id = Some("block-1".into());
        body.graphiti.block_name = Some("graphiti_context".into());
        let body = body.finalize();
        assert_eq!(body.block_id.as_deref(), Some("block-1"));
        assert_eq!(body.block_name.as_deref(), Some("graphiti_context"));
    }

    #[test]
    fn finalize_without_agent_id_notes_skipped_memory_steps() {
        let body = WebhookResponseBody::new(None).finalize();
        assert!(body.message.contains("no agent id"));
    }
}
