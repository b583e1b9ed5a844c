//! Webhook request shape and agent id resolution.

use serde::Deserialize;

/// One segment of a structured prompt, e.g. `{"type": "text", "text": "..."}`.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct PromptSegment {
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub text: String,
}

/// The inbound prompt is either a bare string, or a list of typed segments — callers vary in
/// which shape they send, and both are accepted without a discriminator field.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum Prompt {
    Text(String),
    Segments(Vec<PromptSegment>),
}

impl Prompt {
    /// Flattens the prompt to the plain text used as the knowledge-graph query.
    pub fn as_query_text(&self) -> String {
        match self {
            Prompt::Text(text) => text.clone(),
            Prompt::Segments(segments) => segments
                .iter()
                .map(|segment| segment.text.as_str())
                .collect::<Vec<_>>()
                .join(" "),
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(default)]
    pub agent_id: Option<String>,
}

/// Metadata about the upstream call that triggered this webhook event — not this service's
/// own URL. Carries e.g. `{"path": "/v1/agents/agent-X/messages"}` when the caller's own
/// `response.agent_id` is absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestEnvelope {
    #[serde(default)]
    pub path: Option<String>,
}

/// The parsed body of an inbound webhook call.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    #[serde(default)]
    pub response: Option<ResponseEnvelope>,
    #[serde(default)]
    pub request: Option<RequestEnvelope>,
    pub prompt: Prompt,
    #[serde(default)]
    pub max_nodes: Option<u32>,
    #[serde(default)]
    pub max_facts: Option<u32>,
}

/// Pulls an agent id out of a path such as `/v1/agents/agent-123/messages` by locating the
/// `agents` path segment and returning the one immediately after it.
fn agent_id_from_path(path: &str) -> Option<String> {
    let mut segments = path.split('/').filter(|s| !s.is_empty());
    while let Some(segment) = segments.next() {
        if segment == "agents" {
            return segments.next().map(|s| s.to_string());
        }
    }
    None
}

pub const AGENT_ID_PREFIX: &str = "agent-";

/// Resolves the target agent id for a webhook call, if any: `response.agent_id` takes
/// precedence, falling back to an `agents/{id}` segment in `request.path` — metadata about the
/// upstream call that triggered this event, carried in the body, not this service's own route.
/// A candidate that is empty or does not carry the `agent-` prefix used throughout the agent
/// runtime is treated as absent rather than rejected — callers skip or fall back on `None`,
/// they never fail the request over it.
pub fn resolve_agent_id(request: &WebhookRequest) -> Option<String> {
    request
        .response
        .as_ref()
        .and_then(|r| r.agent_id.clone())
        .filter(|id| !id.is_empty())
        .or_else(|| {
            request
                .request
                .as_ref()
                .and_then(|r| r.path.as_deref())
                .and_then(agent_id_from_path)
        })
        .filter(|id| id.starts_with(AGENT_ID_PREFIX))
}
