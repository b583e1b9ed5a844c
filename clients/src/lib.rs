//! Typed HTTP clients for every external service the pipeline talks to: the
//! knowledge-graph, the agent-runtime, the tool-attachment service, the agent-registry,
//! and the chat-bridge notifier. Each client owns its own timeout and retry policy;
//! only the knowledge-graph client retries.

pub mod agent_registry;
pub mod agent_runtime;
pub mod chat_bridge;
pub mod config;
pub mod error;
mod http;
pub mod knowledge_graph;
pub mod retry;
pub mod tool_attachment;

pub use agent_registry::{AgentRegistryClient, AgentSearchResult};
pub use agent_runtime::{
    AgentRuntimeClient, MemoryBlock, FIND_TOOLS_UTILITY_FALLBACK_ID, FIND_TOOLS_UTILITY_NAME,
};
pub use chat_bridge::ChatBridgeClient;
pub use config::{ConfigError, PipelineConfig};
pub use error::ClientError;
pub use knowledge_graph::{KgFact, KgNode, KnowledgeGraphClient, KnowledgeGraphResult};
pub use tool_attachment::{ToolAttachmentClient, ToolAttachmentResult};
