//! Locate-or-create-then-update lifecycle for a single labeled memory block.
//!
//! A label is first looked for among the blocks already attached to the target agent, then
//! among process-wide blocks carrying that label (attaching it if the agent is known), and only
//! created from scratch as a last resort. Every write enforces the byte cap from
//! [`crate::cumulative_context::MAX_BYTES`] before it reaches the agent runtime. When the agent
//! id is unknown, creation and attachment are both unavailable — the manager can only adopt an
//! existing process-wide block, never mint one.

use clients::{AgentRuntimeClient, MemoryBlock};

use crate::cumulative_context;
use crate::error::BlockError;

/// How new content combines with a block's current value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateMode {
    /// Append with dedup + oldest-first truncation — used for the cumulative-context block.
    Append,
    /// Replace the value outright, still capped to `MAX_BYTES` — used for the
    /// `available_agents` block, which reflects a point-in-time registry search rather than
    /// a running log.
    Replace,
}

/// Result of [`MemoryBlockManager::apply`]: the block as it ended up, whether it was freshly
/// created this call, and whether a write actually reached the agent runtime.
#[derive(Debug, Clone)]
pub struct ApplyOutcome {
    pub block: MemoryBlock,
    pub created: bool,
    pub wrote: bool,
}

impl ApplyOutcome {
    /// True only when an *existing* block's value was rewritten — the response field of the
    /// same name is false for both a fresh create and a no-op skip.
    pub fn updated(&self) -> bool {
        self.wrote && !self.created
    }
}

fn enforce_cap(value: &str) -> String {
    if value.len() <= cumulative_context::MAX_BYTES {
        return value.to_string();
    }
    let mut end = cumulative_context::MAX_BYTES;
    while end > 0 && !value.is_char_boundary(end) {
        end -= 1;
    }
    value[..end].to_string()
}

pub struct MemoryBlockManager<'a> {
    client: &'a AgentRuntimeClient,
}

impl<'a> MemoryBlockManager<'a> {
    pub fn new(client: &'a AgentRuntimeClient) -> Self {
        MemoryBlockManager { client }
    }

    /// Finds (or creates) the block carrying `label` reachable from `agent_id`. Returns
    /// `(block, created)`. When `agent_id` is `None`, only an existing process-wide block can be
    /// adopted; if none exists, returns `Ok(None)` rather than creating an orphaned block.
    async fn locate_or_create(
        &self,
        agent_id: Option<&str>,
        label: &str,
    ) -> Result<Option<(MemoryBlock, bool)>, BlockError> {
        if let Some(agent_id) = agent_id {
            let attached = self.client.list_blocks_for_agent(agent_id).await?;
            if let Some(block) = attached.into_iter().find(|b| b.label == label) {
                return Ok(Some((block, false)));
            }

            let candidates = self.client.list_blocks_by_label(label).await?;
            if let Some(block) = candidates.into_iter().next() {
                self.client.attach_block(agent_id, &block.id).await?;
                return Ok(Some((block, false)));
            }

            let created = self.client.create_block(label, "", Some(agent_id)).await?;
            self.client.attach_block(agent_id, &created.id).await?;
            return Ok(Some((created, true)));
        }

        let candidates = self.client.list_blocks_by_label(label).await?;
        Ok(candidates.into_iter().next().map(|b| (b, false)))
    }

    /// Applies `content` to the block carrying `label` under `mode`, writing only when the
    /// resulting value actually differs from the block's current value — a strict no-op when
    /// unchanged, avoiding a write on every webhook that produces identical content. Returns
    /// `Ok(None)` when there is nothing to operate on (agent id absent and no process-wide
    /// block exists for `label`).
    pub async fn apply(
        &self,
        agent_id: Option<&str>,
        label: &str,
        mode: UpdateMode,
        content: &str,
    ) -> Result<Option<ApplyOutcome>, BlockError> {
        let (block, created) = match self.locate_or_create(agent_id, label).await? {
            Some(located) => located,
            None => return Ok(None),
        };

        let new_value = match mode {
            UpdateMode::Append => cumulative_context::append(&block.value, content),
            UpdateMode::Replace => enforce_cap(content),
        };
        if new_value == block.value {
            return Ok(Some(ApplyOutcome { block, created, wrote: false }));
        }

        match self.client.update_block(&block.id, &new_value, agent_id).await {
            Ok(updated) => Ok(Some(ApplyOutcome { block: updated, created, wrote: true })),
            Err(err) if err.is_not_found() => {
                // The located block was deleted externally between locate and update (or
                // never existed under that id). Fall back to the same create-then-attach
                // path `locate_or_create` takes when nothing is found up front.
                let created_block = self.client.create_block(label, &new_value, agent_id).await?;
                if let Some(agent_id) = agent_id {
                    self.client.attach_block(agent_id, &created_block.id).await?;
                }
                Ok(Some(ApplyOutcome { block: created_block, created: true, wrote: true }))
            }
            Err(err) => Err(err.into()),
        }
    }
}
