//! Process-local record of which agent ids have already been observed.
//!
//! Tracking resets on process restart; this is explicitly process-local state, not persisted.

use std::collections::HashSet;
use std::sync::Mutex;

/// Tracks agent ids seen so far and reports at-most-once "first time seen" per process.
pub struct AgentTracker {
    seen: Mutex<HashSet<String>>,
}

impl Default for AgentTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentTracker {
    pub fn new() -> Self {
        AgentTracker { seen: Mutex::new(HashSet::new()) }
    }

    /// Records `agent_id` as seen. Returns `true` the first time a given id is observed, and
    /// `false` on every subsequent call for the same id.
    pub fn observe(&self, agent_id: &str) -> bool {
        let mut seen = self.seen.lock().expect("agent tracker mutex poisoned");
        seen.insert(agent_id.to_string())
    }

    /// Clears all tracked agent ids.
    pub fn reset(&self) {
        self.seen.lock().expect("agent tracker mutex poisoned").clear();
    }

    /// Number of distinct agent ids observed so far.
    pub fn count(&self) -> usize {
        self.seen.lock().expect("agent tracker mutex poisoned").len()
    }

    /// Snapshot of tracker state for the `/agent-tracker/status` introspection endpoint.
    pub fn status(&self) -> TrackerStatus {
        let seen = self.seen.lock().expect("agent tracker mutex poisoned");
        TrackerStatus { count: seen.len(), ids: seen.iter().cloned().collect() }
    }
}

/// A point-in-time snapshot of the agent tracker's state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackerStatus {
    pub count: usize,
    pub ids: Vec<String>,
}
