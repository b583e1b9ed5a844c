//! Renders a `KnowledgeGraphResult` into the plain-text block appended to cumulative context,
//! and an agent-registry search into the `available_agents` block.

use clients::{AgentSearchResult, KnowledgeGraphResult};

const HEADER: &str = "Relevant Entities from Knowledge Graph:";
const EMPTY_RESULT: &str = "No relevant knowledge graph results found.";

/// Formats a knowledge-graph search result for inclusion in a memory block. Empty results
/// produce a short explanatory string rather than an empty or header-only payload.
pub fn format_context(result: &KnowledgeGraphResult) -> String {
    if result.nodes.is_empty() && result.facts.is_empty() {
        return EMPTY_RESULT.to_string();
    }

    let mut out = String::from(HEADER);
    out.push('\n');
    for node in &result.nodes {
        out.push_str("Node: ");
        out.push_str(&node.name);
        out.push_str("\nSummary: ");
        out.push_str(&node.summary);
        out.push_str("\n\n");
    }
    for fact in &result.facts {
        out.push_str("Fact: ");
        out.push_str(&fact.fact);
        out.push_str("\n\n");
    }
    out.trim_end().to_string()
}

const NO_AGENTS_RESULT: &str = "No other agents currently available.";

/// Renders an agent-registry search into the formatted block for the `available_agents`
/// memory block: one entry per match, carrying agent id, name, status, relevance score,
/// description, and capability list.
pub fn format_agent_discovery(matches: &[AgentSearchResult]) -> String {
    if matches.is_empty() {
        return NO_AGENTS_RESULT.to_string();
    }

    let mut out = String::from("Available Agents:\n");
    for agent in matches {
        out.push_str("\nAgent: ");
        out.push_str(&agent.agent_id);
        out.push_str("\nName: ");
        out.push_str(&agent.name);
        out.push_str("\nStatus: ");
        out.push_str(&agent.status);
        out.push_str("\nRelevance: ");
        out.push_str(&format!("{:.2}", agent.score));
        out.push_str("\nDescription: ");
        out.push_str(&agent.description);
        out.push_str("\nCapabilities: ");
        out.push_str(&agent.capabilities.join(", "));
        out.push('\n');
    }
    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use clients::{KgFact, KgNode};
    use clients::AgentSearchResult;

    #[test]
    fn empty_result_is_explanatory_string() {
        let result = KnowledgeGraphResult::default();
        assert_eq!(format_context(&result), EMPTY_RESULT);
    }

    #[test]
    fn nodes_only() {
        let result = KnowledgeGraphResult {
            nodes: vec![KgNode { name: "Acme".into(), summary: "A widget company".into() }],
            facts: vec![],
        };
        assert_eq!(
            format_context(&result),
            "Relevant Entities from Knowledge Graph:\nNode: Acme\nSummary: A widget company"
        );
    }

    #[test]
    fn nodes_and_facts() {
        let result = KnowledgeGraphResult {
            nodes: vec![KgNode { name: "Acme".into(), summary: "A widget company".into() }],
            facts: vec![KgFact { fact: "Acme was founded in 1990".into() }],
        };
        let out = format_context(&result);
        assert!(out.starts_with("Relevant Entities from Knowledge Graph:\nNode: Acme\nSummary: A widget company"));
        assert!(out.ends_with("Fact: Acme was founded in 1990"));
    }

    #[test]
    fn multiple_nodes_and_facts_each_on_own_block() {
        let result = KnowledgeGraphResult {
            nodes: vec![
                KgNode { name: "Acme".into(), summary: "A widget company".into() },
                KgNode { name: "Globex".into(), summary: "A gadget company".into() },
            ],
            facts: vec![
                KgFact { fact: "Fact one".into() },
                KgFact { fact: "Fact two".into() },
            ],
        };
        let out = format_context(&result);
        assert!(out.contains("Node: Acme\nSummary: A widget company\n\nNode: Globex"));
        assert!(out.contains("Fact: Fact one\n\nFact: Fact two"));
    }

    #[test]
    fn empty_agent_discovery_is_explanatory_string() {
        assert_eq!(format_agent_discovery(&[]), NO_AGENTS_RESULT);
    }

    #[test]
    fn agent_discovery_renders_every_field() {
        let matches = vec![AgentSearchResult {
            agent_id: "agent-billing".into(),
            name: "Billing Agent".into(),
            description: "Handles billing".into(),
            capabilities: vec!["invoices".into(), "refunds".into()],
            status: "active".into(),
            score: 0.915,
        }];
        let out = format_agent_discovery(&matches);
        assert!(out.contains("Agent: agent-billing"));
        assert!(out.contains("Name: Billing Agent"));
        assert!(out.contains("Status: active"));
        assert!(out.contains("Relevance: 0.91") || out.contains("Relevance: 0.92"));
        assert!(out.contains("Description: Handles billing"));
        assert!(out.contains("Capabilities: invoices, refunds"));
    }
}
