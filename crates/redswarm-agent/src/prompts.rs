//! System prompt composition
//!
//! Four layers per agent: a base role description, a tool manual generated
//! from the agent's bound schemas, a swarm architecture block, and a
//! handoff catalogue naming the peers. Composed once when the swarm is
//! built; the result is a single constant string per agent.

use redswarm_llm::ToolSchema;

pub const PLANNER_BASE: &str = "\
You are the planner of an authorized red-team engagement running against a \
sandboxed lab container. You break the operator's request into concrete \
steps, decide which specialist should act next, and keep the overall \
operation on track. You do not run tools yourself; you delegate. Be \
concise and concrete about what should happen next and why.";

pub const RECON_BASE: &str = "\
You are the reconnaissance specialist of an authorized red-team engagement \
running against a sandboxed lab container. You gather information about \
targets: port scans, service versions, DNS records, WHOIS data, HTTP \
probing. Run the smallest scan that answers the question, report findings \
factually, and note anything that looks like an attack surface.";

pub const INITIAL_ACCESS_BASE: &str = "\
You are the initial-access specialist of an authorized red-team engagement \
running against a sandboxed lab container. You attempt to establish access \
to targets the operator has authorized: credential brute force, known \
exploit lookup, SSH logins. State clearly what you tried, what worked, and \
what failed.";

pub const SUMMARY_BASE: &str = "\
You are the summary agent of an authorized red-team engagement. You read \
the conversation so far and produce a clear operator-facing report: what \
was attempted, what was found, what access was gained, and sensible next \
steps. Do not run tools other than memory.";

pub const SWARM_ARCHITECTURE: &str = "\
You are one agent in a swarm. All agents share the same conversation \
history; what you write is visible to the others. When the next step \
belongs to another specialist, call their handoff tool instead of doing \
the work yourself. After a handoff the target agent continues from the \
shared history, so leave it in a useful state.";

/// Compose the full system prompt for one agent.
pub fn compose_prompt(base: &str, tools: &[ToolSchema], peers: &[&str]) -> String {
    let mut prompt = String::from(base);

    let manual: Vec<String> = tools
        .iter()
        .filter(|t| !is_handoff_schema(t))
        .map(|t| format!("- {}: {}", t.name, t.description))
        .collect();
    if !manual.is_empty() {
        prompt.push_str("\n\n## Your tools\n");
        prompt.push_str(&manual.join("\n"));
    }

    prompt.push_str("\n\n## Swarm\n");
    prompt.push_str(SWARM_ARCHITECTURE);

    if !peers.is_empty() {
        prompt.push_str("\n\n## Peer agents\n");
        let catalogue: Vec<String> = peers
            .iter()
            .map(|peer| format!("- {}: hand off with handoff_to_{}", peer, peer))
            .collect();
        prompt.push_str(&catalogue.join("\n"));
    }

    prompt
}

fn is_handoff_schema(schema: &ToolSchema) -> bool {
    redswarm_core::HANDOFF_PREFIXES
        .iter()
        .any(|p| schema.name.starts_with(p))
}

pub fn base_prompt_for(agent: &str) -> &'static str {
    match agent {
        "planner" => PLANNER_BASE,
        "reconnaissance" => RECON_BASE,
        "initial_access" => INITIAL_ACCESS_BASE,
        "summary" => SUMMARY_BASE,
        _ => PLANNER_BASE,
    }
}
