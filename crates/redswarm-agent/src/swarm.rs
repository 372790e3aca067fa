//! The agent graph
//!
//! Agents are routed by name through a central table; handoff tools carry
//! only target names, never references. The builder validates that every
//! bound handoff tool points at a registered agent so a bad graph fails at
//! construction, not mid-conversation.

use crate::prompts;
use redswarm_core::{Error, Result, HANDOFF_PREFIXES};
use redswarm_tools::{ToolBinding, ToolRegistry};
use std::collections::BTreeMap;
use std::sync::Arc;

pub const DEFAULT_AGENT: &str = "planner";

/// One agent: a name, a composed system prompt, and its tool subset.
/// Immutable after the swarm is built.
pub struct AgentSpec {
    pub name: String,
    pub system_prompt: String,
    pub tools: ToolBinding,
}

pub struct SwarmGraph {
    agents: BTreeMap<String, AgentSpec>,
    default_agent: String,
}

impl SwarmGraph {
    pub fn agent(&self, name: &str) -> Option<&AgentSpec> {
        self.agents.get(name)
    }

    pub fn default_agent(&self) -> &str {
        &self.default_agent
    }

    pub fn agent_names(&self) -> Vec<&str> {
        self.agents.keys().map(|s| s.as_str()).collect()
    }
}

#[derive(Default)]
pub struct SwarmBuilder {
    agents: BTreeMap<String, AgentSpec>,
    default_agent: Option<String>,
}

impl SwarmBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn agent(
        mut self,
        name: impl Into<String>,
        system_prompt: impl Into<String>,
        tools: ToolBinding,
    ) -> Self {
        let name = name.into();
        self.agents.insert(
            name.clone(),
            AgentSpec {
                name,
                system_prompt: system_prompt.into(),
                tools,
            },
        );
        self
    }

    pub fn default_agent(mut self, name: impl Into<String>) -> Self {
        self.default_agent = Some(name.into());
        self
    }

    pub fn build(self) -> Result<SwarmGraph> {
        let default_agent = self
            .default_agent
            .unwrap_or_else(|| DEFAULT_AGENT.to_string());

        if self.agents.is_empty() {
            return Err(Error::Internal("swarm has no agents".into()));
        }
        if !self.agents.contains_key(&default_agent) {
            return Err(Error::Internal(format!(
                "default agent '{}' is not registered",
                default_agent
            )));
        }
        for spec in self.agents.values() {
            for tool_name in spec.tools.names() {
                let Some(target) = HANDOFF_PREFIXES
                    .iter()
                    .find_map(|p| tool_name.strip_prefix(p))
                else {
                    continue;
                };
                if !self.agents.contains_key(target) {
                    return Err(Error::Internal(format!(
                        "agent '{}' can hand off to unknown agent '{}'",
                        spec.name, target
                    )));
                }
            }
        }

        Ok(SwarmGraph {
            agents: self.agents,
            default_agent,
        })
    }
}

/// The standard four-agent red-team swarm over a full registry.
///
/// Per-agent tool visibility: the planner only routes and remembers; the
/// specialists get their domain tools plus raw terminal access; everyone
/// can hand off and use memory.
pub fn build_default_swarm(registry: &Arc<ToolRegistry>) -> Result<SwarmGraph> {
    const MEMORY: &[&str] = &["manage_memory", "search_memory"];
    const TERMINAL: &[&str] = &[
        "command_exec",
        "terminal_create_session",
        "terminal_session_list",
        "terminal_kill_session",
        "terminal_kill_server",
    ];

    let bind = |tools: &[&[&str]]| {
        let names: Vec<&str> = tools.iter().flat_map(|set| set.iter().copied()).collect();
        registry.bind(&names)
    };

    let planner = bind(&[
        &[
            "handoff_to_reconnaissance",
            "handoff_to_initial_access",
            "handoff_to_summary",
        ],
        MEMORY,
    ]);
    let recon = bind(&[
        &["nmap", "curl", "dig", "whois"],
        TERMINAL,
        MEMORY,
        &[
            "handoff_to_planner",
            "handoff_to_initial_access",
            "handoff_to_summary",
        ],
    ]);
    let initial_access = bind(&[
        &["hydra", "searchsploit", "sshpass"],
        TERMINAL,
        MEMORY,
        &[
            "handoff_to_planner",
            "handoff_to_reconnaissance",
            "handoff_to_summary",
        ],
    ]);
    let summary = bind(&[MEMORY, &["handoff_to_planner"]]);

    let compose = |agent: &str, binding: &ToolBinding, peers: &[&str]| {
        prompts::compose_prompt(prompts::base_prompt_for(agent), &binding.schemas(), peers)
    };

    SwarmBuilder::new()
        .agent(
            "planner",
            compose(
                "planner",
                &planner,
                &["reconnaissance", "initial_access", "summary"],
            ),
            planner.clone(),
        )
        .agent(
            "reconnaissance",
            compose(
                "reconnaissance",
                &recon,
                &["planner", "initial_access", "summary"],
            ),
            recon.clone(),
        )
        .agent(
            "initial_access",
            compose(
                "initial_access",
                &initial_access,
                &["planner", "reconnaissance", "summary"],
            ),
            initial_access.clone(),
        )
        .agent(
            "summary",
            compose("summary", &summary, &["planner"]),
            summary.clone(),
        )
        .default_agent(DEFAULT_AGENT)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_binding() -> ToolBinding {
        Arc::new(ToolRegistry::new()).bind(&[])
    }

    #[test]
    fn build_requires_default_agent_to_exist() {
        let result = SwarmBuilder::new()
            .agent("recon", "prompt", empty_binding())
            .default_agent("planner")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn build_rejects_handoffs_to_unknown_agents() {
        let registry = Arc::new({
            let mut r = ToolRegistry::new();
            r.register(redswarm_tools::tools::handoff::handoff_to("ghost"));
            r
        });
        let result = SwarmBuilder::new()
            .agent("planner", "prompt", registry.bind(&["handoff_to_ghost"]))
            .default_agent("planner")
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn valid_graph_builds() {
        let graph = SwarmBuilder::new()
            .agent("planner", "prompt", empty_binding())
            .agent("summary", "prompt", empty_binding())
            .default_agent("planner")
            .build()
            .unwrap();
        assert_eq!(graph.default_agent(), "planner");
        assert_eq!(graph.agent_names(), vec!["planner", "summary"]);
        assert!(graph.agent("summary").is_some());
        assert!(graph.agent("ghost").is_none());
    }
}
