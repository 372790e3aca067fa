//! redswarm tools — registry and tool implementations
//!
//! Three tool classes share one trait: shell tools that render a command
//! string and run it in a terminal session, handoff tools that move control
//! between agents, and memory tools that read/write the per-user store.

pub mod registry;
pub mod tools;

pub use registry::{Tool, ToolBinding, ToolOutcome, ToolRegistry};
pub use tools::terminal::ShellContext;

use redswarm_core::{Namespace, Store};
use redswarm_terminal::TerminalExec;
use std::sync::Arc;

/// Build the full registry for a swarm.
///
/// Registers every shell, terminal-management, and memory tool plus one
/// handoff tool per agent in `agents`. Per-agent visibility is applied
/// later via `ToolRegistry::bind`.
pub fn create_default_registry(
    exec: Arc<dyn TerminalExec>,
    store: Arc<dyn Store>,
    namespace: Namespace,
    agents: &[&str],
) -> ToolRegistry {
    let mut registry = ToolRegistry::new();
    let shell = ShellContext::new(exec);

    // --- Reconnaissance ---
    registry.register(tools::recon::nmap(shell.clone()));
    registry.register(tools::recon::curl(shell.clone()));
    registry.register(tools::recon::dig(shell.clone()));
    registry.register(tools::recon::whois(shell.clone()));

    // --- Initial access ---
    registry.register(tools::access::hydra(shell.clone()));
    registry.register(tools::access::searchsploit(shell.clone()));
    registry.register(tools::access::SshpassTool::new(shell.clone()));

    // --- Raw terminal management ---
    registry.register(tools::terminal::CommandExecTool::new(shell.clone()));
    registry.register(tools::terminal::CreateSessionTool::new(shell.clone()));
    registry.register(tools::terminal::SessionListTool::new(shell.clone()));
    registry.register(tools::terminal::KillSessionTool::new(shell.clone()));
    registry.register(tools::terminal::KillServerTool::new(shell));

    // --- Memory ---
    registry.register(tools::memory::ManageMemoryTool::new(
        store.clone(),
        namespace.clone(),
    ));
    registry.register(tools::memory::SearchMemoryTool::new(store, namespace));

    // --- Handoffs ---
    for agent in agents {
        registry.register(tools::handoff::handoff_to(agent));
    }

    registry
}
