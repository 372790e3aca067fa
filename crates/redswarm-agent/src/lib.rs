//! Agent graph and workflow executor
//!
//! A swarm of specialised agents shares one conversation. The active agent
//! runs a react loop (LLM call → tool execution → loop); a handoff tool
//! call moves the active-agent pointer and the next agent resumes over the
//! same messages. The executor drives one user turn through the graph and
//! streams canonicalised events to the consumer while journaling them.

pub mod checkpoint;
pub mod executor;
pub mod mock;
pub mod processor;
pub mod prompts;
pub mod react;
pub mod swarm;

pub use checkpoint::{Checkpointer, InMemoryCheckpointer, ThreadState};
pub use executor::{ExecutorConfig, WorkflowExecutor};
pub use react::{DriveError, GraphEvent, GraphPayload};
pub use swarm::{build_default_swarm, AgentSpec, SwarmBuilder, SwarmGraph, DEFAULT_AGENT};
