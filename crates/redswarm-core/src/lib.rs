//! Core types for redswarm
//!
//! Everything the other crates share: the conversation trace model, the
//! UI-facing workflow event union, user/thread identity, the long-term
//! memory store, and configuration.

pub mod config;
pub mod error;
pub mod event;
pub mod identity;
pub mod message;
pub mod store;

pub use config::{EnvConfig, McpConfig, McpServerConfig, ModelConfig};
pub use error::{Error, Result};
pub use event::{MessageKind, WorkflowEvent};
pub use identity::{derive_user_id, ThreadConfig, DEFAULT_CONVERSATION};
pub use message::{stable_id, Message, ToolCall, HANDOFF_PREFIXES};
pub use store::{InMemoryStore, MemoryRecord, Namespace, Store};
