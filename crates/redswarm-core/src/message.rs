//! Conversation trace model
//!
//! A thread's history is an ordered sequence of `Message` values. Every
//! `ToolResult` refers back to the `ToolCall` that produced it via
//! `tool_call_id`, so the trace stays causally consistent across turns.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};

/// Tool-name prefixes that mark a call as a control handoff rather than a
/// real tool invocation.
pub const HANDOFF_PREFIXES: [&str; 2] = ["handoff_to_", "transfer_to_"];

/// A tool call proposed by an assistant message.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolCall {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Map<String, Value>,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Map<String, Value>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }

    /// Whether this call transfers control to another agent.
    pub fn is_handoff(&self) -> bool {
        HANDOFF_PREFIXES.iter().any(|p| self.name.starts_with(p))
    }

    /// Target agent name for a handoff call, `None` for ordinary tools.
    pub fn handoff_target(&self) -> Option<&str> {
        HANDOFF_PREFIXES
            .iter()
            .find_map(|p| self.name.strip_prefix(p))
    }
}

/// One entry in a thread's message history.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Message {
    User {
        id: String,
        content: String,
    },
    Assistant {
        id: String,
        agent: String,
        content: String,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    ToolResult {
        id: String,
        tool_call_id: String,
        tool_name: String,
        content: String,
    },
}

impl Message {
    pub fn user(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self::User {
            id: id.into(),
            content: content.into(),
        }
    }

    pub fn assistant(
        id: impl Into<String>,
        agent: impl Into<String>,
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
    ) -> Self {
        Self::Assistant {
            id: id.into(),
            agent: agent.into(),
            content: content.into(),
            tool_calls,
        }
    }

    pub fn tool_result(
        id: impl Into<String>,
        tool_call_id: impl Into<String>,
        tool_name: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self::ToolResult {
            id: id.into(),
            tool_call_id: tool_call_id.into(),
            tool_name: tool_name.into(),
            content: content.into(),
        }
    }

    pub fn id(&self) -> &str {
        match self {
            Self::User { id, .. } | Self::Assistant { id, .. } | Self::ToolResult { id, .. } => id,
        }
    }

    pub fn content(&self) -> &str {
        match self {
            Self::User { content, .. }
            | Self::Assistant { content, .. }
            | Self::ToolResult { content, .. } => content,
        }
    }

    pub fn tool_calls(&self) -> &[ToolCall] {
        match self {
            Self::Assistant { tool_calls, .. } => tool_calls,
            _ => &[],
        }
    }
}

/// Deterministic message ID from the message's payload.
///
/// The ID is a function of (kind, origin, content prefix, per-turn
/// sequence number) only, so replaying the same raw events reproduces the
/// same IDs and de-duplication can be content-addressed.
pub fn stable_id(kind: &str, origin: &str, content: &str, seq: u64) -> String {
    let prefix: String = content.chars().take(100).collect();
    let mut hasher = Sha256::new();
    hasher.update(kind.as_bytes());
    hasher.update(b"|");
    hasher.update(origin.as_bytes());
    hasher.update(b"|");
    hasher.update(prefix.as_bytes());
    hasher.update(b"|");
    hasher.update(seq.to_be_bytes());
    let digest = hasher.finalize();
    format!("{}_{}_{}", kind, origin, &hex::encode(digest)[..12])
}
