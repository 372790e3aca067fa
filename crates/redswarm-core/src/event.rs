//! Workflow events
//!
//! The single event union consumed by every UI path. Live turns and log
//! replay both emit `WorkflowEvent`, so a consumer cannot tell them apart.

use crate::message::ToolCall;
use serde::{Deserialize, Serialize};

/// UI-facing message classification.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Ai,
    Tool,
    User,
}

impl std::fmt::Display for MessageKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ai => write!(f, "ai"),
            Self::Tool => write!(f, "tool"),
            Self::User => write!(f, "user"),
        }
    }
}

/// One event in the linearised stream a turn produces.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkflowEvent {
    Message {
        id: String,
        message_type: MessageKind,
        agent_name: String,
        content: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        tool_name: Option<String>,
        #[serde(default, skip_serializing_if = "Vec::is_empty")]
        tool_calls: Vec<ToolCall>,
    },
    WorkflowComplete {
        step_count: u64,
    },
    Error {
        error: String,
    },
}

impl WorkflowEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::WorkflowComplete { .. } | Self::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_with_type_tag() {
        let event = WorkflowEvent::Message {
            id: "ai_planner_0".into(),
            message_type: MessageKind::Ai,
            agent_name: "planner".into(),
            content: "on it".into(),
            tool_name: None,
            tool_calls: Vec::new(),
        };
        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["type"], "message");
        assert_eq!(value["message_type"], "ai");
        assert!(value.get("tool_name").is_none());
    }

    #[test]
    fn terminal_events() {
        assert!(WorkflowEvent::WorkflowComplete { step_count: 4 }.is_terminal());
        assert!(WorkflowEvent::error("boom").is_terminal());
    }
}
