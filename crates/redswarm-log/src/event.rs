//! Journal event model

use chrono::{DateTime, Utc};
use redswarm_core::ToolCall;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LoggedEventType {
    UserInput,
    AgentResponse,
    ToolCommand,
    ToolOutput,
}

/// The minimum an event needs for faithful replay: its type, when it
/// happened, its text, and who/what produced it.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct LoggedEvent {
    pub event_type: LoggedEventType,
    pub timestamp: DateTime<Utc>,
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub agent_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
}

impl LoggedEvent {
    fn now(event_type: LoggedEventType, content: impl Into<String>) -> Self {
        Self {
            event_type,
            timestamp: Utc::now(),
            content: content.into(),
            agent_name: None,
            tool_name: None,
            tool_calls: Vec::new(),
        }
    }

    pub fn user_input(content: impl Into<String>) -> Self {
        Self::now(LoggedEventType::UserInput, content)
    }

    pub fn agent_response(
        agent_name: impl Into<String>,
        content: impl Into<String>,
        tool_calls: Vec<ToolCall>,
    ) -> Self {
        Self {
            agent_name: Some(agent_name.into()),
            tool_calls,
            ..Self::now(LoggedEventType::AgentResponse, content)
        }
    }

    pub fn tool_command(tool_name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            tool_name: Some(tool_name.into()),
            ..Self::now(LoggedEventType::ToolCommand, command)
        }
    }

    pub fn tool_output(tool_name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            tool_name: Some(tool_name.into()),
            ..Self::now(LoggedEventType::ToolOutput, output)
        }
    }
}

/// One journal per logical conversation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SessionLog {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub events: Vec<LoggedEvent>,
}

impl SessionLog {
    pub fn new(session_id: impl Into<String>, model: Option<String>) -> Self {
        Self {
            session_id: session_id.into(),
            start_time: Utc::now(),
            model,
            events: Vec::new(),
        }
    }

    /// First user input, truncated for listings.
    pub fn preview(&self, max_chars: usize) -> String {
        for event in &self.events {
            if event.event_type == LoggedEventType::UserInput {
                let truncated: String = event.content.chars().take(max_chars).collect();
                if truncated.len() < event.content.len() {
                    return format!("{}...", truncated);
                }
                return truncated;
            }
        }
        "No user input found".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_format_matches_layout() {
        let mut log = SessionLog::new("abc-123", Some("Claude Sonnet 4".into()));
        log.events.push(LoggedEvent::user_input("scan the host"));
        log.events
            .push(LoggedEvent::agent_response("planner", "on it", Vec::new()));
        log.events.push(LoggedEvent::tool_command("nmap", "nmap  127.0.0.1"));
        log.events.push(LoggedEvent::tool_output("nmap", "80/tcp open"));

        let value = serde_json::to_value(&log).unwrap();
        assert_eq!(value["session_id"], "abc-123");
        assert_eq!(value["model"], "Claude Sonnet 4");
        assert_eq!(value["events"][0]["event_type"], "user_input");
        assert_eq!(value["events"][1]["event_type"], "agent_response");
        assert_eq!(value["events"][1]["agent_name"], "planner");
        assert_eq!(value["events"][2]["event_type"], "tool_command");
        assert_eq!(value["events"][3]["tool_name"], "nmap");
        // absent fields stay off the wire
        assert!(value["events"][0].get("agent_name").is_none());

        let back: SessionLog = serde_json::from_value(value).unwrap();
        assert_eq!(back, log);
    }

    #[test]
    fn preview_truncates_first_user_input() {
        let mut log = SessionLog::new("abc", None);
        log.events.push(LoggedEvent::tool_output("nmap", "noise"));
        log.events.push(LoggedEvent::user_input("a".repeat(200)));
        let preview = log.preview(100);
        assert_eq!(preview.len(), 103);
        assert!(preview.ends_with("..."));
    }

    #[test]
    fn preview_without_user_input() {
        let log = SessionLog::new("abc", None);
        assert_eq!(log.preview(100), "No user input found");
    }
}
