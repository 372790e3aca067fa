//! Offline replay: journal → the same event stream a live turn produces
//!
//! No LLM, no tools. The emitted events are shaped exactly like live
//! executor output so a UI consumes both through one path, and
//! `agent_name` is preserved so agent-status views update as they did
//! during the live run.

use crate::event::{LoggedEventType, SessionLog};
use redswarm_core::{stable_id, MessageKind, WorkflowEvent};

pub fn replay(log: &SessionLog) -> Vec<WorkflowEvent> {
    let mut events: Vec<WorkflowEvent> = Vec::with_capacity(log.events.len() + 1);

    for (seq, logged) in log.events.iter().enumerate() {
        let seq = seq as u64;
        let event = match logged.event_type {
            LoggedEventType::UserInput => WorkflowEvent::Message {
                id: stable_id("user", "user", &logged.content, seq),
                message_type: MessageKind::User,
                agent_name: "user".to_string(),
                content: logged.content.clone(),
                tool_name: None,
                tool_calls: Vec::new(),
            },
            LoggedEventType::AgentResponse => {
                let agent = logged.agent_name.clone().unwrap_or_else(|| "agent".into());
                WorkflowEvent::Message {
                    id: stable_id("ai", &agent, &logged.content, seq),
                    message_type: MessageKind::Ai,
                    agent_name: agent,
                    content: logged.content.clone(),
                    tool_name: None,
                    tool_calls: logged.tool_calls.clone(),
                }
            }
            LoggedEventType::ToolCommand | LoggedEventType::ToolOutput => {
                let tool = logged.tool_name.clone().unwrap_or_else(|| "tool".into());
                WorkflowEvent::Message {
                    id: stable_id("tool", &tool, &logged.content, seq),
                    message_type: MessageKind::Tool,
                    agent_name: tool.clone(),
                    content: logged.content.clone(),
                    tool_name: Some(tool),
                    tool_calls: Vec::new(),
                }
            }
        };
        events.push(event);
    }

    events.push(WorkflowEvent::WorkflowComplete {
        step_count: log.events.len() as u64,
    });
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::LoggedEvent;

    fn sample_log() -> SessionLog {
        let mut log = SessionLog::new("s-1", Some("Claude Sonnet 4".into()));
        log.events.push(LoggedEvent::user_input("Scan 127.0.0.1 with nmap"));
        log.events
            .push(LoggedEvent::agent_response("planner", "delegating", Vec::new()));
        log.events
            .push(LoggedEvent::agent_response("reconnaissance", "scanning", Vec::new()));
        log.events.push(LoggedEvent::tool_command("nmap", "nmap  127.0.0.1"));
        log.events.push(LoggedEvent::tool_output("nmap", "22/tcp open"));
        log
    }

    #[test]
    fn replay_preserves_order_and_fields() {
        let log = sample_log();
        let events = replay(&log);
        assert_eq!(events.len(), 6);

        match &events[0] {
            WorkflowEvent::Message {
                message_type,
                content,
                ..
            } => {
                assert_eq!(*message_type, MessageKind::User);
                assert_eq!(content, "Scan 127.0.0.1 with nmap");
            }
            other => panic!("expected message, got {:?}", other),
        }

        match &events[2] {
            WorkflowEvent::Message {
                message_type,
                agent_name,
                ..
            } => {
                assert_eq!(*message_type, MessageKind::Ai);
                assert_eq!(agent_name, "reconnaissance");
            }
            other => panic!("expected message, got {:?}", other),
        }

        match &events[3] {
            WorkflowEvent::Message {
                message_type,
                tool_name,
                content,
                ..
            } => {
                assert_eq!(*message_type, MessageKind::Tool);
                assert_eq!(tool_name.as_deref(), Some("nmap"));
                assert_eq!(content, "nmap  127.0.0.1");
            }
            other => panic!("expected message, got {:?}", other),
        }

        assert_eq!(
            events[5],
            WorkflowEvent::WorkflowComplete { step_count: 5 }
        );
    }

    #[test]
    fn replay_is_deterministic() {
        let log = sample_log();
        assert_eq!(replay(&log), replay(&log));
    }

    #[test]
    fn replay_never_calls_out() {
        // An empty log still terminates the stream properly.
        let log = SessionLog::new("empty", None);
        let events = replay(&log);
        assert_eq!(events, vec![WorkflowEvent::WorkflowComplete { step_count: 0 }]);
    }
}
