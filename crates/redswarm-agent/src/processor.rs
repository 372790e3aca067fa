//! Message processor — pure functions from raw graph events to UI records

use redswarm_core::{WorkflowEvent, HANDOFF_PREFIXES};

/// Extract the agent name from a `<agent>:<id>` namespace string.
pub fn agent_name_from_namespace(namespace: &str) -> &str {
    match namespace.split(':').next() {
        Some(name) if !name.is_empty() => name,
        _ => "Unknown",
    }
}

/// Human-readable label for a snake_case tool name.
///
/// Handoff names keep their verb: `transfer_to_planner` → "Transfer to
/// Planner", `handoff_to_initial_access` → "Handoff to Initial Access".
/// Everything else is title-cased: `search_memory` → "Search Memory".
pub fn parse_tool_name(tool_name: &str) -> String {
    for prefix in HANDOFF_PREFIXES {
        if let Some(target) = tool_name.strip_prefix(prefix) {
            let verb = if prefix.starts_with("transfer") {
                "Transfer to"
            } else {
                "Handoff to"
            };
            return format!("{} {}", verb, title_case(target));
        }
    }
    title_case(tool_name)
}

fn title_case(snake: &str) -> String {
    snake
        .split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Duplicate check: exact ID match, or the same (agent, kind, content)
/// tuple from an earlier event.
pub fn is_duplicate(new_event: &WorkflowEvent, existing: &[WorkflowEvent]) -> bool {
    let WorkflowEvent::Message {
        id,
        message_type,
        agent_name,
        content,
        ..
    } = new_event
    else {
        return false;
    };

    existing.iter().any(|event| match event {
        WorkflowEvent::Message {
            id: seen_id,
            message_type: seen_type,
            agent_name: seen_agent,
            content: seen_content,
            ..
        } => {
            seen_id == id
                || (seen_agent == agent_name
                    && seen_type == message_type
                    && seen_content == content)
        }
        _ => false,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use redswarm_core::MessageKind;

    fn message(id: &str, agent: &str, content: &str) -> WorkflowEvent {
        WorkflowEvent::Message {
            id: id.into(),
            message_type: MessageKind::Ai,
            agent_name: agent.into(),
            content: content.into(),
            tool_name: None,
            tool_calls: Vec::new(),
        }
    }

    #[test]
    fn namespace_extraction() {
        assert_eq!(agent_name_from_namespace("planner:42ab"), "planner");
        assert_eq!(agent_name_from_namespace("reconnaissance"), "reconnaissance");
        assert_eq!(agent_name_from_namespace(""), "Unknown");
        assert_eq!(agent_name_from_namespace(":orphan"), "Unknown");
    }

    #[test]
    fn tool_labels() {
        assert_eq!(parse_tool_name("transfer_to_planner"), "Transfer to Planner");
        assert_eq!(
            parse_tool_name("handoff_to_initial_access"),
            "Handoff to Initial Access"
        );
        assert_eq!(parse_tool_name("search_memory"), "Search Memory");
        assert_eq!(parse_tool_name("nmap"), "Nmap");
    }

    #[test]
    fn duplicate_by_id() {
        let existing = vec![message("ai_planner_1", "planner", "hello")];
        let duplicate = message("ai_planner_1", "planner", "something else");
        assert!(is_duplicate(&duplicate, &existing));
    }

    #[test]
    fn duplicate_by_content_tuple() {
        let existing = vec![message("ai_planner_1", "planner", "hello")];
        let duplicate = message("ai_planner_other", "planner", "hello");
        assert!(is_duplicate(&duplicate, &existing));

        // same content from a different agent is not a duplicate
        let fresh = message("ai_recon_1", "reconnaissance", "hello");
        assert!(!is_duplicate(&fresh, &existing));
    }

    #[test]
    fn terminal_events_are_never_duplicates() {
        let existing = vec![message("a", "planner", "x")];
        assert!(!is_duplicate(
            &WorkflowEvent::WorkflowComplete { step_count: 1 },
            &existing
        ));
    }
}
