//! Handoff tools — pure control transfer, no shell side effects

use crate::registry::{Tool, ToolOutcome};
use serde_json::{json, Value};

/// A tool named `handoff_to_<agent>` whose only effect is a
/// `ToolOutcome::Handoff` the graph interprets.
pub struct HandoffTool {
    name: String,
    description: String,
    target: String,
}

pub fn handoff_to(target: &str) -> HandoffTool {
    HandoffTool {
        name: format!("handoff_to_{}", target),
        description: format!(
            "Transfer control of the operation to the {} agent. \
             Use when the next step is that agent's specialty.",
            target
        ),
        target: target.to_string(),
    }
}

#[async_trait::async_trait]
impl Tool for HandoffTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "reason": {
                    "type": "string",
                    "description": "Why control is being transferred"
                }
            },
            "required": []
        })
    }

    async fn invoke(&self, _args: Value) -> ToolOutcome {
        ToolOutcome::Handoff {
            target: self.target.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn handoff_returns_directive_not_text() {
        let tool = handoff_to("reconnaissance");
        assert_eq!(tool.name(), "handoff_to_reconnaissance");
        let outcome = tool.invoke(json!({})).await;
        assert_eq!(
            outcome,
            ToolOutcome::Handoff {
                target: "reconnaissance".into()
            }
        );
    }

    #[tokio::test]
    async fn reason_is_optional() {
        let tool = handoff_to("summary");
        let outcome = tool.invoke(json!({"reason": "scan finished"})).await;
        assert!(matches!(outcome, ToolOutcome::Handoff { .. }));
    }
}
