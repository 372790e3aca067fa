//! Shared plumbing for command-string tools

use crate::registry::{Tool, ToolOutcome};
use crate::tools::terminal::ShellContext;
use serde_json::{json, Value};
use std::sync::Arc;

/// Join the `options` argument, which the model may pass as a string or an
/// array of strings.
pub fn render_options(options: &Value) -> String {
    match options {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|v| v.as_str().map(String::from).unwrap_or_else(|| v.to_string()))
            .collect::<Vec<_>>()
            .join(" "),
        other => other.to_string(),
    }
}

/// A tool of the shape `<binary> <options> <target>`, the common case for
/// every recon and brute-force wrapper.
pub struct SimpleShellTool {
    name: &'static str,
    description: &'static str,
    binary: &'static str,
    target_param: &'static str,
    target_description: &'static str,
    options_description: &'static str,
    ctx: Arc<ShellContext>,
}

impl SimpleShellTool {
    pub fn new(
        name: &'static str,
        description: &'static str,
        binary: &'static str,
        target_param: &'static str,
        target_description: &'static str,
        options_description: &'static str,
        ctx: Arc<ShellContext>,
    ) -> Self {
        Self {
            name,
            description,
            binary,
            target_param,
            target_description,
            options_description,
            ctx,
        }
    }

    pub fn render_command(&self, args: &Value) -> String {
        let target = args[self.target_param].as_str().unwrap_or_default();
        let options = render_options(&args["options"]);
        format!("{} {} {}", self.binary, options, target)
    }
}

#[async_trait::async_trait]
impl Tool for SimpleShellTool {
    fn name(&self) -> &str {
        self.name
    }

    fn description(&self) -> &str {
        self.description
    }

    fn parameters(&self) -> Value {
        let mut properties = serde_json::Map::new();
        properties.insert(
            self.target_param.to_string(),
            json!({"type": "string", "description": self.target_description}),
        );
        properties.insert(
            "options".to_string(),
            json!({"type": ["string", "array"], "description": self.options_description}),
        );
        properties.insert(
            "session_id".to_string(),
            json!({
                "type": "string",
                "description": "Terminal session to run in; omit to reuse the shared session"
            }),
        );
        json!({
            "type": "object",
            "properties": properties,
            "required": [self.target_param]
        })
    }

    async fn invoke(&self, args: Value) -> ToolOutcome {
        let command = self.render_command(&args);
        self.ctx.run(args["session_id"].as_str(), &command).await
    }

    fn rendered_command(&self, args: &Value) -> Option<String> {
        Some(self.render_command(args))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn options_accept_string_or_array() {
        assert_eq!(render_options(&Value::Null), "");
        assert_eq!(render_options(&json!("-sV -p 1-1000")), "-sV -p 1-1000");
        assert_eq!(render_options(&json!(["-sV", "-p", "80"])), "-sV -p 80");
    }
}
