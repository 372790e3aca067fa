//! Tool trait, outcomes, registry, and per-agent bindings
//!
//! Each tool is a self-contained module implementing the Tool trait.
//! Tools can be added/removed by editing the tools/ directory and
//! create_default_registry() in lib.rs.

use redswarm_llm::ToolSchema;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;

/// What a tool invocation produced.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolOutcome {
    Text(String),
    /// Transfer control to another agent. No shell side effects.
    Handoff { target: String },
    /// A failure surfaced as content so the model can self-correct.
    Error(String),
}

impl ToolOutcome {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    pub fn error(s: impl Into<String>) -> Self {
        Self::Error(s.into())
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// The text that lands in the `ToolResult` message.
    pub fn to_content_string(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Handoff { target } => format!("Transferred to {}", target),
            Self::Error(e) => format!("Error: {}", e),
        }
    }
}

/// The Tool trait — implement this to add a new capability.
#[async_trait::async_trait]
pub trait Tool: Send + Sync {
    /// Unique tool name (e.g. "nmap", "handoff_to_summary").
    fn name(&self) -> &str;

    /// Human-readable description sent to the LLM.
    fn description(&self) -> &str;

    /// JSON Schema for the arguments object.
    fn parameters(&self) -> Value;

    /// Execute with already-validated arguments.
    async fn invoke(&self, args: Value) -> ToolOutcome;

    /// The shell command this invocation runs, for tools that run one.
    /// Drives the session journal's `tool_command` entries.
    fn rendered_command(&self, _args: &Value) -> Option<String> {
        None
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: impl Tool + 'static) {
        self.tools.insert(tool.name().to_string(), Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// Validate arguments against the tool's schema, then invoke. A missing
    /// tool or bad arguments come back as `ToolOutcome::Error`.
    pub async fn invoke(&self, name: &str, args: Value) -> ToolOutcome {
        let Some(tool) = self.tools.get(name) else {
            return ToolOutcome::error(format!("Tool not found: {}", name));
        };
        if let Err(problem) = validate_args(&tool.parameters(), &args) {
            return ToolOutcome::error(format!("invalid arguments for {}: {}", name, problem));
        }
        tool.invoke(args).await
    }

    /// Restrict visibility to `names` for one agent.
    pub fn bind(self: &Arc<Self>, names: &[&str]) -> ToolBinding {
        ToolBinding {
            registry: Arc::clone(self),
            names: names.iter().map(|n| n.to_string()).collect(),
        }
    }
}

/// A per-agent subset of the registry. The agent's LLM only ever sees the
/// bound schemas and can only invoke bound names.
#[derive(Clone)]
pub struct ToolBinding {
    registry: Arc<ToolRegistry>,
    names: Vec<String>,
}

impl ToolBinding {
    pub fn contains(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn schemas(&self) -> Vec<ToolSchema> {
        self.names
            .iter()
            .filter_map(|name| self.registry.get(name))
            .map(|tool| tool.schema())
            .collect()
    }

    pub async fn invoke(&self, name: &str, args: Value) -> ToolOutcome {
        if !self.contains(name) {
            return ToolOutcome::error(format!("Tool not available to this agent: {}", name));
        }
        self.registry.invoke(name, args).await
    }

    /// The shell command a call would run, when the tool is shell-backed.
    pub fn rendered_command(&self, name: &str, args: &Value) -> Option<String> {
        if !self.contains(name) {
            return None;
        }
        self.registry.get(name)?.rendered_command(args)
    }
}

/// Minimal schema check: the argument value must be an object, every
/// `required` property must be present, and present properties must match
/// their declared primitive type. Anything deeper is the tool's problem.
pub fn validate_args(schema: &Value, args: &Value) -> Result<(), String> {
    let Some(args_obj) = args.as_object() else {
        return Err("arguments must be a JSON object".to_string());
    };

    if let Some(required) = schema["required"].as_array() {
        for name in required.iter().filter_map(|v| v.as_str()) {
            if !args_obj.contains_key(name) {
                return Err(format!("missing required parameter: {}", name));
            }
        }
    }

    if let Some(properties) = schema["properties"].as_object() {
        for (name, value) in args_obj {
            let Some(spec) = properties.get(name) else {
                return Err(format!("unknown parameter: {}", name));
            };
            if !type_matches(spec, value) {
                return Err(format!(
                    "parameter {} has wrong type (expected {})",
                    name,
                    describe_type(spec)
                ));
            }
        }
    }

    Ok(())
}

fn type_matches(spec: &Value, value: &Value) -> bool {
    let accepted: Vec<&str> = match &spec["type"] {
        Value::String(t) => vec![t.as_str()],
        Value::Array(types) => types.iter().filter_map(|t| t.as_str()).collect(),
        _ => return true,
    };
    accepted.iter().any(|t| match *t {
        "string" => value.is_string(),
        "integer" => value.is_i64() || value.is_u64(),
        "number" => value.is_number(),
        "boolean" => value.is_boolean(),
        "array" => value.is_array(),
        "object" => value.is_object(),
        "null" => value.is_null(),
        _ => true,
    })
}

fn describe_type(spec: &Value) -> String {
    match &spec["type"] {
        Value::String(t) => t.clone(),
        Value::Array(types) => types
            .iter()
            .filter_map(|t| t.as_str())
            .collect::<Vec<_>>()
            .join(" or "),
        _ => "any".to_string(),
    }
}
