//! Raw terminal access: the shared shell context and the session
//! management tools exposed to agents

use crate::registry::{Tool, ToolOutcome};
use redswarm_terminal::{TerminalError, TerminalExec};
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::debug;

const MAX_RESULT_CHARS: usize = 50_000;

/// Shared handle shell tools run through.
///
/// A tool call may pick its own `session_id`; when it does not, the context
/// lazily creates one shared session and reuses it for the rest of the
/// conversation, which is what keeps cumulative state (working directory,
/// interactive logins) across calls.
pub struct ShellContext {
    exec: Arc<dyn TerminalExec>,
    default_session: Mutex<Option<String>>,
}

impl ShellContext {
    pub fn new(exec: Arc<dyn TerminalExec>) -> Arc<Self> {
        Arc::new(Self {
            exec,
            default_session: Mutex::new(None),
        })
    }

    pub fn exec(&self) -> &Arc<dyn TerminalExec> {
        &self.exec
    }

    async fn resolve_session(&self, session_id: Option<&str>) -> Result<String, TerminalError> {
        if let Some(id) = session_id {
            return Ok(id.to_string());
        }
        let mut default = self.default_session.lock().await;
        if let Some(id) = default.as_ref() {
            return Ok(id.clone());
        }
        let id = self.exec.create_session().await?;
        debug!("created shared shell session {}", id);
        *default = Some(id.clone());
        Ok(id)
    }

    /// Run a rendered command string; failures become error content, never
    /// control flow.
    pub async fn run(&self, session_id: Option<&str>, command: &str) -> ToolOutcome {
        let session = match self.resolve_session(session_id).await {
            Ok(session) => session,
            Err(e) => return ToolOutcome::error(e.to_string()),
        };
        debug!("exec [{}]: {}", session, command);
        match self.exec.command_exec(&session, command).await {
            Ok(output) => ToolOutcome::text(truncate(output)),
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }

    /// Forget the shared session (after a kill) so the next call creates a
    /// fresh one.
    pub async fn clear_default_session(&self, session_id: &str) {
        let mut default = self.default_session.lock().await;
        if default.as_deref() == Some(session_id) {
            *default = None;
        }
    }

    pub async fn clear_all_sessions(&self) {
        *self.default_session.lock().await = None;
    }
}

fn truncate(text: String) -> String {
    if text.len() <= MAX_RESULT_CHARS {
        return text;
    }
    let cut: String = text.chars().take(MAX_RESULT_CHARS).collect();
    format!("{}...\n[truncated, {} total chars]", cut, text.len())
}

fn empty_schema() -> Value {
    json!({"type": "object", "properties": {}, "required": []})
}

fn session_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "session_id": {"type": "string", "description": "Session ID"}
        },
        "required": ["session_id"]
    })
}

/// Execute an arbitrary command in a chosen session.
pub struct CommandExecTool {
    ctx: Arc<ShellContext>,
}

impl CommandExecTool {
    pub fn new(ctx: Arc<ShellContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for CommandExecTool {
    fn name(&self) -> &str {
        "command_exec"
    }

    fn description(&self) -> &str {
        "Execute a command in a terminal session and return the captured output"
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "session_id": {"type": "string", "description": "Session ID"},
                "command": {"type": "string", "description": "Command to execute"}
            },
            "required": ["session_id", "command"]
        })
    }

    async fn invoke(&self, args: Value) -> ToolOutcome {
        let session_id = args["session_id"].as_str().unwrap_or_default();
        let command = args["command"].as_str().unwrap_or_default();
        self.ctx.run(Some(session_id), command).await
    }

    fn rendered_command(&self, args: &Value) -> Option<String> {
        args["command"].as_str().map(String::from)
    }
}

/// Create a new persistent terminal session.
pub struct CreateSessionTool {
    ctx: Arc<ShellContext>,
}

impl CreateSessionTool {
    pub fn new(ctx: Arc<ShellContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for CreateSessionTool {
    fn name(&self) -> &str {
        "terminal_create_session"
    }

    fn description(&self) -> &str {
        "Create a new terminal session; returns its session ID"
    }

    fn parameters(&self) -> Value {
        empty_schema()
    }

    async fn invoke(&self, _args: Value) -> ToolOutcome {
        match self.ctx.exec().create_session().await {
            Ok(id) => ToolOutcome::text(id),
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }
}

/// List all active sessions.
pub struct SessionListTool {
    ctx: Arc<ShellContext>,
}

impl SessionListTool {
    pub fn new(ctx: Arc<ShellContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for SessionListTool {
    fn name(&self) -> &str {
        "terminal_session_list"
    }

    fn description(&self) -> &str {
        "List all active terminal sessions"
    }

    fn parameters(&self) -> Value {
        empty_schema()
    }

    async fn invoke(&self, _args: Value) -> ToolOutcome {
        match self.ctx.exec().session_list().await {
            Ok(sessions) if sessions.is_empty() => ToolOutcome::text("(no active sessions)"),
            Ok(sessions) => ToolOutcome::text(sessions.join("\n")),
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }
}

/// Kill one session; succeeds even if it is already gone.
pub struct KillSessionTool {
    ctx: Arc<ShellContext>,
}

impl KillSessionTool {
    pub fn new(ctx: Arc<ShellContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for KillSessionTool {
    fn name(&self) -> &str {
        "terminal_kill_session"
    }

    fn description(&self) -> &str {
        "Kill a terminal session"
    }

    fn parameters(&self) -> Value {
        session_schema()
    }

    async fn invoke(&self, args: Value) -> ToolOutcome {
        let session_id = args["session_id"].as_str().unwrap_or_default();
        match self.ctx.exec().kill_session(session_id).await {
            Ok(()) => {
                self.ctx.clear_default_session(session_id).await;
                ToolOutcome::text(format!("Session {} killed", session_id))
            }
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }
}

/// Kill the terminal server and every session with it.
pub struct KillServerTool {
    ctx: Arc<ShellContext>,
}

impl KillServerTool {
    pub fn new(ctx: Arc<ShellContext>) -> Self {
        Self { ctx }
    }
}

#[async_trait::async_trait]
impl Tool for KillServerTool {
    fn name(&self) -> &str {
        "terminal_kill_server"
    }

    fn description(&self) -> &str {
        "Kill the terminal server, destroying all sessions"
    }

    fn parameters(&self) -> Value {
        empty_schema()
    }

    async fn invoke(&self, _args: Value) -> ToolOutcome {
        match self.ctx.exec().kill_server().await {
            Ok(()) => {
                self.ctx.clear_all_sessions().await;
                ToolOutcome::text("Server killed")
            }
            Err(e) => ToolOutcome::error(e.to_string()),
        }
    }
}
