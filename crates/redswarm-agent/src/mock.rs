//! Deterministic test doubles: a scripted LLM provider and an in-memory
//! terminal pool
//!
//! Used by the executor and swarm tests; kept in the library so downstream
//! crates can script end-to-end turns without network or docker.

use redswarm_llm::{CompletionToolCall, LlmCompletion, LlmError, LlmProvider, LlmRequest, LlmResult};
use redswarm_terminal::{Result as TerminalResult, TerminalError, TerminalExec};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio_util::sync::CancellationToken;

/// One canned LLM response.
#[derive(Clone, Debug)]
pub enum MockBehavior {
    /// Text-only response, terminating the react loop.
    Text(String),
    /// Tool calls with the given (name, arguments) pairs.
    ToolCalls(Vec<(String, Value)>),
    /// Text plus tool calls in one response.
    TextThenTools {
        text: String,
        tools: Vec<(String, Value)>,
    },
    /// A provider-level failure.
    Error(String),
}

/// A sequence of behaviors; each `complete` call pops the next one. When
/// the sequence is exhausted, the default behavior answers.
pub struct MockProvider {
    behaviors: Mutex<Vec<MockBehavior>>,
    default_behavior: MockBehavior,
    call_count: AtomicUsize,
}

impl MockProvider {
    pub fn constant(behavior: MockBehavior) -> Self {
        Self {
            behaviors: Mutex::new(Vec::new()),
            default_behavior: behavior,
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn sequence(behaviors: Vec<MockBehavior>) -> Self {
        Self {
            behaviors: Mutex::new(behaviors),
            default_behavior: MockBehavior::Text("(mock: sequence exhausted)".into()),
            call_count: AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }

    fn next_behavior(&self) -> (usize, MockBehavior) {
        let call = self.call_count.fetch_add(1, Ordering::SeqCst);
        let mut behaviors = match self.behaviors.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        let behavior = if behaviors.is_empty() {
            self.default_behavior.clone()
        } else {
            behaviors.remove(0)
        };
        (call, behavior)
    }
}

#[async_trait::async_trait]
impl LlmProvider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(
        &self,
        _request: LlmRequest,
        _cancel: CancellationToken,
    ) -> LlmResult<LlmCompletion> {
        let (call, behavior) = self.next_behavior();
        let tool_calls = |tools: Vec<(String, Value)>| {
            tools
                .into_iter()
                .enumerate()
                .map(|(i, (name, arguments))| CompletionToolCall {
                    id: format!("toolu_mock_{}_{}", call, i),
                    name,
                    arguments,
                })
                .collect::<Vec<_>>()
        };
        match behavior {
            MockBehavior::Text(text) => Ok(LlmCompletion::text(text)),
            MockBehavior::ToolCalls(tools) => Ok(LlmCompletion {
                content: String::new(),
                tool_calls: tool_calls(tools),
            }),
            MockBehavior::TextThenTools { text, tools } => Ok(LlmCompletion {
                content: text,
                tool_calls: tool_calls(tools),
            }),
            MockBehavior::Error(message) => Err(LlmError::RequestFailed(message)),
        }
    }
}

/// In-memory terminal pool with persistent per-session pane state:
/// each executed command appends to the pane, and `command_exec` returns
/// the whole pane, so reuse of a session shows cumulative output.
#[derive(Default)]
pub struct MockTerminal {
    counter: AtomicUsize,
    sessions: Mutex<BTreeSet<String>>,
    panes: Mutex<BTreeMap<String, String>>,
    scripted_outputs: Mutex<VecDeque<String>>,
    history: Mutex<Vec<(String, String)>>,
}

impl MockTerminal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue the output the next command will produce; defaults to
    /// `output of <command>` when the queue is empty.
    pub fn script_output(&self, output: impl Into<String>) {
        self.lock(&self.scripted_outputs).push_back(output.into());
    }

    /// Every (session, command) pair executed, in order.
    pub fn history(&self) -> Vec<(String, String)> {
        self.lock(&self.history).clone()
    }

    fn lock<'a, T>(&self, mutex: &'a Mutex<T>) -> std::sync::MutexGuard<'a, T> {
        match mutex.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait::async_trait]
impl TerminalExec for MockTerminal {
    async fn create_session(&self) -> TerminalResult<String> {
        let id = format!("{:08x}", self.counter.fetch_add(1, Ordering::SeqCst) + 1);
        self.lock(&self.sessions).insert(id.clone());
        self.lock(&self.panes).insert(id.clone(), String::new());
        Ok(id)
    }

    async fn session_list(&self) -> TerminalResult<Vec<String>> {
        Ok(self.lock(&self.sessions).iter().cloned().collect())
    }

    async fn command_exec(&self, session_id: &str, command: &str) -> TerminalResult<String> {
        if !self.lock(&self.sessions).contains(session_id) {
            return Err(TerminalError::UnknownSession(session_id.to_string()));
        }
        self.lock(&self.history)
            .push((session_id.to_string(), command.to_string()));

        let output = self
            .lock(&self.scripted_outputs)
            .pop_front()
            .unwrap_or_else(|| format!("output of {}", command));

        let mut panes = self.lock(&self.panes);
        let pane = panes.entry(session_id.to_string()).or_default();
        if !pane.is_empty() {
            pane.push('\n');
        }
        pane.push_str(&format!("$ {}\n{}", command, output));
        Ok(pane.trim().to_string())
    }

    async fn kill_session(&self, session_id: &str) -> TerminalResult<()> {
        self.lock(&self.sessions).remove(session_id);
        self.lock(&self.panes).remove(session_id);
        Ok(())
    }

    async fn kill_server(&self) -> TerminalResult<()> {
        self.lock(&self.sessions).clear();
        self.lock(&self.panes).clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn provider_sequence_then_default() {
        let provider = MockProvider::sequence(vec![
            MockBehavior::Text("first".into()),
            MockBehavior::ToolCalls(vec![("nmap".into(), json!({"target": "127.0.0.1"}))]),
        ]);
        let cancel = CancellationToken::new();

        let first = provider
            .complete(LlmRequest::default(), cancel.clone())
            .await
            .unwrap();
        assert_eq!(first.content, "first");

        let second = provider
            .complete(LlmRequest::default(), cancel.clone())
            .await
            .unwrap();
        assert_eq!(second.tool_calls.len(), 1);
        assert_eq!(second.tool_calls[0].name, "nmap");

        let third = provider
            .complete(LlmRequest::default(), cancel)
            .await
            .unwrap();
        assert!(third.content.contains("exhausted"));
        assert_eq!(provider.call_count(), 3);
    }

    #[tokio::test]
    async fn terminal_pane_accumulates_within_a_session() {
        let terminal = MockTerminal::new();
        let session = terminal.create_session().await.unwrap();

        let first = terminal.command_exec(&session, "whoami").await.unwrap();
        assert!(first.contains("$ whoami"));

        let second = terminal.command_exec(&session, "pwd").await.unwrap();
        assert!(second.contains("$ whoami"));
        assert!(second.contains("$ pwd"));

        terminal.kill_session(&session).await.unwrap();
        let error = terminal.command_exec(&session, "ls").await.unwrap_err();
        assert!(matches!(error, TerminalError::UnknownSession(_)));
    }
}
