//! The react loop and graph driver
//!
//! One call to `drive_turn` runs a whole user turn: the active agent calls
//! the LLM, executes any tool calls in order, and loops; a tool call that
//! resolves to a handoff directive moves the active-agent pointer and the
//! target agent resumes over the shared messages. The turn ends when the
//! active agent answers with no tool calls.

use crate::checkpoint::ThreadState;
use crate::swarm::SwarmGraph;
use redswarm_core::{stable_id, Message, ToolCall};
use redswarm_llm::{ChatMessage, CompletionToolCall, LlmError, LlmProvider, LlmRequest};
use redswarm_tools::ToolOutcome;
use serde_json::Value;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use uuid::Uuid;

/// A raw event out of the graph, before canonicalisation. The namespace is
/// `<agent>:<activation-id>`; the executor's processor extracts the agent
/// name from it.
#[derive(Clone, Debug)]
pub struct GraphEvent {
    pub namespace: String,
    pub payload: GraphPayload,
}

#[derive(Clone, Debug)]
pub enum GraphPayload {
    Assistant {
        message: Message,
    },
    ToolResult {
        message: Message,
        call: ToolCall,
        /// The shell command the call ran, for shell-backed tools.
        command: Option<String>,
        is_error: bool,
    },
}

#[derive(Debug, thiserror::Error)]
pub enum DriveError {
    #[error("unknown agent: {0}")]
    UnknownAgent(String),

    #[error("step limit exceeded after {0} steps")]
    StepLimit(u64),

    #[error("cancelled")]
    Cancelled,

    #[error(transparent)]
    Llm(#[from] LlmError),
}

/// Per-turn limits and model parameters.
#[derive(Clone, Debug)]
pub struct TurnOptions {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Hard cap on LLM calls per turn.
    pub max_steps: u64,
}

impl Default for TurnOptions {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.0,
            max_tokens: 8192,
            max_steps: 40,
        }
    }
}

/// Drive the graph for one turn, streaming raw events into `events`.
///
/// State is mutated in place; the caller decides whether to persist it.
/// A dropped receiver or a triggered token aborts the turn with
/// `DriveError::Cancelled`.
pub async fn drive_turn(
    graph: &SwarmGraph,
    provider: &Arc<dyn LlmProvider>,
    options: &TurnOptions,
    state: &mut ThreadState,
    events: mpsc::Sender<GraphEvent>,
    cancel: CancellationToken,
) -> Result<(), DriveError> {
    if state.current_agent.is_none() {
        state.current_agent = Some(graph.default_agent().to_string());
    }

    let mut llm_calls: u64 = 0;

    'routing: loop {
        let agent_name = state
            .current_agent
            .clone()
            .unwrap_or_else(|| graph.default_agent().to_string());
        let agent = graph
            .agent(&agent_name)
            .ok_or_else(|| DriveError::UnknownAgent(agent_name.clone()))?;
        let namespace = format!("{}:{}", agent.name, Uuid::new_v4().simple());
        debug!("activating agent {}", namespace);

        // React loop for this activation.
        loop {
            if cancel.is_cancelled() {
                return Err(DriveError::Cancelled);
            }
            llm_calls += 1;
            if llm_calls > options.max_steps {
                return Err(DriveError::StepLimit(options.max_steps));
            }

            let request = LlmRequest {
                model: options.model.clone(),
                system: Some(agent.system_prompt.clone()),
                messages: to_chat_messages(&state.messages),
                tools: agent.tools.schemas(),
                temperature: options.temperature,
                max_tokens: options.max_tokens,
            };
            let completion = provider.complete(request, cancel.clone()).await?;
            state.step_count += 1;

            let tool_calls: Vec<ToolCall> =
                completion.tool_calls.iter().map(to_core_tool_call).collect();
            let message = Message::assistant(
                stable_id(
                    "ai",
                    &agent.name,
                    &completion.content,
                    state.messages.len() as u64,
                ),
                &agent.name,
                &completion.content,
                tool_calls.clone(),
            );
            state.messages.push(message.clone());
            send(&events, &namespace, GraphPayload::Assistant { message }).await?;

            if tool_calls.is_empty() {
                // Final text with no tool calls: the turn is complete.
                break 'routing;
            }

            let mut handed_off = false;
            for call in tool_calls {
                if cancel.is_cancelled() {
                    return Err(DriveError::Cancelled);
                }

                let args = Value::Object(call.arguments.clone());
                let command = agent.tools.rendered_command(&call.name, &args);
                let outcome = agent.tools.invoke(&call.name, args).await;

                let (content, is_error) = match &outcome {
                    ToolOutcome::Handoff { target } => {
                        if graph.agent(target).is_none() {
                            (format!("Error: unknown agent: {}", target), true)
                        } else {
                            (outcome.to_content_string(), false)
                        }
                    }
                    other => (other.to_content_string(), other.is_error()),
                };

                let message = Message::tool_result(
                    stable_id("tool", &call.name, &content, state.messages.len() as u64),
                    &call.id,
                    &call.name,
                    &content,
                );
                // A handoff mutates the active-agent pointer atomically
                // with the insertion of its synthetic ToolResult.
                state.messages.push(message.clone());
                if let ToolOutcome::Handoff { target } = &outcome {
                    if graph.agent(target).is_some() {
                        debug!("handoff {} -> {}", agent.name, target);
                        state.current_agent = Some(target.clone());
                        handed_off = true;
                    }
                }
                send(
                    &events,
                    &namespace,
                    GraphPayload::ToolResult {
                        message,
                        call,
                        command,
                        is_error,
                    },
                )
                .await?;
            }

            if handed_off {
                // Yield control: the target agent resumes on the next
                // routing iteration with the shared messages intact.
                continue 'routing;
            }
        }
    }

    Ok(())
}

async fn send(
    events: &mpsc::Sender<GraphEvent>,
    namespace: &str,
    payload: GraphPayload,
) -> Result<(), DriveError> {
    events
        .send(GraphEvent {
            namespace: namespace.to_string(),
            payload,
        })
        .await
        .map_err(|_| DriveError::Cancelled)
}

/// Thread history → LLM wire history.
pub fn to_chat_messages(messages: &[Message]) -> Vec<ChatMessage> {
    messages
        .iter()
        .map(|message| match message {
            Message::User { content, .. } => ChatMessage::user(content.clone()),
            Message::Assistant {
                content,
                tool_calls,
                ..
            } => ChatMessage::assistant(
                content.clone(),
                tool_calls
                    .iter()
                    .map(|call| CompletionToolCall {
                        id: call.id.clone(),
                        name: call.name.clone(),
                        arguments: Value::Object(call.arguments.clone()),
                    })
                    .collect(),
            ),
            Message::ToolResult {
                tool_call_id,
                content,
                ..
            } => ChatMessage::tool(tool_call_id.clone(), content.clone()),
        })
        .collect()
}

fn to_core_tool_call(call: &CompletionToolCall) -> ToolCall {
    let arguments = match &call.arguments {
        Value::Object(map) => map.clone(),
        Value::Null => serde_json::Map::new(),
        other => {
            // A malformed arguments payload still becomes a call; the
            // registry's validation will surface it to the model.
            let mut map = serde_json::Map::new();
            map.insert("value".to_string(), other.clone());
            map
        }
    };
    ToolCall::new(call.id.clone(), call.name.clone(), arguments)
}
