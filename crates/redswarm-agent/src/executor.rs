//! Workflow executor
//!
//! One asynchronous operation: `execute(user_input, thread) → stream of
//! WorkflowEvent`. The executor loads the thread checkpoint, appends the
//! user message, drives the graph, canonicalises and de-duplicates raw
//! events, mirrors everything UI-relevant into the session journal, and
//! persists the thread state only when the turn completes cleanly.

use crate::checkpoint::{Checkpointer, ThreadState};
use crate::processor;
use crate::react::{self, DriveError, GraphEvent, GraphPayload, TurnOptions};
use crate::swarm::SwarmGraph;
use async_stream::stream;
use futures::Stream;
use redswarm_core::{stable_id, Message, MessageKind, ThreadConfig, WorkflowEvent};
use redswarm_llm::{LlmError, LlmProvider};
use redswarm_log::SessionLogger;
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[derive(Clone, Debug)]
pub struct ExecutorConfig {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Hard cap on LLM calls per turn; overflow ends the turn with an
    /// `Error` event instead of looping forever.
    pub max_steps: u64,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            model: String::new(),
            temperature: 0.0,
            max_tokens: 8192,
            max_steps: 40,
        }
    }
}

pub struct WorkflowExecutor {
    graph: Arc<SwarmGraph>,
    provider: Arc<dyn LlmProvider>,
    checkpointer: Arc<dyn Checkpointer>,
    logger: Arc<SessionLogger>,
    config: ExecutorConfig,
}

impl WorkflowExecutor {
    pub fn new(
        graph: Arc<SwarmGraph>,
        provider: Arc<dyn LlmProvider>,
        checkpointer: Arc<dyn Checkpointer>,
        logger: Arc<SessionLogger>,
        config: ExecutorConfig,
    ) -> Self {
        Self {
            graph,
            provider,
            checkpointer,
            logger,
            config,
        }
    }

    pub fn logger(&self) -> &Arc<SessionLogger> {
        &self.logger
    }

    pub fn checkpointer(&self) -> &Arc<dyn Checkpointer> {
        &self.checkpointer
    }

    /// Run one user turn. Dropping the returned stream cancels the turn:
    /// in-flight LLM and tool work is abandoned and the previous
    /// checkpoint stays untouched.
    pub fn execute<'a>(
        &'a self,
        user_input: String,
        thread: ThreadConfig,
    ) -> impl Stream<Item = WorkflowEvent> + Send + 'a {
        stream! {
            let thread_id = thread.thread_id();

            if thread.fresh_thread {
                if let Err(e) = self.checkpointer.reset(&thread_id).await {
                    yield WorkflowEvent::error(format!("failed to reset thread: {}", e));
                    return;
                }
            }

            let mut state = match self.checkpointer.load(&thread_id).await {
                Ok(Some(state)) => state,
                Ok(None) => ThreadState::new(&thread_id),
                Err(e) => {
                    yield WorkflowEvent::error(format!("failed to load thread: {}", e));
                    return;
                }
            };

            // The user message enters the trace and the journal first.
            let user_message_id =
                stable_id("user", "user", &user_input, state.messages.len() as u64);
            state
                .messages
                .push(Message::user(&user_message_id, &user_input));
            self.logger.log_user_input(&user_input);

            let mut emitted: Vec<WorkflowEvent> = Vec::new();
            let mut step_count: u64 = 0;

            let user_event = WorkflowEvent::Message {
                id: user_message_id,
                message_type: MessageKind::User,
                agent_name: "user".to_string(),
                content: user_input.clone(),
                tool_name: None,
                tool_calls: Vec::new(),
            };
            emitted.push(user_event.clone());
            yield user_event;

            let options = TurnOptions {
                model: self.config.model.clone(),
                temperature: self.config.temperature,
                max_tokens: self.config.max_tokens,
                max_steps: self.config.max_steps,
            };
            let cancel = CancellationToken::new();

            // Drive the graph and the event pump in one future, so
            // dropping this stream drops everything in flight.
            let result: Result<(), DriveError> = {
                let (tx, mut rx) = mpsc::channel::<GraphEvent>(64);
                let drive = react::drive_turn(
                    &self.graph,
                    &self.provider,
                    &options,
                    &mut state,
                    tx,
                    cancel.clone(),
                );
                tokio::pin!(drive);

                let mut drive_result: Option<Result<(), DriveError>> = None;
                loop {
                    let next_event = tokio::select! {
                        biased;
                        maybe_raw = rx.recv() => {
                            match maybe_raw {
                                Some(raw) => {
                                    step_count += 1;
                                    let event = canonicalise(&raw);
                                    if processor::is_duplicate(&event, &emitted) {
                                        None
                                    } else {
                                        self.journal(&raw);
                                        emitted.push(event.clone());
                                        Some(event)
                                    }
                                }
                                // Channel closed: the driver is done and
                                // every buffered event is out.
                                None => break,
                            }
                        }
                        result = &mut drive, if drive_result.is_none() => {
                            drive_result = Some(result);
                            None
                        }
                    };
                    if let Some(event) = next_event {
                        yield event;
                    }
                }
                drive_result.unwrap_or(Ok(()))
            };

            match result {
                Ok(()) => {
                    yield WorkflowEvent::WorkflowComplete { step_count };
                    self.logger.save_or_warn();
                    if let Err(e) = self.checkpointer.save(state).await {
                        warn!("failed to persist thread state: {}", e);
                    }
                    info!(
                        "turn complete: thread={}, steps={}",
                        thread_id, step_count
                    );
                }
                Err(DriveError::Cancelled) | Err(DriveError::Llm(LlmError::Cancelled)) => {
                    // Consumer walked away: no Error event, no partial
                    // checkpoint.
                    info!("turn cancelled: thread={}", thread_id);
                }
                Err(e) => {
                    yield WorkflowEvent::error(e.to_string());
                    self.logger.save_or_warn();
                }
            }
        }
    }

    /// Mirror a raw event into the session journal, per the logging
    /// contract: assistant turns become `agent_response`; a shell-backed
    /// tool result becomes one `tool_command` plus one `tool_output`;
    /// other tool results log output only; handoff confirmations stay out
    /// of the journal entirely.
    fn journal(&self, raw: &GraphEvent) {
        let agent = processor::agent_name_from_namespace(&raw.namespace);
        match &raw.payload {
            GraphPayload::Assistant { message } => {
                self.logger.log_agent_response(
                    agent,
                    message.content(),
                    message.tool_calls().to_vec(),
                );
            }
            GraphPayload::ToolResult {
                message,
                call,
                command,
                ..
            } => {
                if call.is_handoff() {
                    return;
                }
                if let Some(command) = command {
                    self.logger.log_tool_command(&call.name, command);
                }
                self.logger.log_tool_output(&call.name, message.content());
            }
        }
    }
}

fn canonicalise(raw: &GraphEvent) -> WorkflowEvent {
    let agent_name = processor::agent_name_from_namespace(&raw.namespace).to_string();
    match &raw.payload {
        GraphPayload::Assistant { message } => WorkflowEvent::Message {
            id: message.id().to_string(),
            message_type: MessageKind::Ai,
            agent_name,
            content: message.content().to_string(),
            tool_name: None,
            tool_calls: message.tool_calls().to_vec(),
        },
        GraphPayload::ToolResult { message, call, .. } => WorkflowEvent::Message {
            id: message.id().to_string(),
            message_type: MessageKind::Tool,
            agent_name,
            content: message.content().to_string(),
            tool_name: Some(call.name.clone()),
            tool_calls: Vec::new(),
        },
    }
}
