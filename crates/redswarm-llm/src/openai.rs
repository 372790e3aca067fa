//! OpenAI-compatible chat-completions provider
//!
//! One client for every backend that speaks the chat-completions wire:
//! OpenAI itself, DeepSeek, Groq, and a local Ollama daemon, selected by
//! base URL.

use crate::provider::{LlmError, LlmProvider, LlmResult};
use crate::retry::with_transient_retry;
use crate::types::{ChatMessage, ChatRole, CompletionToolCall, LlmCompletion, LlmRequest};
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

pub struct OpenAiProvider {
    client: Client,
    name: String,
    api_key: Option<String>,
    base_url: String,
}

impl OpenAiProvider {
    pub fn new(name: impl Into<String>, api_key: Option<String>, base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            name: name.into(),
            api_key,
            base_url: base_url.into(),
        }
    }

    async fn send_once(&self, request: &LlmRequest) -> LlmResult<LlmCompletion> {
        let mut messages: Vec<Value> = Vec::new();
        if let Some(system) = &request.system {
            messages.push(json!({"role": "system", "content": system}));
        }
        for message in &request.messages {
            messages.push(convert_message(message));
        }

        let mut body = json!({
            "model": request.model,
            "messages": messages,
            "temperature": request.temperature,
            "max_tokens": request.max_tokens,
        });
        if !request.tools.is_empty() {
            let tools: Vec<Value> = request
                .tools
                .iter()
                .map(|t| {
                    json!({
                        "type": "function",
                        "function": {
                            "name": t.name,
                            "description": t.description,
                            "parameters": t.parameters,
                        }
                    })
                })
                .collect();
            body["tools"] = json!(tools);
        }

        debug!("{} request: model={}", self.name, request.model);

        let mut builder = self
            .client
            .post(format!("{}/chat/completions", self.base_url.trim_end_matches('/')))
            .header("content-type", "application/json");
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder.json(&body).send().await?;
        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("{} error {}: {}", self.name, status, error_text);
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthFailed(error_text),
                429 => LlmError::RateLimited {
                    retry_after_ms: 30_000,
                },
                s if s >= 500 => LlmError::ServerError {
                    status: s,
                    message: error_text,
                },
                s => LlmError::RequestFailed(format!("{}: {}", s, error_text)),
            });
        }

        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;
        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| LlmError::InvalidResponse("no choices in response".into()))?;

        let mut completion = LlmCompletion {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: Vec::new(),
        };
        for call in choice.message.tool_calls.unwrap_or_default() {
            // Arguments arrive as a JSON-encoded string on this wire.
            let arguments = serde_json::from_str(&call.function.arguments)
                .unwrap_or(Value::String(call.function.arguments.clone()));
            completion.tool_calls.push(CompletionToolCall {
                id: call.id,
                name: call.function.name,
                arguments,
            });
        }
        Ok(completion)
    }
}

#[async_trait::async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        &self.name
    }

    async fn complete(
        &self,
        request: LlmRequest,
        cancel: CancellationToken,
    ) -> LlmResult<LlmCompletion> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(LlmError::Cancelled),
            result = with_transient_retry(|| self.send_once(&request)) => result,
        }
    }
}

fn convert_message(message: &ChatMessage) -> Value {
    match message.role {
        ChatRole::User => json!({"role": "user", "content": message.content}),
        ChatRole::Assistant => {
            let mut value = json!({"role": "assistant", "content": message.content});
            if !message.tool_calls.is_empty() {
                let calls: Vec<Value> = message
                    .tool_calls
                    .iter()
                    .map(|c| {
                        json!({
                            "id": c.id,
                            "type": "function",
                            "function": {
                                "name": c.name,
                                "arguments": c.arguments.to_string(),
                            }
                        })
                    })
                    .collect();
                value["tool_calls"] = json!(calls);
            }
            value
        }
        ChatRole::Tool => json!({
            "role": "tool",
            "tool_call_id": message.tool_call_id,
            "content": message.content,
        }),
    }
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
    tool_calls: Option<Vec<WireToolCall>>,
}

#[derive(Deserialize)]
struct WireToolCall {
    id: String,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    arguments: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tool_message_carries_call_id() {
        let value = convert_message(&ChatMessage::tool("tc-9", "output"));
        assert_eq!(value["role"], "tool");
        assert_eq!(value["tool_call_id"], "tc-9");
    }

    #[test]
    fn assistant_tool_calls_encode_arguments_as_string() {
        let message = ChatMessage::assistant(
            "",
            vec![CompletionToolCall {
                id: "tc-1".into(),
                name: "nmap".into(),
                arguments: json!({"target": "127.0.0.1"}),
            }],
        );
        let value = convert_message(&message);
        let arguments = value["tool_calls"][0]["function"]["arguments"]
            .as_str()
            .unwrap();
        assert!(arguments.contains("127.0.0.1"));
    }
}
