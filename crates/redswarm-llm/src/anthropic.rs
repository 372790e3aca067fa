//! Anthropic Claude API provider

use crate::provider::{LlmError, LlmProvider, LlmResult};
use crate::retry::with_transient_retry;
use crate::types::{ChatMessage, ChatRole, CompletionToolCall, LlmCompletion, LlmRequest, ToolSchema};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

const ANTHROPIC_API_URL: &str = "https://api.anthropic.com/v1/messages";
const ANTHROPIC_VERSION: &str = "2023-06-01";

pub struct AnthropicProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl AnthropicProvider {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: ANTHROPIC_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    async fn send_once(&self, request: &LlmRequest) -> LlmResult<LlmCompletion> {
        let body = AnthropicRequest {
            model: request.model.clone(),
            messages: convert_messages(&request.messages),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            system: request.system.clone(),
            tools: if request.tools.is_empty() {
                None
            } else {
                Some(request.tools.iter().map(AnthropicTool::from).collect())
            },
        };

        debug!("anthropic request: model={}", body.model);

        let response = self
            .client
            .post(&self.base_url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            error!("anthropic error {}: {}", status, error_text);
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthFailed(error_text),
                429 => LlmError::RateLimited {
                    retry_after_ms: 60_000,
                },
                s if s >= 500 => LlmError::ServerError {
                    status: s,
                    message: error_text,
                },
                s => LlmError::RequestFailed(format!("{}: {}", s, error_text)),
            });
        }

        let parsed: AnthropicResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let mut completion = LlmCompletion::default();
        for block in parsed.content {
            match block {
                ResponseBlock::Text { text } => completion.content.push_str(&text),
                ResponseBlock::ToolUse { id, name, input } => {
                    completion.tool_calls.push(CompletionToolCall {
                        id,
                        name,
                        arguments: input,
                    });
                }
            }
        }
        Ok(completion)
    }
}

#[async_trait::async_trait]
impl LlmProvider for AnthropicProvider {
    fn name(&self) -> &str {
        "anthropic"
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

/// Map the role-typed history to Anthropic's user/assistant block wire.
///
/// Consecutive tool results must land in a single user message; the API
/// rejects a turn whose tool_results are split across messages.
fn convert_messages(messages: &[ChatMessage]) -> Vec<AnthropicMessage> {
    let mut out: Vec<AnthropicMessage> = Vec::new();

    for message in messages {
        match message.role {
            ChatRole::User => out.push(AnthropicMessage {
                role: "user",
                content: serde_json::json!(message.content),
            }),
            ChatRole::Assistant => {
                let mut blocks = Vec::new();
                if !message.content.is_empty() {
                    blocks.push(serde_json::json!({"type": "text", "text": message.content}));
                }
                for call in &message.tool_calls {
                    blocks.push(serde_json::json!({
                        "type": "tool_use",
                        "id": call.id,
                        "name": call.name,
                        "input": call.arguments,
                    }));
                }
                out.push(AnthropicMessage {
                    role: "assistant",
                    content: serde_json::json!(blocks),
                });
            }
            ChatRole::Tool => {
                let block = serde_json::json!({
                    "type": "tool_result",
                    "tool_use_id": message.tool_call_id,
                    "content": message.content,
                });
                let appended = match out.last_mut() {
                    Some(last) if last.role == "user" && last.content.is_array() => {
                        if let Some(items) = last.content.as_array_mut() {
                            items.push(block.clone());
                            true
                        } else {
                            false
                        }
                    }
                    _ => false,
                };
                if !appended {
                    out.push(AnthropicMessage {
                        role: "user",
                        content: serde_json::json!([block]),
                    });
                }
            }
        }
    }

    out
}

#[derive(Serialize)]
struct AnthropicRequest {
    model: String,
    messages: Vec<AnthropicMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<AnthropicTool>>,
}

#[derive(Serialize)]
struct AnthropicMessage {
    role: &'static str,
    content: serde_json::Value,
}

#[derive(Serialize)]
struct AnthropicTool {
    name: String,
    description: String,
    input_schema: serde_json::Value,
}

impl From<&ToolSchema> for AnthropicTool {
    fn from(schema: &ToolSchema) -> Self {
        Self {
            name: schema.name.clone(),
            description: schema.description.clone(),
            input_schema: schema.parameters.clone(),
        }
    }
}

#[derive(Deserialize)]
struct AnthropicResponse {
    content: Vec<ResponseBlock>,
}

#[derive(Deserialize)]
#[serde(tag = "type")]
enum ResponseBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn tool_results_collapse_into_one_user_message() {
        let messages = vec![
            ChatMessage::user("scan it"),
            ChatMessage::assistant(
                "",
                vec![
                    CompletionToolCall {
                        id: "tc-1".into(),
                        name: "nmap".into(),
                        arguments: json!({"target": "127.0.0.1"}),
                    },
                    CompletionToolCall {
                        id: "tc-2".into(),
                        name: "whois".into(),
                        arguments: json!({"target": "example.com"}),
                    },
                ],
            ),
            ChatMessage::tool("tc-1", "nmap output"),
            ChatMessage::tool("tc-2", "whois output"),
        ];

        let converted = convert_messages(&messages);
        assert_eq!(converted.len(), 3);
        assert_eq!(converted[2].role, "user");
        assert_eq!(converted[2].content.as_array().unwrap().len(), 2);
    }

    #[test]
    fn assistant_text_becomes_text_block() {
        let converted = convert_messages(&[ChatMessage::assistant("done", Vec::new())]);
        assert_eq!(converted.len(), 1);
        let blocks = converted[0].content.as_array().unwrap();
        assert_eq!(blocks[0]["type"], "text");
        assert_eq!(blocks[0]["text"], "done");
    }
}
