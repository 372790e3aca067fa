//! LLM layer: provider trait, wire types, and HTTP clients
//!
//! The orchestrator is provider-agnostic. `AnthropicProvider` speaks the
//! messages API; `OpenAiProvider` speaks the chat-completions wire and
//! covers every OpenAI-compatible backend (OpenAI, DeepSeek, Groq, Ollama)
//! through its base URL. The catalog maps a `ModelConfig` to a concrete
//! provider and checks API-key availability.

pub mod anthropic;
pub mod catalog;
pub mod openai;
pub mod provider;
pub mod retry;
pub mod types;

pub use anthropic::AnthropicProvider;
pub use catalog::{api_key_var, build_provider, list_available_models, AvailableModel};
pub use openai::OpenAiProvider;
pub use provider::{LlmError, LlmProvider, LlmResult};
pub use types::{ChatMessage, ChatRole, CompletionToolCall, LlmCompletion, LlmRequest, ToolSchema};
