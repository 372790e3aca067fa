//! LLM Provider trait

use crate::types::{LlmCompletion, LlmRequest};
use tokio_util::sync::CancellationToken;

/// Result type for LLM operations
pub type LlmResult<T> = Result<T, LlmError>;

/// LLM error types
#[derive(Debug, thiserror::Error)]
pub enum LlmError {
    #[error("request failed: {0}")]
    RequestFailed(String),

    #[error("authentication failed: {0}")]
    AuthFailed(String),

    #[error("rate limited: retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    #[error("upstream error {status}: {message}")]
    ServerError { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),

    #[error("cancelled")]
    Cancelled,

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl LlmError {
    /// Whether a bounded retry is worth attempting.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RateLimited { .. } | Self::ServerError { .. }
        ) || matches!(self, Self::Network(e) if e.is_timeout() || e.is_connect())
    }
}

/// LLM Provider trait
#[async_trait::async_trait]
pub trait LlmProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Run one completion. If `cancel` is triggered the in-flight HTTP
    /// request is dropped and the call returns `LlmError::Cancelled`.
    async fn complete(
        &self,
        request: LlmRequest,
        cancel: CancellationToken,
    ) -> LlmResult<LlmCompletion>;
}
