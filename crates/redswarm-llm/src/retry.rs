//! Bounded retry for transient upstream failures

use crate::provider::{LlmError, LlmResult};
use crate::types::LlmCompletion;
use std::future::Future;
use std::time::Duration;
use tracing::warn;

const DEFAULT_BACKOFF_MS: u64 = 2_000;

/// Run `attempt` and retry exactly once on a transient error (429/5xx or a
/// connect/timeout failure). Rate-limit responses use the server-suggested
/// delay, capped at 30s.
pub async fn with_transient_retry<F, Fut>(mut attempt: F) -> LlmResult<LlmCompletion>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = LlmResult<LlmCompletion>>,
{
    match attempt().await {
        Err(err) if err.is_transient() => {
            let backoff = match &err {
                LlmError::RateLimited { retry_after_ms } => (*retry_after_ms).min(30_000),
                _ => DEFAULT_BACKOFF_MS,
            };
            warn!("transient LLM error ({}), retrying in {}ms", err, backoff);
            tokio::time::sleep(Duration::from_millis(backoff)).await;
            attempt().await
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn retries_once_on_transient() {
        let calls = AtomicUsize::new(0);
        let result = with_transient_retry(|| {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(LlmError::ServerError {
                        status: 503,
                        message: "overloaded".into(),
                    })
                } else {
                    Ok(LlmCompletion::text("ok"))
                }
            }
        })
        .await;
        assert_eq!(result.unwrap().content, "ok");
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn does_not_retry_fatal_errors() {
        let calls = AtomicUsize::new(0);
        let result = with_transient_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(LlmError::AuthFailed("bad key".into())) }
        })
        .await;
        assert!(matches!(result, Err(LlmError::AuthFailed(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn gives_up_after_second_transient_failure() {
        let calls = AtomicUsize::new(0);
        let result = with_transient_retry(|| {
            calls.fetch_add(1, Ordering::SeqCst);
            async {
                Err(LlmError::RateLimited { retry_after_ms: 1 })
            }
        })
        .await;
        assert!(matches!(result, Err(LlmError::RateLimited { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }
}
