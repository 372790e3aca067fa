//! Remote terminal pool over the RPC wire

use crate::error::{Result, TerminalError};
use crate::server::RpcFault;
use crate::TerminalExec;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::warn;

#[derive(Deserialize)]
struct WireReply {
    result: Option<Value>,
    error: Option<RpcFault>,
}

pub struct TerminalClient {
    client: reqwest::Client,
    url: String,
}

impl TerminalClient {
    /// `url` is the full RPC endpoint, e.g. `http://localhost:3003/rpc`.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(600))
                .connect_timeout(Duration::from_secs(5))
                .build()
                .unwrap_or_default(),
            url: url.into(),
        }
    }

    async fn send(&self, method: &str, params: Value) -> std::result::Result<WireReply, reqwest::Error> {
        self.client
            .post(&self.url)
            .json(&json!({"method": method, "params": params}))
            .send()
            .await?
            .json()
            .await
    }

    /// One retry on connect/timeout failures, then `Unreachable`.
    async fn call(&self, method: &str, params: Value) -> Result<Value> {
        let reply = match self.send(method, params.clone()).await {
            Ok(reply) => reply,
            Err(e) if e.is_connect() || e.is_timeout() => {
                warn!("terminal rpc {} failed ({}), retrying once", method, e);
                self.send(method, params)
                    .await
                    .map_err(|e| TerminalError::Unreachable(e.to_string()))?
            }
            Err(e) => return Err(TerminalError::Http(e)),
        };

        if let Some(fault) = reply.error {
            return Err(TerminalError::from_wire(&fault.kind, fault.message));
        }
        reply
            .result
            .ok_or_else(|| TerminalError::Protocol("reply carried neither result nor error".into()))
    }
}

#[async_trait::async_trait]
impl TerminalExec for TerminalClient {
    async fn create_session(&self) -> Result<String> {
        let value = self.call("create_session", json!({})).await?;
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| TerminalError::Protocol("create_session returned a non-string".into()))
    }

    async fn session_list(&self) -> Result<Vec<String>> {
        let value = self.call("session_list", json!({})).await?;
        serde_json::from_value(value)
            .map_err(|e| TerminalError::Protocol(format!("bad session_list reply: {}", e)))
    }

    async fn command_exec(&self, session_id: &str, command: &str) -> Result<String> {
        let value = self
            .call(
                "command_exec",
                json!({"session_id": session_id, "command": command}),
            )
            .await?;
        value
            .as_str()
            .map(String::from)
            .ok_or_else(|| TerminalError::Protocol("command_exec returned a non-string".into()))
    }

    async fn kill_session(&self, session_id: &str) -> Result<()> {
        self.call("kill_session", json!({"session_id": session_id}))
            .await
            .map(|_| ())
    }

    async fn kill_server(&self) -> Result<()> {
        self.call("kill_server", json!({})).await.map(|_| ())
    }
}
