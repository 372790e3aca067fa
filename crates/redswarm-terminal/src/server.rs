//! HTTP RPC service exposing a terminal pool
//!
//! Wire format, one route:
//!
//!   POST /rpc  { "method": "command_exec", "params": { "session_id": "...", "command": "..." } }
//!   → { "result": "captured text" }
//!   → { "error": { "kind": "unknown_session", "message": "..." } }

use crate::error::{Result, TerminalError};
use crate::TerminalExec;
use axum::extract::State;
use axum::routing::post;
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct RpcCall {
    pub method: String,
    #[serde(default)]
    pub params: Value,
}

#[derive(Debug, Serialize)]
pub struct RpcReply {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<RpcFault>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RpcFault {
    pub kind: String,
    pub message: String,
}

impl RpcReply {
    fn ok(result: Value) -> Self {
        Self {
            result: Some(result),
            error: None,
        }
    }

    fn err(error: &TerminalError) -> Self {
        Self {
            result: None,
            error: Some(RpcFault {
                kind: error.kind().to_string(),
                message: error.to_string(),
            }),
        }
    }
}

async fn dispatch(pool: &dyn TerminalExec, call: RpcCall) -> Result<Value> {
    match call.method.as_str() {
        "create_session" => Ok(json!(pool.create_session().await?)),
        "session_list" => Ok(json!(pool.session_list().await?)),
        "command_exec" => {
            let session_id = str_param(&call.params, "session_id")?;
            let command = str_param(&call.params, "command")?;
            Ok(json!(pool.command_exec(session_id, command).await?))
        }
        "kill_session" => {
            let session_id = str_param(&call.params, "session_id")?;
            pool.kill_session(session_id).await?;
            Ok(json!(format!("Session {} killed", session_id)))
        }
        "kill_server" => {
            pool.kill_server().await?;
            Ok(json!("Server killed"))
        }
        other => Err(TerminalError::Protocol(format!("unknown method: {}", other))),
    }
}

fn str_param<'a>(params: &'a Value, name: &str) -> Result<&'a str> {
    params[name]
        .as_str()
        .ok_or_else(|| TerminalError::Protocol(format!("missing param: {}", name)))
}

async fn rpc_handler(
    State(pool): State<Arc<dyn TerminalExec>>,
    Json(call): Json<RpcCall>,
) -> Json<RpcReply> {
    match dispatch(pool.as_ref(), call).await {
        Ok(result) => Json(RpcReply::ok(result)),
        Err(error) => Json(RpcReply::err(&error)),
    }
}

pub fn router(pool: Arc<dyn TerminalExec>) -> Router {
    Router::new().route("/rpc", post(rpc_handler)).with_state(pool)
}

pub async fn serve(pool: Arc<dyn TerminalExec>, addr: SocketAddr) -> Result<()> {
    info!("terminal server listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(pool))
        .await
        .map_err(TerminalError::Io)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;

    /// Pool stub covering the dispatch surface.
    struct StubPool;

    #[async_trait::async_trait]
    impl TerminalExec for StubPool {
        async fn create_session(&self) -> Result<String> {
            Ok("ab12cd34".into())
        }
        async fn session_list(&self) -> Result<Vec<String>> {
            Ok(vec!["ab12cd34".into()])
        }
        async fn command_exec(&self, session_id: &str, command: &str) -> Result<String> {
            if session_id == "dead0000" {
                return Err(TerminalError::UnknownSession(session_id.into()));
            }
            Ok(format!("ran: {}", command))
        }
        async fn kill_session(&self, _session_id: &str) -> Result<()> {
            Ok(())
        }
        async fn kill_server(&self) -> Result<()> {
            Ok(())
        }
    }

    fn call(method: &str, params: Value) -> RpcCall {
        RpcCall {
            method: method.into(),
            params,
        }
    }

    #[tokio::test]
    async fn dispatch_round_trip() {
        let pool = StubPool;
        let result = dispatch(&pool, call("create_session", json!({}))).await.unwrap();
        assert_eq!(result, json!("ab12cd34"));

        let result = dispatch(
            &pool,
            call(
                "command_exec",
                json!({"session_id": "ab12cd34", "command": "ls"}),
            ),
        )
        .await
        .unwrap();
        assert_eq!(result, json!("ran: ls"));
    }

    #[tokio::test]
    async fn dispatch_surfaces_typed_errors() {
        let pool = StubPool;
        let error = dispatch(
            &pool,
            call(
                "command_exec",
                json!({"session_id": "dead0000", "command": "ls"}),
            ),
        )
        .await
        .unwrap_err();
        assert_eq!(error.kind(), "unknown_session");

        let error = dispatch(&pool, call("command_exec", json!({}))).await.unwrap_err();
        assert_eq!(error.kind(), "protocol");

        let error = dispatch(&pool, call("no_such_method", json!({}))).await.unwrap_err();
        assert_eq!(error.kind(), "protocol");
    }
}
