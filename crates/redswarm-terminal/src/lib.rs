//! tmux-backed terminal session pool
//!
//! Persistent shells inside a long-running container, one tmux session per
//! shell, addressed by an 8-hex-character ID. `TmuxPool` drives tmux through
//! `docker exec`; `TerminalServer` exposes the pool over a tiny HTTP RPC;
//! `TerminalClient` is the matching remote implementation. Tools only ever
//! see the `TerminalExec` trait, so local and remote pools are
//! interchangeable.

pub mod client;
pub mod error;
pub mod server;
pub mod tmux;

pub use client::TerminalClient;
pub use error::{Result, TerminalError};
pub use server::{router, serve};
pub use tmux::TmuxPool;

/// The session-pool RPC surface.
#[async_trait::async_trait]
pub trait TerminalExec: Send + Sync {
    /// Create a persistent shell; returns its 8-hex session ID.
    async fn create_session(&self) -> Result<String>;

    /// IDs of all live sessions; empty when no tmux server is running.
    async fn session_list(&self) -> Result<Vec<String>>;

    /// Run `command` to completion inside the session and return the
    /// captured pane text.
    async fn command_exec(&self, session_id: &str, command: &str) -> Result<String>;

    /// Kill one session. Succeeds even if the session is already gone.
    async fn kill_session(&self, session_id: &str) -> Result<()>;

    /// Kill the tmux server, destroying every session.
    async fn kill_server(&self) -> Result<()>;
}
