//! Local tmux pool driven through `docker exec`

use crate::error::{Result, TerminalError};
use crate::TerminalExec;
use dashmap::DashMap;
use std::sync::Arc;
use tokio::process::Command;
use tokio::sync::{Mutex, OnceCell};
use tracing::{debug, warn};
use uuid::Uuid;

const CREATE_ATTEMPTS: usize = 4;

/// Session pool over tmux inside one container.
///
/// `command_exec` against the same session serialises on a per-session
/// mutex; different sessions run in parallel.
pub struct TmuxPool {
    container: String,
    preflight: OnceCell<()>,
    session_locks: DashMap<String, Arc<Mutex<()>>>,
}

impl TmuxPool {
    pub fn new(container: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            preflight: OnceCell::new(),
            session_locks: DashMap::new(),
        }
    }

    async fn run_docker(&self, args: &[&str]) -> Result<std::process::Output> {
        Ok(Command::new("docker").args(args).output().await?)
    }

    /// Run a tmux command inside the container, mapping non-zero exits to
    /// the stderr tail.
    async fn run_tmux(&self, args: &[&str]) -> Result<String> {
        self.ensure_container().await?;

        let mut full: Vec<&str> = vec!["exec", &self.container, "tmux"];
        full.extend_from_slice(args);

        let output = self.run_docker(&full).await?;
        if output.status.success() {
            Ok(String::from_utf8_lossy(&output.stdout).to_string())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(TerminalError::Tmux(tail(&stderr, 500)))
        }
    }

    /// Check that docker is usable and the container is running, starting
    /// it if it exists but is stopped. Runs once per pool.
    async fn ensure_container(&self) -> Result<()> {
        self.preflight
            .get_or_try_init(|| async {
                let ps = self.run_docker(&["ps"]).await?;
                if !ps.status.success() {
                    return Err(TerminalError::Docker(format!(
                        "docker is not available: {}",
                        tail(&String::from_utf8_lossy(&ps.stderr), 200)
                    )));
                }

                let filter = format!("name={}", self.container);
                let all = self.run_docker(&["ps", "-a", "--filter", &filter]).await?;
                let all_out = String::from_utf8_lossy(&all.stdout).to_string();
                if !all_out.contains(&self.container) {
                    return Err(TerminalError::Docker(format!(
                        "container '{}' does not exist",
                        self.container
                    )));
                }

                let running = self.run_docker(&["ps", "--filter", &filter]).await?;
                let running_out = String::from_utf8_lossy(&running.stdout).to_string();
                if !running_out.contains(&self.container) {
                    debug!("starting stopped container {}", self.container);
                    let started = self.run_docker(&["start", &self.container]).await?;
                    if !started.status.success() {
                        return Err(TerminalError::Docker(format!(
                            "failed to start container '{}': {}",
                            self.container,
                            tail(&String::from_utf8_lossy(&started.stderr), 200)
                        )));
                    }
                }
                Ok(())
            })
            .await
            .map(|_| ())
    }

    async fn session_exists(&self, session_id: &str) -> bool {
        self.run_tmux(&["has-session", "-t", session_id]).await.is_ok()
    }

    fn lock_for(&self, session_id: &str) -> Arc<Mutex<()>> {
        self.session_locks
            .entry(session_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

#[async_trait::async_trait]
impl TerminalExec for TmuxPool {
    async fn create_session(&self) -> Result<String> {
        for _ in 0..CREATE_ATTEMPTS {
            let session_id = new_session_id();
            if self.session_exists(&session_id).await {
                continue;
            }
            return match self.run_tmux(&["new-session", "-d", "-s", &session_id]).await {
                Ok(_) => {
                    debug!("created session {}", session_id);
                    Ok(session_id)
                }
                Err(TerminalError::Tmux(stderr)) => Err(TerminalError::SessionCreate(stderr)),
                Err(e) => Err(e),
            };
        }
        Err(TerminalError::SessionCreate(
            "could not allocate a unique session id".into(),
        ))
    }

    async fn session_list(&self) -> Result<Vec<String>> {
        match self
            .run_tmux(&["list-sessions", "-F", "#{session_name}"])
            .await
        {
            Ok(output) => Ok(output
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty())
                .map(String::from)
                .collect()),
            Err(TerminalError::Tmux(e)) if e.contains("no server running") => Ok(Vec::new()),
            Err(e) => Err(e),
        }
    }

    async fn command_exec(&self, session_id: &str, command: &str) -> Result<String> {
        if !self.session_exists(session_id).await {
            return Err(TerminalError::UnknownSession(session_id.to_string()));
        }

        let lock = self.lock_for(session_id);
        let _guard = lock.lock().await;

        let channel = wait_channel(session_id);
        let full_command = wrap_command(command, session_id);

        self.run_tmux(&["send-keys", "-t", session_id, &full_command, "Enter"])
            .await?;

        // Blocks until the subshell signals the channel, i.e. strictly
        // after `command` returned, whatever its exit status.
        self.run_tmux(&["wait-for", &channel]).await?;

        let captured = self
            .run_tmux(&["capture-pane", "-t", session_id, "-p"])
            .await?;
        Ok(captured.trim().to_string())
    }

    async fn kill_session(&self, session_id: &str) -> Result<()> {
        if let Err(e) = self.run_tmux(&["kill-session", "-t", session_id]).await {
            warn!("kill-session {}: {}", session_id, e);
        }
        self.session_locks.remove(session_id);
        Ok(())
    }

    async fn kill_server(&self) -> Result<()> {
        if let Err(e) = self.run_tmux(&["kill-server"]).await {
            warn!("kill-server: {}", e);
        }
        self.session_locks.clear();
        Ok(())
    }
}

fn new_session_id() -> String {
    Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// The wait-for channel name for one session.
fn wait_channel(session_id: &str) -> String {
    format!("done-{}", session_id)
}

/// Wrap a command so the subshell signals the session's wait-for channel
/// when the command returns, regardless of its exit status.
fn wrap_command(command: &str, session_id: &str) -> String {
    format!("({}); tmux wait-for -S {}", command, wait_channel(session_id))
}

fn tail(text: &str, max: usize) -> String {
    let trimmed = text.trim();
    if trimmed.len() <= max {
        return trimmed.to_string();
    }
    let mut start = trimmed.len() - max;
    while !trimmed.is_char_boundary(start) {
        start += 1;
    }
    trimmed[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_ids_are_eight_hex_chars() {
        let id = new_session_id();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(new_session_id(), new_session_id());
    }

    #[test]
    fn wrapped_command_signals_wait_channel() {
        let full = wrap_command("nmap -sV 127.0.0.1", "ab12cd34");
        assert_eq!(
            full,
            "(nmap -sV 127.0.0.1); tmux wait-for -S done-ab12cd34"
        );
    }

    #[test]
    fn wrapped_command_signals_even_on_failure() {
        // The subshell grouping means the wait-for runs after the command
        // exits, success or not.
        let full = wrap_command("false", "deadbeef");
        assert!(full.starts_with("(false); "));
        assert!(full.ends_with("tmux wait-for -S done-deadbeef"));
    }

    #[test]
    fn tail_keeps_last_bytes() {
        assert_eq!(tail("  short  ", 100), "short");
        let long = "x".repeat(600);
        assert_eq!(tail(&long, 500).len(), 500);
    }
}
