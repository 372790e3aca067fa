//! Session logger: append during a turn, rewrite to disk at turn
//! boundaries

use crate::event::{LoggedEvent, SessionLog};
use chrono::{DateTime, Utc};
use redswarm_core::{Error, Result, ToolCall};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::warn;
use uuid::Uuid;
use walkdir::WalkDir;

pub struct SessionLogger {
    base_path: PathBuf,
    current: Mutex<Option<SessionLog>>,
}

impl SessionLogger {
    pub fn new(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            current: Mutex::new(None),
        }
    }

    /// Begin a new session log; any unsaved previous session is dropped.
    pub fn start_session(&self, model_label: impl Into<String>) -> String {
        let session_id = Uuid::new_v4().to_string();
        let log = SessionLog::new(session_id.clone(), Some(model_label.into()));
        *self.lock() = Some(log);
        session_id
    }

    pub fn current_session_id(&self) -> Option<String> {
        self.lock().as_ref().map(|log| log.session_id.clone())
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Option<SessionLog>> {
        match self.current.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn append(&self, event: LoggedEvent) {
        if let Some(log) = self.lock().as_mut() {
            log.events.push(event);
        }
    }

    pub fn log_user_input(&self, content: &str) {
        self.append(LoggedEvent::user_input(content));
    }

    pub fn log_agent_response(&self, agent_name: &str, content: &str, tool_calls: Vec<ToolCall>) {
        self.append(LoggedEvent::agent_response(agent_name, content, tool_calls));
    }

    pub fn log_tool_command(&self, tool_name: &str, command: &str) {
        self.append(LoggedEvent::tool_command(tool_name, command));
    }

    pub fn log_tool_output(&self, tool_name: &str, output: &str) {
        self.append(LoggedEvent::tool_output(tool_name, output));
    }

    /// Rewrite the whole log to disk. Called at turn boundaries; a failure
    /// is logged and must never block the turn, so callers may ignore the
    /// result.
    pub fn save(&self) -> Result<()> {
        let snapshot = match self.lock().as_ref() {
            Some(log) => log.clone(),
            None => return Ok(()),
        };
        let path = session_file_path(&self.base_path, &snapshot.session_id, snapshot.start_time);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(&path, json)?;
        Ok(())
    }

    /// Convenience wrapper for turn boundaries: warn on failure, continue.
    pub fn save_or_warn(&self) {
        if let Err(e) = self.save() {
            warn!("failed to save session log: {}", e);
        }
    }

    /// Save and close the current session, returning its ID.
    pub fn end_session(&self) -> Option<String> {
        self.save_or_warn();
        self.lock().take().map(|log| log.session_id)
    }

    pub fn snapshot(&self) -> Option<SessionLog> {
        self.lock().clone()
    }
}

fn session_file_path(base: &Path, session_id: &str, start_time: DateTime<Utc>) -> PathBuf {
    base.join(start_time.format("%Y/%m/%d").to_string())
        .join(format!("session_{}.json", session_id))
}

/// Session listing entry.
#[derive(Clone, Debug)]
pub struct SessionSummary {
    pub session_id: String,
    pub start_time: DateTime<Utc>,
    pub event_count: usize,
    pub preview: String,
    pub model_label: Option<String>,
    pub file_path: PathBuf,
}

/// Scan the logs directory for sessions, newest first. Unparseable files
/// are skipped.
pub fn list_sessions(base_path: impl AsRef<Path>, limit: usize) -> Vec<SessionSummary> {
    let mut sessions: Vec<SessionSummary> = WalkDir::new(base_path)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| {
            entry.file_type().is_file()
                && entry
                    .file_name()
                    .to_str()
                    .map(|n| n.starts_with("session_") && n.ends_with(".json"))
                    .unwrap_or(false)
        })
        .filter_map(|entry| {
            let raw = std::fs::read_to_string(entry.path()).ok()?;
            let log: SessionLog = serde_json::from_str(&raw).ok()?;
            Some(SessionSummary {
                session_id: log.session_id.clone(),
                start_time: log.start_time,
                event_count: log.events.len(),
                preview: log.preview(100),
                model_label: log.model.clone(),
                file_path: entry.path().to_path_buf(),
            })
        })
        .collect();

    sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    sessions.truncate(limit);
    sessions
}

/// Find and load one session by ID anywhere under the logs directory.
pub fn load_session(base_path: impl AsRef<Path>, session_id: &str) -> Result<SessionLog> {
    let file_name = format!("session_{}.json", session_id);
    for entry in WalkDir::new(base_path).into_iter().filter_map(|e| e.ok()) {
        if entry.file_type().is_file() && entry.file_name().to_str() == Some(file_name.as_str()) {
            let raw = std::fs::read_to_string(entry.path())?;
            return Ok(serde_json::from_str(&raw)?);
        }
    }
    Err(Error::storage(format!("session not found: {}", session_id)))
}
