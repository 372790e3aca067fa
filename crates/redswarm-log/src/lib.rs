//! Replayable session journal
//!
//! One append-only event log per conversation, holding exactly what a UI
//! needs to reconstruct the run offline: user inputs, agent responses,
//! tool commands, and tool outputs. Logs are single JSON documents under
//! `logs/YYYY/MM/DD/session_<id>.json`.

pub mod event;
pub mod logger;
pub mod replay;

pub use event::{LoggedEvent, LoggedEventType, SessionLog};
pub use logger::{list_sessions, load_session, SessionLogger, SessionSummary};
pub use replay::replay;
