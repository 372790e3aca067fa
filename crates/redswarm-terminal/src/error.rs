//! Terminal pool error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TerminalError {
    #[error("failed to create session: {0}")]
    SessionCreate(String),

    #[error("unknown session: {0}")]
    UnknownSession(String),

    #[error("tool server unreachable: {0}")]
    Unreachable(String),

    #[error("tmux error: {0}")]
    Tmux(String),

    #[error("docker error: {0}")]
    Docker(String),

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, TerminalError>;

impl TerminalError {
    /// Stable kind tag used on the RPC wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::SessionCreate(_) => "session_create",
            Self::UnknownSession(_) => "unknown_session",
            Self::Unreachable(_) => "unreachable",
            Self::Tmux(_) => "tmux",
            Self::Docker(_) => "docker",
            Self::Protocol(_) => "protocol",
            Self::Http(_) => "http",
            Self::Io(_) => "io",
        }
    }

    /// Rebuild an error from its wire representation.
    pub fn from_wire(kind: &str, message: String) -> Self {
        match kind {
            "session_create" => Self::SessionCreate(message),
            "unknown_session" => Self::UnknownSession(message),
            "unreachable" => Self::Unreachable(message),
            "docker" => Self::Docker(message),
            "protocol" => Self::Protocol(message),
            _ => Self::Tmux(message),
        }
    }
}
