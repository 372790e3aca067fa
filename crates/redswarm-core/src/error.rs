//! Error types shared across the workspace

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("missing configuration: {0}")]
    ConfigMissing(String),

    #[error("model initialization failed: {0}")]
    ModelInit(String),

    #[error("storage failure: {0}")]
    Storage(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn config_missing(what: impl Into<String>) -> Self {
        Self::ConfigMissing(what.into())
    }

    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }
}
