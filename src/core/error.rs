//! Error taxonomy surfaced to display components

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why the last connect attempt failed. Captured into `Session::last_error`.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail")]
pub enum SessionError {
    #[error("no wallet provider detected")]
    NoProviderDetected,

    #[error("connection rejected by user")]
    ConnectionRejectedByUser,

    #[error("provider error: {0}")]
    ProviderError(String),
}

impl SessionError {
    /// Stable name of the taxonomy kind
    pub fn kind(&self) -> &'static str {
        match self {
            SessionError::NoProviderDetected => "NoProviderDetected",
            SessionError::ConnectionRejectedByUser => "ConnectionRejectedByUser",
            SessionError::ProviderError(_) => "ProviderError",
        }
    }
}

/// What a provider adapter reports when `enable` does not grant access
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProviderFailure {
    #[error("user rejected the request")]
    Rejected,

    #[error("{0}")]
    Failed(String),
}

impl From<ProviderFailure> for SessionError {
    fn from(failure: ProviderFailure) -> Self {
        match failure {
            ProviderFailure::Rejected => SessionError::ConnectionRejectedByUser,
            ProviderFailure::Failed(detail) => SessionError::ProviderError(detail),
        }
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config read: {0}")]
    Io(#[from] std::io::Error),

    #[error("config json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid {key}: {value}")]
    Invalid { key: String, value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
