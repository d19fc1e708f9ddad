use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Outcome code recorded when the server answers with a non-success status.
///
/// These are routine results of remote calls (a node that no longer exists,
/// a delete blocked by attached relationships), not caller bugs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// 400
    BadRequest,
    /// 404
    NotFound,
    /// 409
    Conflict,
    /// Any other status the operation did not expect.
    Unexpected(u16),
}

impl ErrorCode {
    /// Map an HTTP status onto an outcome code.
    pub fn from_status(status: u16) -> Self {
        match status {
            400 => Self::BadRequest,
            404 => Self::NotFound,
            409 => Self::Conflict,
            other => Self::Unexpected(other),
        }
    }

    /// The HTTP status this code stands for.
    pub fn status(&self) -> u16 {
        match self {
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::Unexpected(status) => *status,
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest => write!(f, "bad request (400)"),
            Self::NotFound => write!(f, "not found (404)"),
            Self::Conflict => write!(f, "conflict (409)"),
            Self::Unexpected(status) => write!(f, "unexpected status {status}"),
        }
    }
}

/// Errors from loading client configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
