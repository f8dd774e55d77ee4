//! Engine error types

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// HTTP status that marks a resource as absent
pub const STATUS_NOT_FOUND: u16 = 404;

/// Terminal non-2xx HTTP response, built once the retry budget is spent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperationError {
    pub status_code: u16,
    pub message: String,
}

impl OperationError {
    pub fn new(status_code: u16, message: impl Into<String>) -> Self {
        Self {
            status_code,
            message: message.into(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code == STATUS_NOT_FOUND
    }
}

impl fmt::Display for OperationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "HTTP {}: {}", self.status_code, self.message)
    }
}

impl std::error::Error for OperationError {}

/// Errors surfaced by the transport, addressing and polling layers
#[derive(Error, Debug)]
pub enum OpcError {
    /// Connection or request-construction failure. Never retried.
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Operation failed: {0}")]
    Operation(#[from] OperationError),

    /// The remote resource entered a known failure state
    #[error("{resource} entered failure state: {state}")]
    State { resource: String, state: String },

    /// The resource never converged within the bound. It may still converge later.
    #[error("Timeout waiting for {description} after {timeout:?}")]
    Timeout {
        description: String,
        timeout: Duration,
    },

    #[error("Cancelled while waiting for {description}")]
    Cancelled { description: String },

    #[error("Path template error: {0}")]
    Template(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OpcError {
    /// Status code of a terminal HTTP failure, if this is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OpcError::Operation(op) => Some(op.status_code),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status_code() == Some(STATUS_NOT_FOUND)
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, OpcError::Timeout { .. })
    }
}

impl From<reqwest::Error> for OpcError {
    fn from(err: reqwest::Error) -> Self {
        OpcError::Transport(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, OpcError>;
