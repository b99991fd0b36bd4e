//! Application error types

use procura_domain::DomainError;
use thiserror::Error;

use crate::ports::HttpClientError;

/// Failure of a backend API call as seen by callers.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// No response was received.
    #[error("request failed: {0}")]
    Transport(#[from] HttpClientError),

    /// The backend rejected the credential (HTTP 401).
    #[error("authentication expired")]
    Unauthorized,

    /// The backend answered with a non-success status.
    #[error("HTTP {status}{}", suffix(.message))]
    Status {
        /// Status code.
        status: u16,
        /// `message` field of the error body, if any.
        message: Option<String>,
    },

    /// The response body did not have the expected shape.
    #[error("unexpected response body: {0}")]
    Decode(String),

    /// The request could not be built.
    #[error("invalid request: {0}")]
    Domain(#[from] DomainError),
}

impl ApiError {
    /// Status code to categorize the failure by; 0 when nothing came back.
    #[must_use]
    pub const fn status(&self) -> u16 {
        match self {
            Self::Transport(_) => 0,
            Self::Unauthorized => 401,
            Self::Status { status, .. } => *status,
            Self::Decode(_) | Self::Domain(_) => 200,
        }
    }
}

fn suffix(message: &Option<String>) -> String {
    message.as_deref().map(|m| format!(": {m}")).unwrap_or_default()
}

/// Result type alias for backend API calls.
pub type ApiResult<T> = Result<T, ApiError>;
