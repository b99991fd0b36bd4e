//! HTTP client port

use async_trait::async_trait;
use procura_domain::{ApiRequest, ApiResponse};
use thiserror::Error;

/// Transport-level failures: no HTTP response was received.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum HttpClientError {
    /// The request URL could not be built.
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// The request did not finish in time.
    #[error("request timed out after {timeout_ms} ms")]
    Timeout {
        /// Configured timeout.
        timeout_ms: u64,
    },

    /// The host name could not be resolved.
    #[error("could not resolve {host}: {message}")]
    DnsError {
        /// Host that failed to resolve.
        host: String,
        /// Resolver message.
        message: String,
    },

    /// The connection could not be established.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Anything else the transport reported.
    #[error("{0}")]
    Other(String),
}

/// Port for executing HTTP requests against the backend.
///
/// Implementations return every HTTP response, successful or not; status
/// interpretation belongs to the request pipeline.
#[async_trait]
pub trait HttpClient: Send + Sync {
    /// Executes `request` and returns the raw response.
    ///
    /// # Errors
    ///
    /// Returns an error only if no response was received.
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, HttpClientError>;
}
