//! Authentication error taxonomy.

use thiserror::Error;

use crate::error::DomainError;

/// Failures of the session lifecycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// The backend answered 401 for an authenticated request.
    #[error("authentication expired")]
    AuthenticationExpired,

    /// The identity check reported no authenticated session.
    #[error("not authenticated")]
    AuthenticationDenied,

    /// The identity provider could not be reached.
    #[error("identity provider unreachable: {message}")]
    ProviderUnreachable {
        /// Transport error description.
        message: String,
    },

    /// The identity provider refused the refresh grant.
    #[error("token refresh rejected: {message}")]
    RefreshRejected {
        /// Provider error description.
        message: String,
    },

    /// The attempt cap was reached without a successful refresh.
    #[error("token refresh exhausted after {attempts} attempts")]
    RefreshExhausted {
        /// Attempts made before giving up.
        attempts: u32,
    },

    /// The login flow could not be completed.
    #[error("login failed: {message}")]
    LoginFailed {
        /// Error description.
        message: String,
    },

    /// A token could not be decoded.
    #[error("invalid token: {0}")]
    InvalidToken(#[from] DomainError),
}
