//! Domain error types

use thiserror::Error;

/// Domain-level errors that can occur during validation or processing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A request body could not be serialized.
    #[error("invalid body: {0}")]
    InvalidBody(String),

    /// A bearer token is not a well-formed JWT.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// A token payload is missing a claim the console relies on.
    #[error("missing claim: {0}")]
    MissingClaim(&'static str),
}

/// Result type alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;
