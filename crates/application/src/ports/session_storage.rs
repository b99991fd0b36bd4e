//! Session storage port
//!
//! A per-session key/value slot store. The console mirrors the current
//! access token here for developer inspection only; nothing reads it back
//! to rebuild state.

use async_trait::async_trait;

/// Errors that can occur during session storage operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionStorageError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The key cannot be used as a slot name.
    #[error("invalid key: {0}")]
    InvalidKey(String),
}

/// Key/value storage scoped to one console session.
#[async_trait]
pub trait SessionStorage: Send + Sync {
    /// Writes `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStorageError>;

    /// Reads the value under `key`.
    ///
    /// The session core never calls this; it serves inspection of the
    /// mirrored token and the tests that check it.
    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionStorageError>;

    /// Deletes `key`. Deleting a missing key is not an error.
    async fn remove_item(&self, key: &str) -> Result<(), SessionStorageError>;
}
