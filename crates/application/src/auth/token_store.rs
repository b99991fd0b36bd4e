//! Shared holder for the session's access token.
//!
//! One store is created per console session and shared by the identity
//! adapter (writer) and the request pipeline (reader). Writes replace the
//! whole token, so readers see either the old or the new value.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use procura_domain::Token;
use tokio::sync::RwLock;

/// Thread-safe in-memory token store.
#[derive(Debug, Clone, Default)]
pub struct TokenStore {
    current: Arc<RwLock<Option<Token>>>,
}

impl TokenStore {
    /// Create an empty token store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current token, if any.
    pub async fn get(&self) -> Option<Token> {
        self.current.read().await.clone()
    }

    /// Replaces the current token.
    pub async fn set(&self, token: Token) {
        *self.current.write().await = Some(token);
    }

    /// Drops the current token.
    pub async fn clear(&self) {
        *self.current.write().await = None;
    }

    /// True if a token is held that stays valid for `margin_secs` after `now`.
    pub async fn is_valid_for(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        self.current
            .read()
            .await
            .as_ref()
            .is_some_and(|t| t.is_valid_for(now, margin_secs))
    }

    /// Get token status for display.
    pub async fn status(&self, now: DateTime<Utc>, refresh_margin_secs: i64) -> TokenStatus {
        let current = self.current.read().await;
        let Some(token) = current.as_ref() else {
            return TokenStatus::NotAuthenticated;
        };
        let seconds_remaining = (token.expires_at() - now).num_seconds();

        if token.is_expired_at(now) {
            TokenStatus::Expired
        } else if !token.is_valid_for(now, refresh_margin_secs) {
            TokenStatus::Expiring { seconds_remaining }
        } else {
            TokenStatus::Valid { seconds_remaining }
        }
    }
}

/// Status of the held token for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenStatus {
    /// No token is held.
    NotAuthenticated,
    /// Token is valid and not due for refresh.
    Valid {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Token is valid but inside the refresh margin.
    Expiring {
        /// Seconds until expiry.
        seconds_remaining: i64,
    },
    /// Token has expired.
    Expired,
}

impl TokenStatus {
    /// Returns true if the token is valid (not expired).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        matches!(self, Self::Valid { .. } | Self::Expiring { .. })
    }

    /// Get a user-friendly display message.
    #[must_use]
    pub fn display_message(&self) -> String {
        match self {
            Self::NotAuthenticated => "Not authenticated".to_string(),
            Self::Valid { seconds_remaining } => {
                let secs = *seconds_remaining;
                if secs > 3600 {
                    format!("Valid for {} hours", secs / 3600)
                } else if secs > 60 {
                    format!("Valid for {} minutes", secs / 60)
                } else {
                    format!("Valid for {secs} seconds")
                }
            }
            Self::Expiring { seconds_remaining } => {
                format!("Expiring in {seconds_remaining} seconds (will auto-refresh)")
            }
            Self::Expired => "Expired".to_string(),
        }
    }
}
