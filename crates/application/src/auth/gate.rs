//! Route guard.

use std::sync::Arc;

use procura_domain::AuthError;

use crate::ports::IdentityClient;

/// Result of guarding a navigation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The navigation may proceed.
    Allow,
    /// The navigation is blocked.
    Deny,
}

/// Blocks navigation until the identity provider confirms a session.
pub struct AuthGate {
    identity: Arc<dyn IdentityClient>,
    origin: String,
}

impl AuthGate {
    /// Creates a gate for an application served from `origin`.
    pub fn new(identity: Arc<dyn IdentityClient>, origin: impl Into<String>) -> Self {
        Self {
            identity,
            origin: origin.into().trim_end_matches('/').to_string(),
        }
    }

    /// Checks whether navigation to `target_path` may proceed.
    ///
    /// When no session exists a login is started that returns to
    /// `origin + target_path`, and the navigation is denied.
    ///
    /// # Errors
    ///
    /// Returns the provider's error when the check itself fails. The
    /// navigation must be treated as denied in that case.
    pub async fn check(&self, target_path: &str) -> Result<Navigation, AuthError> {
        let authenticated = self.identity.is_authenticated().await.map_err(|error| {
            tracing::error!(%error, "Error checking authentication status");
            error
        })?;

        if authenticated {
            return Ok(Navigation::Allow);
        }

        let target = format!("{}{}", self.origin, target_path);
        let reason = AuthError::AuthenticationDenied;
        tracing::debug!(%target, %reason, "Starting login");
        self.identity.login(&target).await?;
        Ok(Navigation::Deny)
    }
}
