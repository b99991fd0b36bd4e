//! Session service: the user-facing view of the current login.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use procura_domain::{Session, Token};
use tokio::task::JoinHandle;

use super::TokenStore;
use crate::ports::{Clock, IdentityClient, SessionStorage};

/// Session storage slot mirroring the current access token.
pub const TOKEN_SLOT: &str = "kc_token";

/// Identity facts, manual refresh and logout for the current session.
///
/// Everything here is derived from the held token's claims; no profile
/// endpoint is consulted.
pub struct SessionService {
    identity: Arc<dyn IdentityClient>,
    tokens: TokenStore,
    storage: Arc<dyn SessionStorage>,
    clock: Arc<dyn Clock>,
    app_origin: String,
    min_validity_secs: i64,
}

impl SessionService {
    /// Creates the service.
    pub fn new(
        identity: Arc<dyn IdentityClient>,
        tokens: TokenStore,
        storage: Arc<dyn SessionStorage>,
        clock: Arc<dyn Clock>,
        app_origin: impl Into<String>,
        min_validity_secs: i64,
    ) -> Self {
        Self {
            identity,
            tokens,
            storage,
            clock,
            app_origin: app_origin.into(),
            min_validity_secs,
        }
    }

    async fn token(&self) -> Option<Token> {
        self.tokens.get().await
    }

    /// The derived session view.
    pub async fn session(&self) -> Session {
        Session::from_token(self.token().await.as_ref())
    }

    /// Login name, empty when logged out.
    pub async fn username(&self) -> String {
        self.session().await.username
    }

    /// Email address, empty when logged out.
    pub async fn email(&self) -> String {
        self.session().await.email
    }

    /// Given and family name, falling back to the display name.
    pub async fn full_name(&self) -> String {
        self.session().await.full_name
    }

    /// Subject id, empty when logged out.
    pub async fn user_id(&self) -> String {
        self.session().await.user_id
    }

    /// Realm roles.
    pub async fn roles(&self) -> Vec<String> {
        self.session().await.roles
    }

    /// Expiry of the held token.
    pub async fn token_expiry(&self) -> Option<DateTime<Utc>> {
        self.token().await.map(|t| t.expires_at())
    }

    /// True when no token is held or the held one has expired.
    pub async fn is_token_expired(&self) -> bool {
        self.token()
            .await
            .is_none_or(|t| t.is_expired_at(self.clock.now()))
    }

    /// Copies the current access token into the session storage slot.
    pub async fn mirror_token(&self) {
        let Some(token) = self.token().await else {
            return;
        };
        if let Err(error) = self.storage.set_item(TOKEN_SLOT, token.value()).await {
            tracing::warn!(%error, "Could not mirror token into session storage");
        }
    }

    /// Refreshes the token unless it stays valid for `min_validity_secs`.
    ///
    /// A failed refresh starts a login and reports `false`. Without a held
    /// token there is nothing to refresh, so any pending login is left alone.
    pub async fn refresh_token(&self, min_validity_secs: i64) -> bool {
        if self.token().await.is_none() {
            tracing::debug!("No session held, skipping token refresh");
            return false;
        }
        match self.identity.refresh_token(min_validity_secs).await {
            Ok(true) => {
                tracing::info!("Token refreshed successfully");
                self.mirror_token().await;
                true
            }
            Ok(false) => false,
            Err(error) => {
                tracing::error!(%error, "Failed to refresh token");
                if let Err(error) = self.identity.login(&self.app_origin).await {
                    tracing::error!(%error, "Login after failed refresh could not start");
                }
                false
            }
        }
    }

    /// Runs [`Self::refresh_token`] every `interval` until the handle is
    /// aborted.
    pub fn spawn_background_refresh(self: &Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let service = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                service.refresh_token(service.min_validity_secs).await;
            }
        })
    }

    /// Clears the mirrored token and ends the session at the provider.
    ///
    /// # Errors
    ///
    /// Returns the provider's error if the logout could not be completed.
    pub async fn logout(&self) -> Result<(), procura_domain::AuthError> {
        if let Err(error) = self.storage.remove_item(TOKEN_SLOT).await {
            tracing::warn!(%error, "Could not clear mirrored token");
        }
        self.identity.logout(&self.app_origin).await
    }
}
