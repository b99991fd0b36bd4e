//! Identity provider port

use async_trait::async_trait;
use procura_domain::{AuthError, Claims};

/// The operations the session core needs from the identity provider.
///
/// Adapters own the protocol (authorization code, PKCE, refresh grants)
/// and keep the shared [`TokenStore`](crate::auth::TokenStore) current.
#[async_trait]
pub trait IdentityClient: Send + Sync {
    /// Whether a usable authenticated session exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider could not be consulted.
    async fn is_authenticated(&self) -> Result<bool, AuthError>;

    /// Starts the external login flow.
    ///
    /// The provider is expected to send the user back to
    /// `redirect_target` once authenticated. Calling this while a login is
    /// already pending is harmless.
    ///
    /// # Errors
    ///
    /// Returns an error if the login flow could not be started.
    async fn login(&self, redirect_target: &str) -> Result<(), AuthError>;

    /// Ends the session at the provider and clears held tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the local session could not be torn down.
    async fn logout(&self, post_logout_target: &str) -> Result<(), AuthError>;

    /// Refreshes the access token unless it stays valid for another
    /// `min_validity_secs` seconds.
    ///
    /// Returns `true` if a new token was issued, `false` if the current
    /// one was kept.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::ProviderUnreachable` when the provider cannot be
    /// reached and `AuthError::RefreshRejected` when the grant is refused.
    async fn refresh_token(&self, min_validity_secs: i64) -> Result<bool, AuthError>;

    /// Decodes the claims carried by `token`.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::InvalidToken` if the token cannot be decoded.
    fn decode_claims(&self, token: &str) -> Result<Claims, AuthError> {
        Ok(Claims::decode(token)?)
    }
}
