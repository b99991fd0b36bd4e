//! Session view derived from token claims.

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Token;

/// Who is logged in, computed from the held token.
///
/// Never fetched from a profile endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct Session {
    /// Whether an authenticated token is held.
    pub is_logged_in: bool,
    /// Subject identifier.
    pub user_id: String,
    /// Login name.
    pub username: String,
    /// Email address.
    pub email: String,
    /// Whether the provider verified the email.
    pub email_verified: bool,
    /// Display name.
    pub full_name: String,
    /// Realm roles.
    pub roles: Vec<String>,
    /// Token expiry, if logged in.
    pub expires_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Session for nobody.
    #[must_use]
    pub fn anonymous() -> Self {
        Self::default()
    }

    /// Derives the session from the current token, if any.
    #[must_use]
    pub fn from_token(token: Option<&Token>) -> Self {
        let Some(token) = token.filter(|t| t.is_authenticated()) else {
            return Self::anonymous();
        };
        let claims = token.claims();

        Self {
            is_logged_in: true,
            user_id: claims.sub.clone(),
            username: claims.preferred_username.clone().unwrap_or_default(),
            email: claims.email.clone().unwrap_or_default(),
            email_verified: claims.email_verified.unwrap_or(false),
            full_name: claims.full_name(),
            roles: claims.roles().to_vec(),
            expires_at: Some(token.expires_at()),
        }
    }

    /// True if the session carries `role`.
    #[must_use]
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|r| r == role)
    }
}
