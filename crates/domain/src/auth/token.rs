//! Bearer token held by the session.

use std::fmt;

use chrono::{DateTime, Duration, Utc};

use super::Claims;

/// An access token together with its decoded claims.
///
/// Tokens are replaced wholesale on refresh, never mutated in place.
#[derive(Clone, PartialEq, Eq)]
pub struct Token {
    value: String,
    claims: Claims,
    authenticated: bool,
}

impl Token {
    /// Builds a token from an already-decoded claim set.
    #[must_use]
    pub fn from_parts(value: impl Into<String>, claims: Claims) -> Self {
        Self {
            value: value.into(),
            claims,
            authenticated: true,
        }
    }

    /// The raw bearer credential.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Decoded claims.
    #[must_use]
    pub const fn claims(&self) -> &Claims {
        &self.claims
    }

    /// Whether the provider marked this token as belonging to a login.
    #[must_use]
    pub const fn is_authenticated(&self) -> bool {
        self.authenticated
    }

    /// Expiry instant.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        self.claims.expires_at()
    }

    /// True if the token has expired at `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at()
    }

    /// True if the token stays valid for at least `margin_secs` after `now`.
    ///
    /// A margin past the representable time range counts as never valid.
    #[must_use]
    pub fn is_valid_for(&self, now: DateTime<Utc>, margin_secs: i64) -> bool {
        Duration::try_seconds(margin_secs)
            .and_then(|margin| now.checked_add_signed(margin))
            .is_some_and(|deadline| deadline < self.expires_at())
    }

    /// Value for the `Authorization` header.
    #[must_use]
    pub fn authorization_header(&self) -> String {
        format!("Bearer {}", self.value)
    }

    /// First characters of the credential, safe for logs.
    #[must_use]
    pub fn preview(&self) -> String {
        if self.value.len() > 12 {
            let head: String = self.value.chars().take(8).collect();
            format!("{head}...")
        } else {
            "***".to_string()
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("value", &self.preview())
            .field("sub", &self.claims.sub)
            .field("exp", &self.claims.exp)
            .field("authenticated", &self.authenticated)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn claims(exp: i64) -> Claims {
        Claims {
            sub: "user-1".to_string(),
            exp,
            iat: None,
            preferred_username: None,
            email: None,
            email_verified: None,
            given_name: None,
            family_name: None,
            name: None,
            realm_access: None,
        }
    }

    #[test]
    fn test_validity_window() {
        let now = Utc::now();
        let token = Token::from_parts("abcdefghijklmnopqrstuvwxyz", claims(now.timestamp() + 60));

        assert!(!token.is_expired_at(now));
        assert!(token.is_valid_for(now, 30));
        assert!(!token.is_valid_for(now, 70));
        assert!(token.is_expired_at(now + Duration::seconds(61)));
    }

    #[test]
    fn test_out_of_range_margin_is_not_valid() {
        let now = Utc::now();
        let token = Token::from_parts("abcdefghijklmnopqrstuvwxyz", claims(now.timestamp() + 60));

        assert!(!token.is_valid_for(now, i64::MAX));
        assert!(!token.is_valid_for(now, i64::MIN));
    }

    #[test]
    fn test_debug_redacts_value() {
        let token = Token::from_parts("abcdefghijklmnopqrstuvwxyz", claims(0));
        let rendered = format!("{token:?}");
        assert!(rendered.contains("abcdefgh..."));
        assert!(!rendered.contains("ijklmnop"));
        assert_eq!(token.authorization_header(), "Bearer abcdefghijklmnopqrstuvwxyz");
    }
}
