//! Token claims decoded from a JWT payload.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};

/// Realm-level role grants as issued by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RealmAccess {
    /// Role names granted in the realm.
    #[serde(default)]
    pub roles: Vec<String>,
}

/// The identity facts carried by an access token.
///
/// Only `sub` and `exp` are required; everything else is optional because
/// providers omit claims the client was not granted scopes for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (stable user id).
    pub sub: String,
    /// Expiry as seconds since the Unix epoch.
    pub exp: i64,
    /// Issued-at as seconds since the Unix epoch.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,
    /// Login name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,
    /// Primary email address.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    /// Whether the provider verified `email`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email_verified: Option<bool>,
    /// First name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub given_name: Option<String>,
    /// Last name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub family_name: Option<String>,
    /// Display name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Realm role grants.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub realm_access: Option<RealmAccess>,
}

/// Payload shape used for presence validation before building [`Claims`].
#[derive(Deserialize)]
struct RawClaims {
    sub: Option<String>,
    exp: Option<i64>,
    #[serde(flatten)]
    rest: serde_json::Map<String, serde_json::Value>,
}

impl Claims {
    /// Decodes the payload segment of a compact JWT.
    ///
    /// The signature is not verified; the token came from the identity
    /// provider over TLS and the backend performs its own validation.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::MalformedToken` if the token is not three
    /// dot-separated segments with a base64url JSON payload, and
    /// `DomainError::MissingClaim` if `sub` or `exp` is absent.
    pub fn decode(token: &str) -> DomainResult<Self> {
        let mut segments = token.split('.');
        let payload = match (segments.next(), segments.next(), segments.next(), segments.next()) {
            (Some(_), Some(payload), Some(_), None) => payload,
            _ => {
                return Err(DomainError::MalformedToken(
                    "expected three dot-separated segments".to_string(),
                ));
            }
        };

        let bytes = URL_SAFE_NO_PAD
            .decode(payload.trim_end_matches('='))
            .map_err(|e| DomainError::MalformedToken(format!("payload is not base64url: {e}")))?;

        let raw: RawClaims = serde_json::from_slice(&bytes)
            .map_err(|e| DomainError::MalformedToken(format!("payload is not JSON: {e}")))?;

        let sub = raw.sub.ok_or(DomainError::MissingClaim("sub"))?;
        let exp = raw.exp.ok_or(DomainError::MissingClaim("exp"))?;

        let mut rest = raw.rest;
        rest.insert("sub".to_string(), serde_json::Value::String(sub));
        rest.insert("exp".to_string(), serde_json::Value::from(exp));

        serde_json::from_value(serde_json::Value::Object(rest))
            .map_err(|e| DomainError::MalformedToken(format!("unexpected claim type: {e}")))
    }

    /// Expiry as a UTC timestamp.
    #[must_use]
    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Realm roles, empty when the token carries none.
    #[must_use]
    pub fn roles(&self) -> &[String] {
        self.realm_access
            .as_ref()
            .map_or(&[], |access| access.roles.as_slice())
    }

    /// Given and family name joined, falling back to `name`.
    #[must_use]
    pub fn full_name(&self) -> String {
        let first = self.given_name.as_deref().unwrap_or("");
        let last = self.family_name.as_deref().unwrap_or("");
        let joined = format!("{first} {last}");
        let joined = joined.trim();
        if joined.is_empty() {
            self.name.clone().unwrap_or_default()
        } else {
            joined.to_string()
        }
    }
}
