//! Keycloak-style OpenID Connect client.
//!
//! Implements the `IdentityClient` port with the authorization code flow
//! plus PKCE (S256). The authorization URL is handed to a `LoginRedirect`;
//! whoever drives the browser passes the callback URL back through
//! [`KeycloakClient::complete_login`].

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use procura_application::auth::TokenStore;
use procura_application::ports::{Clock, IdentityClient, LoginRedirect};
use procura_domain::{AuthError, Token};
use serde::Deserialize;
use tokio::sync::Mutex;
use url::Url;

use super::pkce;

/// Content-Type for form-urlencoded data.
const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";

/// Validity below which `is_authenticated` tries a refresh first.
const SESSION_CHECK_VALIDITY_SECS: i64 = 20;

/// Where the identity provider lives and who we are to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OidcSettings {
    /// Provider base URL, without the `/realms` part.
    pub url: String,
    /// Realm name.
    pub realm: String,
    /// Public client id.
    pub client_id: String,
    /// Redirect URI used when a login names no target.
    pub redirect_uri: String,
    /// Requested scopes; `openid` is always included.
    pub scope: String,
}

impl OidcSettings {
    fn endpoint(&self, name: &str) -> String {
        format!(
            "{}/realms/{}/protocol/openid-connect/{name}",
            self.url.trim_end_matches('/'),
            self.realm
        )
    }

    /// Authorization endpoint.
    #[must_use]
    pub fn auth_endpoint(&self) -> String {
        self.endpoint("auth")
    }

    /// Token endpoint.
    #[must_use]
    pub fn token_endpoint(&self) -> String {
        self.endpoint("token")
    }

    /// End-session endpoint.
    #[must_use]
    pub fn logout_endpoint(&self) -> String {
        self.endpoint("logout")
    }

    fn scope(&self) -> String {
        if self.scope.split_whitespace().any(|s| s == "openid") {
            self.scope.clone()
        } else {
            format!("openid {}", self.scope).trim().to_string()
        }
    }
}

/// Token endpoint response.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    id_token: Option<String>,
}

/// Token endpoint error body.
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}

/// Why a token endpoint call failed.
enum TokenFailure {
    Unreachable(String),
    Rejected(String),
}

/// An authorization request waiting for its callback.
struct PendingLogin {
    state: String,
    nonce: String,
    verifier: String,
    redirect_uri: String,
    authorization_url: Url,
}

#[derive(Default)]
struct ProviderSession {
    pending: Option<PendingLogin>,
    refresh_token: Option<String>,
    id_token: Option<String>,
}

/// OpenID Connect client for a Keycloak realm.
pub struct KeycloakClient {
    http: reqwest::Client,
    settings: OidcSettings,
    tokens: TokenStore,
    redirect: Arc<dyn LoginRedirect>,
    clock: Arc<dyn Clock>,
    session: Mutex<ProviderSession>,
}

impl KeycloakClient {
    /// Creates a client that keeps `tokens` current.
    pub fn new(
        settings: OidcSettings,
        tokens: TokenStore,
        redirect: Arc<dyn LoginRedirect>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            http: reqwest::Client::builder()
                .redirect(reqwest::redirect::Policy::none())
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            settings,
            tokens,
            redirect,
            clock,
            session: Mutex::new(ProviderSession::default()),
        }
    }

    /// Provider settings.
    #[must_use]
    pub const fn settings(&self) -> &OidcSettings {
        &self.settings
    }

    /// Whether a login was started and is waiting for its callback.
    pub async fn has_pending_login(&self) -> bool {
        self.session.lock().await.pending.is_some()
    }

    /// Finishes a login from the URL the provider redirected to.
    ///
    /// # Errors
    ///
    /// - `AuthError::LoginFailed` if the callback carries an error, lacks a
    ///   code, does not match the pending login, or the code is refused.
    /// - `AuthError::ProviderUnreachable` if the token endpoint cannot be
    ///   reached.
    /// - `AuthError::InvalidToken` if the issued token cannot be decoded.
    pub async fn complete_login(&self, callback_url: &str) -> Result<(), AuthError> {
        let params = callback_params(callback_url)?;

        if let Some(error) = params.get("error") {
            let description = params.get("error_description").map_or("", String::as_str);
            return Err(login_failed(format!("{error} {description}").trim()));
        }
        let code = params
            .get("code")
            .ok_or_else(|| login_failed("callback carries no authorization code"))?;

        let mut session = self.session.lock().await;
        let expected_state = session
            .pending
            .as_ref()
            .map(|pending| pending.state.as_str())
            .ok_or_else(|| login_failed("no login in progress"))?;
        if params.get("state").map(String::as_str) != Some(expected_state) {
            return Err(login_failed("state mismatch"));
        }
        let pending = session
            .pending
            .take()
            .ok_or_else(|| login_failed("no login in progress"))?;

        let response = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("client_id", self.settings.client_id.as_str()),
                ("code", code.as_str()),
                ("redirect_uri", pending.redirect_uri.as_str()),
                ("code_verifier", pending.verifier.as_str()),
            ])
            .await
            .map_err(|failure| match failure {
                TokenFailure::Unreachable(message) => AuthError::ProviderUnreachable { message },
                TokenFailure::Rejected(message) => AuthError::LoginFailed { message },
            })?;

        if let Some(nonce) = response.id_token.as_deref().and_then(id_token_nonce)
            && nonce != pending.nonce
        {
            return Err(login_failed("nonce mismatch"));
        }

        let token = self.store(&mut session, response).await?;
        tracing::info!(
            user = token.claims().preferred_username.as_deref().unwrap_or(""),
            "Login completed"
        );
        Ok(())
    }

    /// Replaces the held tokens with those in `response`.
    async fn store(
        &self,
        session: &mut ProviderSession,
        response: TokenResponse,
    ) -> Result<Token, AuthError> {
        let claims = self.decode_claims(&response.access_token)?;
        let token = Token::from_parts(response.access_token, claims);
        if response.refresh_token.is_some() {
            session.refresh_token = response.refresh_token;
        }
        if response.id_token.is_some() {
            session.id_token = response.id_token;
        }
        self.tokens.set(token.clone()).await;
        Ok(token)
    }

    /// Posts a form to the token endpoint.
    async fn token_request(&self, params: &[(&str, &str)]) -> Result<TokenResponse, TokenFailure> {
        let body = serde_urlencoded::to_string(params)
            .map_err(|e| TokenFailure::Rejected(format!("Failed to encode form: {e}")))?;

        let response = self
            .http
            .post(self.settings.token_endpoint())
            .header("Content-Type", FORM_CONTENT_TYPE)
            .body(body)
            .send()
            .await
            .map_err(|e| TokenFailure::Unreachable(e.to_string()))?;

        let status = response.status();
        if status.is_server_error() {
            return Err(TokenFailure::Unreachable(format!("token endpoint answered {status}")));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<TokenErrorResponse>(&error_text).map_or_else(
                |_| format!("Token request failed ({status}): {error_text}"),
                |e| e.error_description.unwrap_or(e.error),
            );
            return Err(TokenFailure::Rejected(message));
        }

        response
            .json()
            .await
            .map_err(|e| TokenFailure::Rejected(format!("Failed to parse token response: {e}")))
    }

    fn authorization_url(
        &self,
        redirect_uri: &str,
        state: &str,
        nonce: &str,
        challenge: &str,
    ) -> Result<Url, AuthError> {
        let mut url = Url::parse(&self.settings.auth_endpoint())
            .map_err(|e| login_failed(format!("invalid provider URL: {e}")))?;
        url.query_pairs_mut()
            .append_pair("client_id", &self.settings.client_id)
            .append_pair("redirect_uri", redirect_uri)
            .append_pair("state", state)
            .append_pair("response_mode", "query")
            .append_pair("response_type", "code")
            .append_pair("scope", &self.settings.scope())
            .append_pair("nonce", nonce)
            .append_pair("code_challenge", challenge)
            .append_pair("code_challenge_method", "S256");
        Ok(url)
    }
}

#[async_trait]
impl IdentityClient for KeycloakClient {
    async fn is_authenticated(&self) -> Result<bool, AuthError> {
        let Some(token) = self.tokens.get().await else {
            return Ok(false);
        };
        if token.is_valid_for(self.clock.now(), SESSION_CHECK_VALIDITY_SECS) {
            return Ok(true);
        }
        match self.refresh_token(SESSION_CHECK_VALIDITY_SECS).await {
            Ok(_) => Ok(true),
            Err(error @ AuthError::ProviderUnreachable { .. }) => Err(error),
            Err(error) => {
                tracing::debug!(%error, "Session could not be extended");
                Ok(false)
            }
        }
    }

    async fn login(&self, redirect_target: &str) -> Result<(), AuthError> {
        let redirect_uri = if redirect_target.is_empty() {
            self.settings.redirect_uri.clone()
        } else {
            redirect_target.to_string()
        };

        let mut session = self.session.lock().await;
        if let Some(pending) = &session.pending
            && pending.redirect_uri == redirect_uri
        {
            self.redirect.redirect(&pending.authorization_url);
            return Ok(());
        }

        let verifier = pkce::generate_code_verifier();
        let state = pkce::generate_state();
        let nonce = uuid::Uuid::new_v4().to_string();
        let authorization_url = self.authorization_url(
            &redirect_uri,
            &state,
            &nonce,
            &pkce::compute_code_challenge(&verifier),
        )?;
        let pending = PendingLogin {
            state,
            nonce,
            verifier,
            redirect_uri,
            authorization_url,
        };

        tracing::debug!(redirect_uri = %pending.redirect_uri, "Starting login");
        self.redirect.redirect(&pending.authorization_url);
        session.pending = Some(pending);
        Ok(())
    }

    async fn logout(&self, post_logout_target: &str) -> Result<(), AuthError> {
        let (refresh_token, id_token) = {
            let mut session = self.session.lock().await;
            session.pending = None;
            (session.refresh_token.take(), session.id_token.take())
        };

        if let Some(refresh_token) = refresh_token {
            let body = serde_urlencoded::to_string([
                ("client_id", self.settings.client_id.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ])
            .unwrap_or_default();
            let result = self
                .http
                .post(self.settings.logout_endpoint())
                .header("Content-Type", FORM_CONTENT_TYPE)
                .body(body)
                .send()
                .await;
            if let Err(error) = result {
                tracing::warn!(%error, "Provider logout failed, clearing local session anyway");
            }
        }

        self.tokens.clear().await;

        let mut url = Url::parse(&self.settings.logout_endpoint())
            .map_err(|e| login_failed(format!("invalid provider URL: {e}")))?;
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.settings.client_id)
                .append_pair("post_logout_redirect_uri", post_logout_target);
            if let Some(id_token) = &id_token {
                query.append_pair("id_token_hint", id_token);
            }
        }
        tracing::info!("Logged out");
        self.redirect.redirect(&url);
        Ok(())
    }

    async fn refresh_token(&self, min_validity_secs: i64) -> Result<bool, AuthError> {
        // Held across the round trip so concurrent callers share one refresh.
        let mut session = self.session.lock().await;

        if self.tokens.is_valid_for(self.clock.now(), min_validity_secs).await {
            return Ok(false);
        }

        let refresh_token = session
            .refresh_token
            .clone()
            .ok_or_else(|| AuthError::RefreshRejected {
                message: "no refresh token held".to_string(),
            })?;

        let response = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("client_id", self.settings.client_id.as_str()),
                ("refresh_token", refresh_token.as_str()),
            ])
            .await
            .map_err(|failure| match failure {
                TokenFailure::Unreachable(message) => AuthError::ProviderUnreachable { message },
                TokenFailure::Rejected(message) => AuthError::RefreshRejected { message },
            })?;

        let token = self.store(&mut session, response).await?;
        tracing::debug!(token = %token.preview(), "Access token replaced");
        Ok(true)
    }
}

fn login_failed(message: impl Into<String>) -> AuthError {
    AuthError::LoginFailed {
        message: message.into(),
    }
}

/// Reads callback parameters from the query, or from the fragment when
/// the provider answered in fragment mode.
fn callback_params(callback_url: &str) -> Result<HashMap<String, String>, AuthError> {
    let url = Url::parse(callback_url).map_err(|e| login_failed(format!("invalid callback URL: {e}")))?;
    let mut params: HashMap<String, String> = url.query_pairs().into_owned().collect();
    if !params.contains_key("code")
        && !params.contains_key("error")
        && let Some(fragment) = url.fragment()
    {
        params.extend(url::form_urlencoded::parse(fragment.as_bytes()).into_owned());
    }
    Ok(params)
}

/// The `nonce` claim of an ID token, if readable.
fn id_token_nonce(id_token: &str) -> Option<String> {
    let payload = id_token.split('.').nth(1)?;
    let bytes = URL_SAFE_NO_PAD.decode(payload.trim_end_matches('=')).ok()?;
    let value: serde_json::Value = serde_json::from_slice(&bytes).ok()?;
    value.get("nonce")?.as_str().map(String::from)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::adapters::SystemClock;
    use pretty_assertions::assert_eq;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct RecordingRedirect {
        urls: StdMutex<Vec<Url>>,
    }

    impl LoginRedirect for RecordingRedirect {
        fn redirect(&self, url: &Url) {
            self.urls.lock().unwrap().push(url.clone());
        }
    }

    fn settings() -> OidcSettings {
        OidcSettings {
            url: "https://sso.example.edu/".to_string(),
            realm: "usis".to_string(),
            client_id: "slm".to_string(),
            redirect_uri: "http://localhost:4200".to_string(),
            scope: "profile email".to_string(),
        }
    }

    fn client(redirect: &Arc<RecordingRedirect>) -> KeycloakClient {
        KeycloakClient::new(
            settings(),
            TokenStore::new(),
            Arc::clone(redirect) as Arc<dyn LoginRedirect>,
            Arc::new(SystemClock::new()),
        )
    }

    fn query(url: &Url) -> HashMap<String, String> {
        url.query_pairs().into_owned().collect()
    }

    #[test]
    fn test_endpoints() {
        let s = settings();
        assert_eq!(
            s.auth_endpoint(),
            "https://sso.example.edu/realms/usis/protocol/openid-connect/auth"
        );
        assert_eq!(
            s.token_endpoint(),
            "https://sso.example.edu/realms/usis/protocol/openid-connect/token"
        );
        assert_eq!(
            s.logout_endpoint(),
            "https://sso.example.edu/realms/usis/protocol/openid-connect/logout"
        );
        assert_eq!(s.scope(), "openid profile email");
    }

    #[tokio::test]
    async fn test_login_builds_pkce_url() {
        let redirect = Arc::new(RecordingRedirect::default());
        let client = client(&redirect);

        client.login("http://localhost:4200/tasks").await.unwrap();

        let urls = redirect.urls.lock().unwrap().clone();
        assert_eq!(urls.len(), 1);
        let params = query(&urls[0]);
        assert_eq!(urls[0].path(), "/realms/usis/protocol/openid-connect/auth");
        assert_eq!(params["client_id"], "slm");
        assert_eq!(params["redirect_uri"], "http://localhost:4200/tasks");
        assert_eq!(params["response_type"], "code");
        assert_eq!(params["code_challenge_method"], "S256");
        assert_eq!(params["code_challenge"].len(), 43);
        assert!(params["scope"].starts_with("openid"));
        assert!(client.has_pending_login().await);
    }

    #[tokio::test]
    async fn test_repeated_login_reuses_request() {
        let redirect = Arc::new(RecordingRedirect::default());
        let client = client(&redirect);

        client.login("").await.unwrap();
        client.login("").await.unwrap();

        let urls = redirect.urls.lock().unwrap().clone();
        assert_eq!(urls.len(), 2);
        assert_eq!(urls[0], urls[1]);
        assert_eq!(query(&urls[0])["redirect_uri"], "http://localhost:4200");
    }

    #[tokio::test]
    async fn test_complete_login_rejects_state_mismatch() {
        let redirect = Arc::new(RecordingRedirect::default());
        let client = client(&redirect);
        client.login("").await.unwrap();

        let err = client
            .complete_login("http://localhost:4200/?code=abc&state=forged")
            .await
            .unwrap_err();
        assert_eq!(err, login_failed("state mismatch"));
        assert!(client.has_pending_login().await);
    }

    #[tokio::test]
    async fn test_complete_login_reports_provider_error() {
        let redirect = Arc::new(RecordingRedirect::default());
        let client = client(&redirect);

        let err = client
            .complete_login("http://localhost:4200/#error=access_denied&error_description=denied")
            .await
            .unwrap_err();
        assert_eq!(err, login_failed("access_denied denied"));
    }

    #[tokio::test]
    async fn test_complete_login_without_pending() {
        let redirect = Arc::new(RecordingRedirect::default());
        let client = client(&redirect);

        let err = client
            .complete_login("http://localhost:4200/?code=abc&state=s")
            .await
            .unwrap_err();
        assert_eq!(err, login_failed("no login in progress"));
    }

    #[tokio::test]
    async fn test_refresh_without_session_is_rejected() {
        let redirect = Arc::new(RecordingRedirect::default());
        let client = client(&redirect);

        assert!(!client.is_authenticated().await.unwrap());
        assert!(matches!(
            client.refresh_token(70).await,
            Err(AuthError::RefreshRejected { .. })
        ));
    }

    #[test]
    fn test_id_token_nonce() {
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"u","nonce":"n-123"}"#);
        assert_eq!(id_token_nonce(&format!("h.{payload}.s")), Some("n-123".to_string()));
        assert_eq!(id_token_nonce("garbage"), None);
    }
}
