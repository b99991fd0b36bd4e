//! In-memory doubles shared by the unit tests of this crate.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic, dead_code)]

use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use procura_domain::{ApiRequest, ApiResponse, AuthError, Claims, Notice, RealmAccess, Token};

use crate::auth::TokenStore;
use crate::ports::{
    Clock, HttpClient, HttpClientError, IdentityClient, Notifier, SessionStorage,
    SessionStorageError,
};

/// Builds a token for `value` expiring at `exp` (epoch seconds).
pub fn token(value: &str, exp: i64) -> Token {
    Token::from_parts(
        value,
        Claims {
            sub: "7f9c0d1e-user".to_string(),
            exp,
            iat: Some(exp - 300),
            preferred_username: Some("jdoe".to_string()),
            email: Some("jdoe@example.com".to_string()),
            email_verified: Some(true),
            given_name: Some("Jane".to_string()),
            family_name: Some("Doe".to_string()),
            name: None,
            realm_access: Some(RealmAccess {
                roles: vec!["buyer".to_string(), "approver".to_string()],
            }),
        },
    )
}

/// Identity provider double that counts calls.
#[derive(Default)]
pub struct MockIdentity {
    pub authenticated: AtomicBool,
    pub fail_check: AtomicBool,
    pub refresh_results: Mutex<VecDeque<Result<bool, AuthError>>>,
    pub refresh_delay: Mutex<Option<Duration>>,
    pub refresh_calls: AtomicUsize,
    pub login_targets: Mutex<Vec<String>>,
    pub logout_targets: Mutex<Vec<String>>,
    pub tokens: Option<TokenStore>,
    pub refreshed_token: Mutex<Option<Token>>,
}

impl MockIdentity {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tokens(tokens: TokenStore) -> Self {
        Self {
            tokens: Some(tokens),
            ..Self::default()
        }
    }

    pub fn push_refresh(&self, result: Result<bool, AuthError>) {
        self.refresh_results.lock().unwrap().push_back(result);
    }

    pub fn set_refresh_delay(&self, delay: Duration) {
        *self.refresh_delay.lock().unwrap() = Some(delay);
    }

    pub fn refresh_count(&self) -> usize {
        self.refresh_calls.load(Ordering::SeqCst)
    }

    pub fn logins(&self) -> Vec<String> {
        self.login_targets.lock().unwrap().clone()
    }

    pub fn logouts(&self) -> Vec<String> {
        self.logout_targets.lock().unwrap().clone()
    }
}

#[async_trait]
impl IdentityClient for MockIdentity {
    async fn is_authenticated(&self) -> Result<bool, AuthError> {
        if self.fail_check.load(Ordering::SeqCst) {
            return Err(AuthError::ProviderUnreachable {
                message: "connection refused".to_string(),
            });
        }
        Ok(self.authenticated.load(Ordering::SeqCst))
    }

    async fn login(&self, redirect_target: &str) -> Result<(), AuthError> {
        self.login_targets
            .lock()
            .unwrap()
            .push(redirect_target.to_string());
        Ok(())
    }

    async fn logout(&self, post_logout_target: &str) -> Result<(), AuthError> {
        self.logout_targets
            .lock()
            .unwrap()
            .push(post_logout_target.to_string());
        if let Some(tokens) = &self.tokens {
            tokens.clear().await;
        }
        Ok(())
    }

    async fn refresh_token(&self, _min_validity_secs: i64) -> Result<bool, AuthError> {
        self.refresh_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *self.refresh_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        let result = self
            .refresh_results
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Ok(false));
        if matches!(result, Ok(true)) {
            let next = self.refreshed_token.lock().unwrap().clone();
            if let (Some(tokens), Some(next)) = (&self.tokens, next) {
                tokens.set(next).await;
            }
        }
        result
    }
}

/// Canned backend that records every request it receives.
#[derive(Default)]
pub struct MockHttpClient {
    pub routes: Mutex<HashMap<String, (u16, Vec<u8>)>>,
    pub fallback: Mutex<Option<(u16, Vec<u8>)>>,
    pub transport_error: Mutex<Option<HttpClientError>>,
    pub delay: Mutex<Option<Duration>>,
    pub requests: Mutex<Vec<ApiRequest>>,
}

impl MockHttpClient {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers every request with `status` and `body`.
    pub fn respond_all(status: u16, body: &str) -> Self {
        let client = Self::default();
        *client.fallback.lock().unwrap() = Some((status, body.as_bytes().to_vec()));
        client
    }

    /// Answers requests for exactly `path` with `status` and `body`.
    pub fn route(self, path: &str, status: u16, body: &str) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), (status, body.as_bytes().to_vec()));
        self
    }

    pub fn fail_with(self, error: HttpClientError) -> Self {
        *self.transport_error.lock().unwrap() = Some(error);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().unwrap() = Some(delay);
        self
    }

    pub fn recorded(&self) -> Vec<ApiRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn last(&self) -> ApiRequest {
        self.requests.lock().unwrap().last().cloned().unwrap()
    }
}

#[async_trait]
impl HttpClient for MockHttpClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, HttpClientError> {
        self.requests.lock().unwrap().push(request.clone());
        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(error) = self.transport_error.lock().unwrap().clone() {
            return Err(error);
        }
        let canned = self
            .routes
            .lock()
            .unwrap()
            .get(&request.path)
            .cloned()
            .or_else(|| self.fallback.lock().unwrap().clone())
            .unwrap_or((404, br#"{"message":"no route"}"#.to_vec()));
        let mut headers = HashMap::new();
        headers.insert("content-type".to_string(), "application/json".to_string());
        Ok(ApiResponse::new(canned.0, headers, canned.1))
    }
}

/// Clock pinned to a fixed instant.
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Notifier that keeps every notice.
#[derive(Default)]
pub struct RecordingNotifier {
    pub notices: Mutex<Vec<Notice>>,
}

impl RecordingNotifier {
    pub fn seen(&self) -> Vec<Notice> {
        self.notices.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notice: Notice) {
        self.notices.lock().unwrap().push(notice);
    }
}

/// Session storage backed by a map.
#[derive(Default)]
pub struct MemoryStorage {
    pub items: Mutex<HashMap<String, String>>,
}

#[async_trait]
impl SessionStorage for MemoryStorage {
    async fn set_item(&self, key: &str, value: &str) -> Result<(), SessionStorageError> {
        self.items
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn get_item(&self, key: &str) -> Result<Option<String>, SessionStorageError> {
        Ok(self.items.lock().unwrap().get(key).cloned())
    }

    async fn remove_item(&self, key: &str) -> Result<(), SessionStorageError> {
        self.items.lock().unwrap().remove(key);
        Ok(())
    }
}
