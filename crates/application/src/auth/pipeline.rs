//! Authenticated request pipeline.
//!
//! Every backend call goes through [`RequestPipeline::send`], which attaches
//! the bearer token and the fixed tenant headers, then turns the raw HTTP
//! status into an [`ApiError`]. A 401 on a decorated request is handed to
//! the [`RefreshController`] before being reported to the caller.

use std::sync::Arc;

use procura_domain::{ApiRequest, ApiResponse, AuthError};

use super::{RefreshController, TokenStore};
use crate::error::{ApiError, ApiResult};
use crate::ports::HttpClient;

/// Header carrying the tenant realm.
pub const REALM_HEADER: &str = "X-REALM";
/// Header carrying the calling application's source id.
pub const SOURCE_HEADER: &str = "X-SOURCE";

/// Fixed decoration values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineSettings {
    /// Value sent in `X-REALM`.
    pub realm: String,
    /// Value sent in `X-SOURCE`.
    pub source: String,
    /// Path fragments that are never decorated.
    pub excluded_paths: Vec<String>,
}

impl Default for PipelineSettings {
    fn default() -> Self {
        Self {
            realm: "usis".to_string(),
            source: "1".to_string(),
            excluded_paths: vec!["/assets".to_string(), "silent-check-sso".to_string()],
        }
    }
}

/// Decorates outbound requests and recovers from expired credentials.
pub struct RequestPipeline {
    inner: Arc<dyn HttpClient>,
    tokens: TokenStore,
    refresh: Arc<RefreshController>,
    settings: PipelineSettings,
}

impl RequestPipeline {
    /// Wraps `inner` with token decoration.
    pub fn new(
        inner: Arc<dyn HttpClient>,
        tokens: TokenStore,
        refresh: Arc<RefreshController>,
        settings: PipelineSettings,
    ) -> Self {
        Self {
            inner,
            tokens,
            refresh,
            settings,
        }
    }

    /// The shared refresh controller.
    #[must_use]
    pub const fn refresh_controller(&self) -> &Arc<RefreshController> {
        &self.refresh
    }

    /// Adds credentials to `request` unless it targets an excluded path or
    /// no token is held. Returns whether headers were added.
    async fn decorate(&self, request: &mut ApiRequest) -> bool {
        if request.path_contains_any(&self.settings.excluded_paths) {
            tracing::debug!(path = %request.path, "Excluded path, sending undecorated");
            return false;
        }
        let Some(token) = self.tokens.get().await else {
            tracing::debug!(path = %request.path, "No token held, sending undecorated");
            return false;
        };
        request.set_header("Authorization", token.authorization_header());
        request.set_header(REALM_HEADER, self.settings.realm.clone());
        request.set_header(SOURCE_HEADER, self.settings.source.clone());
        tracing::debug!(path = %request.path, token = %token.preview(), "Decorated request");
        true
    }

    /// Sends `request` and returns the response if its status is 2xx.
    ///
    /// # Errors
    ///
    /// - `ApiError::Unauthorized` for 401, after refresh recovery has run
    ///   for decorated requests. The request is not replayed.
    /// - `ApiError::Status` for any other non-success status.
    /// - `ApiError::Transport` when no response was received.
    pub async fn send(&self, mut request: ApiRequest) -> ApiResult<ApiResponse> {
        let decorated = self.decorate(&mut request).await;
        let method = request.method;
        let path = request.path.clone();

        let response = self.inner.execute(request).await.map_err(|error| {
            tracing::error!(%method, %path, %error, "HTTP error");
            ApiError::from(error)
        })?;

        if response.status.as_u16() == 401 {
            let error = AuthError::AuthenticationExpired;
            tracing::error!(%method, %path, %error, "HTTP error: 401 Unauthorized");
            if decorated {
                let outcome = self.refresh.handle_unauthorized().await;
                tracing::debug!(?outcome, "Refresh recovery finished");
            }
            return Err(ApiError::Unauthorized);
        }

        if !response.is_success() {
            tracing::error!(%method, %path, status = %response.status, "HTTP error");
            return Err(ApiError::Status {
                status: response.status.as_u16(),
                message: response.error_message(),
            });
        }

        Ok(response)
    }
}
