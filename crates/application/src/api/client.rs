//! Typed helpers over the request pipeline.

use std::sync::Arc;

use procura_domain::ApiRequest;
use serde::de::DeserializeOwned;

use crate::auth::RequestPipeline;
use crate::error::{ApiError, ApiResult};

/// Thin typed wrapper shared by the backend services.
#[derive(Clone)]
pub struct ApiClient {
    pipeline: Arc<RequestPipeline>,
}

impl ApiClient {
    /// Creates a client sending through `pipeline`.
    #[must_use]
    pub const fn new(pipeline: Arc<RequestPipeline>) -> Self {
        Self { pipeline }
    }

    /// Sends `request` and decodes the JSON body as `T`.
    ///
    /// # Errors
    ///
    /// Returns the pipeline's error, or `ApiError::Decode` if the body does
    /// not match `T`.
    pub async fn json<T: DeserializeOwned>(&self, request: ApiRequest) -> ApiResult<T> {
        let response = self.pipeline.send(request).await?;
        response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    /// Sends `request` and returns the body as text.
    ///
    /// # Errors
    ///
    /// Returns the pipeline's error.
    pub async fn text(&self, request: ApiRequest) -> ApiResult<String> {
        Ok(self.pipeline.send(request).await?.text())
    }

    /// Sends `request` and returns the raw body.
    ///
    /// # Errors
    ///
    /// Returns the pipeline's error.
    pub async fn bytes(&self, request: ApiRequest) -> ApiResult<Vec<u8>> {
        Ok(self.pipeline.send(request).await?.body)
    }

    /// Sends a command and returns its JSON answer, `Null` for an empty
    /// body.
    ///
    /// # Errors
    ///
    /// Returns the pipeline's error, or `ApiError::Decode` for a non-JSON
    /// body.
    pub async fn command(&self, request: ApiRequest) -> ApiResult<serde_json::Value> {
        let response = self.pipeline.send(request).await?;
        if response.body.iter().all(u8::is_ascii_whitespace) {
            return Ok(serde_json::Value::Null);
        }
        response
            .json()
            .map_err(|e| ApiError::Decode(e.to_string()))
    }
}

impl std::fmt::Debug for ApiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient").finish_non_exhaustive()
    }
}


#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::test_support::MockHttpClient;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_command_empty_body_is_null() {
        let http = Arc::new(MockHttpClient::respond_all(200, ""));
        let client = testing::client(&http).await;

        let value = client.command(ApiRequest::put("/api/bpa/claim")).await.unwrap();
        assert_eq!(value, serde_json::Value::Null);
    }

    #[tokio::test]
    async fn test_json_decode_error() {
        let http = Arc::new(MockHttpClient::respond_all(200, "<html>"));
        let client = testing::client(&http).await;

        let err = client
            .json::<Vec<String>>(ApiRequest::get("/pro/api/emails/po-numbers"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Decode(_)));
    }
}
