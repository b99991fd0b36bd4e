//! HTTP Client implementation using reqwest.
//!
//! This adapter implements the `HttpClient` port using the reqwest library.
//! Request paths are resolved against the configured backend base URL.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use procura_application::ports::{HttpClient, HttpClientError};
use procura_domain::{ApiRequest, ApiResponse, HttpMethod};
use reqwest::{Client, Method, Url};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP client implementation using reqwest.
pub struct ReqwestHttpClient {
    client: Client,
    base_url: Url,
    timeout: Duration,
}

impl ReqwestHttpClient {
    /// Creates a client for the backend at `base_url`.
    ///
    /// Default configuration:
    /// - Follow redirects: up to 10
    /// - TLS verification: enabled
    /// - User-Agent: "Procura/<version>"
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL or the
    /// client cannot be created.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, HttpClientError> {
        let client = Client::builder()
            .user_agent(concat!("Procura/", env!("CARGO_PKG_VERSION")))
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| HttpClientError::Other(e.to_string()))?;

        Self::with_client(client, base_url, timeout)
    }

    /// Creates a client with a custom reqwest client.
    ///
    /// # Errors
    ///
    /// Returns an error if `base_url` is not a valid absolute URL.
    pub fn with_client(
        client: Client,
        base_url: &str,
        timeout: Duration,
    ) -> Result<Self, HttpClientError> {
        let mut base_url =
            Url::parse(base_url).map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {base_url}")))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
        }
    }

    /// Resolves a request path and query against the base URL.
    fn build_url(&self, request: &ApiRequest) -> Result<Url, HttpClientError> {
        let relative = request.path.trim_start_matches('/');
        let mut url = self
            .base_url
            .join(relative)
            .map_err(|e| HttpClientError::InvalidUrl(format!("{e}: {}", request.path)))?;
        if !request.query.is_empty() {
            url.query_pairs_mut().extend_pairs(&request.query);
        }
        Ok(url)
    }

    /// Maps reqwest errors to the port's `HttpClientError`.
    fn map_error(error: &reqwest::Error, timeout_ms: u64) -> HttpClientError {
        if error.is_timeout() {
            return HttpClientError::Timeout { timeout_ms };
        }

        if error.is_connect() {
            let message = error.to_string();
            let lowered = message.to_lowercase();
            if lowered.contains("dns") || lowered.contains("resolve") {
                return HttpClientError::DnsError {
                    host: error
                        .url()
                        .and_then(|u| u.host_str().map(String::from))
                        .unwrap_or_else(|| "unknown".to_string()),
                    message,
                };
            }
            return HttpClientError::ConnectionFailed(message);
        }

        HttpClientError::Other(error.to_string())
    }
}

#[async_trait]
impl HttpClient for ReqwestHttpClient {
    async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, HttpClientError> {
        let url = self.build_url(&request)?;
        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);

        let start = Instant::now();

        let mut builder = self
            .client
            .request(Self::to_reqwest_method(request.method), url)
            .timeout(self.timeout);

        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| Self::map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();

        let headers: HashMap<String, String> = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        let body = response
            .bytes()
            .await
            .map_err(|e| HttpClientError::Other(format!("Failed to read body: {e}")))?
            .to_vec();

        Ok(ApiResponse::new(status, headers, body).with_duration(start.elapsed()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_reqwest_method() {
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Get),
            Method::GET
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Put),
            Method::PUT
        );
        assert_eq!(
            ReqwestHttpClient::to_reqwest_method(HttpMethod::Post),
            Method::POST
        );
    }

    #[test]
    fn test_build_url_joins_base_path() {
        let client = ReqwestHttpClient::new("https://gateway.example.edu/console", DEFAULT_TIMEOUT).unwrap();

        let url = client
            .build_url(&ApiRequest::get("/api/bpa/task/ready").query("offset", 0).query("filter[title][filter]", "lap top"))
            .unwrap();

        assert_eq!(url.path(), "/console/api/bpa/task/ready");
        assert_eq!(
            url.query(),
            Some("offset=0&filter%5Btitle%5D%5Bfilter%5D=lap+top")
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            ReqwestHttpClient::new("not a url", DEFAULT_TIMEOUT),
            Err(HttpClientError::InvalidUrl(_))
        ));
    }

    #[tokio::test]
    async fn test_connection_failure_maps() {
        let client = ReqwestHttpClient::new("http://127.0.0.1:1", Duration::from_secs(2)).unwrap();

        let err = client.execute(ApiRequest::get("/pro/api/gl")).await.unwrap_err();
        assert!(matches!(
            err,
            HttpClientError::ConnectionFailed(_) | HttpClientError::Other(_) | HttpClientError::Timeout { .. }
        ));
    }
}
