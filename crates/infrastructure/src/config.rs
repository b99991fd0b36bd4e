//! Layered application configuration.
//!
//! Values come from built-in defaults, then an optional TOML file, then
//! `PROCURA__`-prefixed environment variables (`PROCURA__IDENTITY__REALM`).

use std::path::{Path, PathBuf};
use std::time::Duration;

use ::config::{Config, Environment, File};
use procura_application::auth::{PipelineSettings, RefreshPolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::auth::OidcSettings;

/// Default configuration file name, looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "procura.toml";

/// Prefix of configuration environment variables.
pub const ENV_PREFIX: &str = "PROCURA";

/// Shortest delay allowed before a forced login.
const MIN_LOGIN_DELAY_MS: u64 = 1000;
/// Upper bound for `refresh.min_validity_secs`: one day.
const MAX_MIN_VALIDITY_SECS: i64 = 86_400;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or parsed.
    #[error("failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    /// A value was read but is not acceptable.
    #[error("invalid configuration value for {field}: {message}")]
    Invalid {
        /// Dotted key of the offending value.
        field: &'static str,
        /// What is wrong with it.
        message: String,
    },
}

/// Identity provider section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdentityConfig {
    /// Provider base URL.
    pub url: String,
    /// Realm name.
    pub realm: String,
    /// Public client id.
    pub client_id: String,
    /// Redirect URI registered for the client.
    pub redirect_uri: String,
    /// Requested scopes.
    pub scope: String,
}

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
            realm: "usis".to_string(),
            client_id: "slm".to_string(),
            redirect_uri: "http://localhost:4200/".to_string(),
            scope: "openid".to_string(),
        }
    }
}

/// Fixed headers added to authenticated requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadersConfig {
    /// `X-REALM` value.
    pub realm: String,
    /// `X-SOURCE` value.
    pub source: String,
}

impl Default for HeadersConfig {
    fn default() -> Self {
        let settings = PipelineSettings::default();
        Self {
            realm: settings.realm,
            source: settings.source,
        }
    }
}

/// Token refresh tuning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Refresh attempts before a forced login.
    pub max_attempts: u32,
    /// Minimum spacing of refresh attempts.
    pub cooldown_ms: u64,
    /// Validity below which a refresh is performed.
    pub min_validity_secs: i64,
    /// Delay before a forced login.
    pub login_delay_ms: u64,
    /// Period of the background refresh loop.
    pub background_interval_secs: u64,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            cooldown_ms: 5000,
            min_validity_secs: 70,
            login_delay_ms: 1000,
            background_interval_secs: 60,
        }
    }
}

/// Complete application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Origin of the backend API.
    pub api_base_url: String,
    /// Origin the console is served from; login targets are built on it.
    pub app_origin: String,
    /// Mount point of the task API.
    pub task_api_prefix: String,
    /// Identity provider.
    pub identity: IdentityConfig,
    /// Decoration headers.
    pub headers: HeadersConfig,
    /// Refresh tuning.
    pub refresh: RefreshConfig,
    /// Path fragments never decorated with credentials.
    pub excluded_paths: Vec<String>,
    /// Directory for the session token mirror.
    pub session_storage_dir: Option<PathBuf>,
    /// Per-request timeout for backend calls.
    pub request_timeout_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:4200".to_string(),
            app_origin: "http://localhost:4200".to_string(),
            task_api_prefix: "/api".to_string(),
            identity: IdentityConfig::default(),
            headers: HeadersConfig::default(),
            refresh: RefreshConfig::default(),
            excluded_paths: PipelineSettings::default().excluded_paths,
            session_storage_dir: None,
            request_timeout_ms: 30_000,
        }
    }
}

impl AppConfig {
    /// Loads defaults, then `file` if it exists, then the environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Load` if a source is malformed and
    /// `ConfigError::Invalid` if a value fails validation.
    pub fn load(file: Option<&Path>) -> Result<Self, ConfigError> {
        let file = file.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
        let config: Self = Config::builder()
            .add_source(Config::try_from(&Self::default())?)
            .add_source(File::from(file).required(false))
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("excluded_paths"),
            )
            .build()?
            .try_deserialize()?;

        config.validate()?;
        tracing::debug!(file = %file.display(), api = %config.api_base_url, "Configuration loaded");
        Ok(config)
    }

    /// Checks values the type system cannot.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first bad value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_url("api_base_url", &self.api_base_url)?;
        check_url("app_origin", &self.app_origin)?;
        check_url("identity.url", &self.identity.url)?;
        check_url("identity.redirect_uri", &self.identity.redirect_uri)?;

        if self.identity.realm.trim().is_empty() {
            return Err(invalid("identity.realm", "must not be empty"));
        }
        if self.identity.client_id.trim().is_empty() {
            return Err(invalid("identity.client_id", "must not be empty"));
        }
        if self.refresh.max_attempts == 0 {
            return Err(invalid("refresh.max_attempts", "must be at least 1"));
        }
        if self.refresh.login_delay_ms < MIN_LOGIN_DELAY_MS {
            return Err(invalid(
                "refresh.login_delay_ms",
                format!("must be at least {MIN_LOGIN_DELAY_MS}"),
            ));
        }
        if !(0..=MAX_MIN_VALIDITY_SECS).contains(&self.refresh.min_validity_secs) {
            return Err(invalid(
                "refresh.min_validity_secs",
                format!("must be between 0 and {MAX_MIN_VALIDITY_SECS}"),
            ));
        }
        if self.refresh.background_interval_secs == 0 {
            return Err(invalid("refresh.background_interval_secs", "must be positive"));
        }
        if !self.task_api_prefix.starts_with('/') {
            return Err(invalid("task_api_prefix", "must start with '/'"));
        }
        Ok(())
    }

    /// Refresh policy for the request pipeline.
    #[must_use]
    pub const fn refresh_policy(&self) -> RefreshPolicy {
        RefreshPolicy {
            max_attempts: self.refresh.max_attempts,
            cooldown: Duration::from_millis(self.refresh.cooldown_ms),
            min_validity_secs: self.refresh.min_validity_secs,
            login_delay: Duration::from_millis(self.refresh.login_delay_ms),
        }
    }

    /// Decoration settings for the request pipeline.
    #[must_use]
    pub fn pipeline_settings(&self) -> PipelineSettings {
        PipelineSettings {
            realm: self.headers.realm.clone(),
            source: self.headers.source.clone(),
            excluded_paths: self.excluded_paths.clone(),
        }
    }

    /// Identity provider settings.
    #[must_use]
    pub fn oidc_settings(&self) -> OidcSettings {
        OidcSettings {
            url: self.identity.url.clone(),
            realm: self.identity.realm.clone(),
            client_id: self.identity.client_id.clone(),
            redirect_uri: self.identity.redirect_uri.clone(),
            scope: self.identity.scope.clone(),
        }
    }

    /// Background refresh period.
    #[must_use]
    pub const fn background_interval(&self) -> Duration {
        Duration::from_secs(self.refresh.background_interval_secs)
    }

    /// Backend request timeout.
    #[must_use]
    pub const fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    /// Session directory, falling back to the user cache directory.
    #[must_use]
    pub fn session_dir(&self) -> PathBuf {
        self.session_storage_dir.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(std::env::temp_dir)
                .join("procura")
                .join("session")
        })
    }
}

fn check_url(field: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| invalid(field, format!("{value:?} is not a URL: {e}")))
}

fn invalid(field: &'static str, message: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        message: message.into(),
    }
}
