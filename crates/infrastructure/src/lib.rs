//! Procura Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer: the reqwest transport, the
//! Keycloak-style identity client, session storage and configuration.

pub mod adapters;
pub mod auth;
pub mod config;
pub mod persistence;

pub use adapters::{ReqwestHttpClient, SystemClock};
pub use auth::{KeycloakClient, OidcSettings};
pub use config::{AppConfig, ConfigError};
pub use persistence::{FileSessionStorage, MemorySessionStorage};
