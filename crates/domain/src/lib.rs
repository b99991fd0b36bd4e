//! Procura Domain - Core business types
//!
//! This crate defines the domain model for the Procura console:
//! tokens and claims, the derived session view, the authentication
//! error taxonomy, backend request/response values and the workflow
//! records returned by the procurement API.
//! All types here are pure Rust with no I/O dependencies.

pub mod auth;
pub mod error;
pub mod notice;
pub mod request;
pub mod response;
pub mod workflow;

pub use auth::{AuthError, Claims, RealmAccess, Session, Token};
pub use error::{DomainError, DomainResult};
pub use notice::{Notice, NoticeKind};
pub use request::{ApiRequest, HttpMethod};
pub use response::{ApiResponse, StatusCode};
