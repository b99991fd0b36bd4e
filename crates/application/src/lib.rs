//! Procura Application - session lifecycle and backend services
//!
//! This crate holds the ports the console talks through, the
//! authentication core (token store, refresh controller, route guard,
//! request pipeline, session service), the typed backend services and
//! the notice mapping for failed calls.

pub mod api;
pub mod auth;
pub mod error;
pub mod notify;
pub mod ports;

#[cfg(test)]
mod test_support;

pub use error::{ApiError, ApiResult};
pub use notify::ErrorHandler;
