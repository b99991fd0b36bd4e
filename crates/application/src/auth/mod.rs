//! Session lifecycle core.
//!
//! This module provides:
//! - Shared in-memory token storage
//! - The 401 refresh controller with cooldown and attempt limits
//! - The route guard
//! - The authenticated request pipeline
//! - The session service (identity facts, manual refresh, logout)

mod gate;
mod pipeline;
mod refresh;
mod session;
mod token_store;

pub use gate::{AuthGate, Navigation};
pub use pipeline::{PipelineSettings, REALM_HEADER, RequestPipeline, SOURCE_HEADER};
pub use refresh::{
    RefreshAction, RefreshController, RefreshEvent, RefreshOutcome, RefreshPhase, RefreshPolicy,
    RefreshState,
};
pub use session::{SessionService, TOKEN_SLOT};
pub use token_store::{TokenStatus, TokenStore};
