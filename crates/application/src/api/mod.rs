//! Typed clients for the procurement backend.
//!
//! Every call goes through the [`RequestPipeline`](crate::auth::RequestPipeline),
//! so all of them carry the session's credentials and share its 401
//! recovery.

mod client;
mod emails;
mod ledger;
mod procurement;
mod tasks;

pub use client::ApiClient;
pub use emails::{DEFAULT_RECENT_DAYS as DEFAULT_EMAIL_DAYS, EmailService};
pub use ledger::{DEFAULT_RECENT_DAYS as DEFAULT_LEDGER_DAYS, LedgerService};
pub use procurement::{InventoryService, OrderService};
pub use tasks::TaskService;
