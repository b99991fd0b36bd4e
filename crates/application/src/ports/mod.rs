//! Port definitions (interfaces)
//!
//! Ports define the boundaries between the application core and external systems.
//! Each port is a trait that can be implemented by adapters in the infrastructure layer.

mod clock;
mod http_client;
mod identity;
mod login_redirect;
mod notifier;
mod session_storage;

pub use clock::Clock;
pub use http_client::{HttpClient, HttpClientError};
pub use identity::IdentityClient;
pub use login_redirect::LoginRedirect;
pub use notifier::Notifier;
pub use session_storage::{SessionStorage, SessionStorageError};
