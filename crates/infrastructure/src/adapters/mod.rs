//! Adapters for the application's transport and time ports.

mod reqwest_client;
mod system_clock;

pub use reqwest_client::{DEFAULT_TIMEOUT, ReqwestHttpClient};
pub use system_clock::SystemClock;
