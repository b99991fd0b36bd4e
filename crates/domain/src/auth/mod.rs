//! Authentication domain types

mod claims;
mod error;
mod session;
mod token;

pub use claims::{Claims, RealmAccess};
pub use error::AuthError;
pub use session::Session;
pub use token::Token;
