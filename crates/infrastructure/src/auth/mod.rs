//! Identity provider adapters.

mod keycloak;
mod pkce;

pub use keycloak::{KeycloakClient, OidcSettings};
pub use pkce::{compute_code_challenge, generate_code_verifier, generate_state};
