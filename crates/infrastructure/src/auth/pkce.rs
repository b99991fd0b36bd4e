//! Authorization code + PKCE (RFC 7636) helpers.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use sha2::{Digest, Sha256};

/// Generates a PKCE code verifier (43 URL-safe characters).
#[must_use]
pub fn generate_code_verifier() -> String {
    random_token()
}

/// Computes `code_challenge = base64url_nopad(sha256(verifier))`.
#[must_use]
pub fn compute_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Generates a random `state` parameter.
#[must_use]
pub fn generate_state() -> String {
    random_token()
}

fn random_token() -> String {
    let mut bytes = [0u8; 32];
    rand::rng().fill(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}
