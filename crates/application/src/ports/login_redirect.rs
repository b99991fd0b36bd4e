//! Login redirect port

use url::Url;

/// Hands an authorization URL to whoever drives the user's browser.
pub trait LoginRedirect: Send + Sync {
    /// Sends the user to `url`.
    fn redirect(&self, url: &Url);
}
