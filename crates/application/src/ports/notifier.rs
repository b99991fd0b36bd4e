//! Notice display port

use procura_domain::Notice;

/// Shows short-lived notices to the user.
pub trait Notifier: Send + Sync {
    /// Displays `notice` for its kind's display time.
    fn notify(&self, notice: Notice);
}
