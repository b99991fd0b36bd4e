//! Clock port for wall-clock time

use chrono::{DateTime, Utc};

/// Port for reading the current wall-clock time.
///
/// Token expiry is judged against this clock so tests can pin it. Cooldown
/// gating uses the runtime's monotonic clock instead.
pub trait Clock: Send + Sync {
    /// Returns the current UTC timestamp.
    fn now(&self) -> DateTime<Utc>;

    /// Returns the current time as Unix epoch seconds.
    fn epoch_seconds(&self) -> i64 {
        self.now().timestamp()
    }
}
