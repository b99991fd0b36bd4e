//! System clock adapter

use chrono::{DateTime, Utc};
use procura_application::ports::Clock;

/// Wall clock backed by the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl SystemClock {
    /// Creates a new system clock.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_seconds_tracks_now() {
        let clock = SystemClock::new();
        let before = Utc::now().timestamp();
        let seen = clock.epoch_seconds();
        assert!(seen >= before);
        assert!(seen - before < 5);
    }
}
