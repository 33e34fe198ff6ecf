//! Clock port, so freshness checks and timestamps are testable.

use chrono::{DateTime, Utc};

/// Clock port trait
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    /// Seconds since the Unix epoch.
    fn unix_now(&self) -> u64 {
        self.now().timestamp().max(0) as u64
    }
}

/// Wall clock implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}
