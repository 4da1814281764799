//! Wall-clock abstraction
//!
//! Ledger, meter and session code read "now" through [`Clock`] so that day and
//! month rollovers can be driven deterministically in tests.

use chrono::{DateTime, Duration, FixedOffset, Local};
use std::sync::{Arc, Mutex};

use crate::utils::lock_or_recover;

/// Source of the current local wall-clock time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Shared clock handle
pub type SharedClock = Arc<dyn Clock>;

/// Reads the system clock in the user's local timezone
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().into()
    }
}

/// Clock that only moves when told to
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<DateTime<FixedOffset>>,
}

impl ManualClock {
    pub fn new(start: DateTime<FixedOffset>) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    /// Parse an RFC 3339 timestamp as the starting instant
    pub fn at(rfc3339: &str) -> Result<Self, chrono::ParseError> {
        DateTime::parse_from_rfc3339(rfc3339).map(Self::new)
    }

    pub fn set(&self, at: DateTime<FixedOffset>) {
        *lock_or_recover(&self.now) = at;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = lock_or_recover(&self.now);
        *now = *now + by;
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<FixedOffset> {
        *lock_or_recover(&self.now)
    }
}
