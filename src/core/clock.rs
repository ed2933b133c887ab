//! Clock
//!
//! Wall-clock source (for dependency injection).

use chrono::{DateTime, Duration, Utc};
use std::sync::{Mutex, PoisonError};

/// Clock interface.
pub trait Clock: Send + Sync {
    /// Current time.
    fn now(&self) -> DateTime<Utc>;
}

/// System wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Manually driven clock for testing.
pub struct MockClock {
    now: Mutex<DateTime<Utc>>,
}

impl MockClock {
    /// Create mock clock frozen at `now`.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now: Mutex::new(now),
        }
    }

    /// Create mock clock frozen at the current wall-clock time.
    pub fn starting_now() -> Self {
        Self::new(Utc::now())
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) -> &Self {
        let mut now = self.now.lock().unwrap_or_else(PoisonError::into_inner);
        *now += by;
        self
    }

    /// Set the clock to an absolute time.
    pub fn set(&self, to: DateTime<Utc>) -> &Self {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner) = to;
        self
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::starting_now()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        *self.now.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
