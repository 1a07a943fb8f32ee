//! Clock implementations: the system clock and a manually driven one.

use std::sync::{Mutex, PoisonError};

use linewatch_domain::time::{self, Timestamp};

use crate::ports::Clock;

/// Wall-clock time from the operating system.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        time::now()
    }
}

/// A clock that only moves when told to. Used for replays and tests.
#[derive(Debug)]
pub struct ManualClock {
    current: Mutex<Timestamp>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: Timestamp) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }

    /// Jump to `at`.
    pub fn set(&self, at: Timestamp) {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = at;
    }

    /// Move forward by `delta`.
    pub fn advance(&self, delta: std::time::Duration) {
        let mut current = self.current.lock().unwrap_or_else(PoisonError::into_inner);
        if let Ok(delta) = chrono::TimeDelta::from_std(delta) {
            *current += delta;
        }
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new(time::now())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        *self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
