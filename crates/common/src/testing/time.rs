//! Controllable clock for deterministic expiry tests

use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::time::Clock;

/// Mock clock for deterministic testing
///
/// Clones share the same time, so a test can keep one handle and advance
/// the clock owned by the code under test.
#[derive(Debug, Clone)]
pub struct MockClock {
    now: Arc<Mutex<DateTime<Utc>>>,
}

impl MockClock {
    /// Create a new mock clock starting at the current time
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    /// Create a new mock clock starting at `start`
    pub fn at(start: DateTime<Utc>) -> Self {
        Self { now: Arc::new(Mutex::new(start)) }
    }

    /// Move time forward
    pub fn advance(&self, duration: Duration) {
        // SAFETY: Mutex poisoning is acceptable in test mocks
        let delta = TimeDelta::from_std(duration).unwrap();
        *self.now.lock().unwrap() += delta;
    }

    pub fn advance_secs(&self, secs: i64) {
        *self.now.lock().unwrap() += TimeDelta::seconds(secs);
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.now.lock().unwrap() = now;
    }
}

impl Default for MockClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MockClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.lock().map(|now| *now).unwrap_or_else(|_| Utc::now())
    }
}
