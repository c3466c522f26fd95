//! Wall-clock access.
//!
//! Core logic never calls `Local::now()` directly; it goes through
//! `Clock` so tests and replays can pin the time.

use chrono::{Duration, Local, NaiveDateTime, Timelike};
use std::sync::Mutex;

/// Source of the current local wall-clock time.
pub trait Clock: Send + Sync {
    fn now(&self) -> NaiveDateTime;

    /// Current hour on the 24-hour dial.
    fn current_hour(&self) -> u32 {
        self.now().hour()
    }
}

/// Local system time.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Settable clock for tests and scripted sessions.
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<NaiveDateTime>,
}

impl ManualClock {
    pub fn new(start: NaiveDateTime) -> Self {
        Self {
            now: Mutex::new(start),
        }
    }

    pub fn set(&self, value: NaiveDateTime) {
        *self.lock() = value;
    }

    pub fn advance(&self, by: Duration) {
        let mut now = self.lock();
        *now += by;
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NaiveDateTime> {
        // A poisoned clock still holds a valid timestamp.
        self.now.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Clock for ManualClock {
    fn now(&self) -> NaiveDateTime {
        *self.lock()
    }
}

/// Live clock-face rendering with seconds, e.g. `06:59:50 AM`.
pub fn display_time(now: NaiveDateTime) -> String {
    now.format("%I:%M:%S %p").to_string()
}

/// Minute-granularity rendering used in spoken responses.
pub fn spoken_time(now: NaiveDateTime) -> String {
    now.format("%I:%M %p").to_string()
}
