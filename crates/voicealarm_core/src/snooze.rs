//! Snooze handling for fired alarms.
//!
//! # Invariants
//! - Snoozing never reactivates the fired record; it yields a new one.
//! - The snooze time is wall-clock `now + delay`, so it may land in the
//!   other meridiem or past midnight.

use crate::model::alarm::ClockTime;
use crate::scheduler::FiredAlarm;
use chrono::{Duration, NaiveDateTime};

/// Default snooze delay in minutes.
pub const DEFAULT_SNOOZE_MINUTES: u32 = 5;

/// Suffix appended to labels of snoozed alarms.
pub const SNOOZED_SUFFIX: &str = " (Snoozed)";

/// User answer to the fired-alarm prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlarmChoice {
    Snooze,
    Dismiss,
}

/// Time and label for the alarm that replaces a snoozed one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SnoozePlan {
    pub time: ClockTime,
    pub label: String,
}

/// Computes the follow-up alarm for a snoozed fire.
pub fn snooze_alarm(fired: &FiredAlarm, now: NaiveDateTime, minutes: u32) -> SnoozePlan {
    let due = now + Duration::minutes(i64::from(minutes));
    SnoozePlan {
        time: ClockTime::from_datetime(due),
        label: format!("{}{SNOOZED_SUFFIX}", fired.label),
    }
}
