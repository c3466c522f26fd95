//! Alarm domain model.
//!
//! # Responsibility
//! - Define the canonical alarm record and its normalized time-of-day value.
//! - Keep formatting of `HH:MM AM/PM` in exactly one place.
//!
//! # Invariants
//! - Every alarm time is a validated 12-hour `ClockTime`.
//! - `time` and `label` never change after creation; only `active` does.

pub mod alarm;
