//! Voice command interpretation.
//!
//! # Responsibility
//! - Classify recognized text into an intent.
//! - Extract a normalized alarm time and a display label from set-alarm
//!   commands.
//!
//! # Invariants
//! - Everything here is pure: no store access, no clock reads, no I/O.

pub mod intent;
pub mod label;
pub mod time_parser;
