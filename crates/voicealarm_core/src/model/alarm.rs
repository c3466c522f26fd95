//! Alarm domain model.
//!
//! # Responsibility
//! - Define the canonical alarm record shared by voice, manual and
//!   scheduler paths.
//! - Own the canonical `HH:MM AM/PM` rendering used as the firing key.
//!
//! # Invariants
//! - `ClockTime.hour` is in `1..=12`, `ClockTime.minute` in `0..=59`.
//! - Rendering always zero-pads hour and minute and upper-cases meridiem.
//! - `Alarm.label` is never empty.
//! - `active` goes from `true` to `false` exactly once, on fire.

use chrono::{NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Stable identifier for one alarm record.
///
/// Index positions shift on deletion, so the scheduler addresses
/// records by ID instead.
pub type AlarmId = Uuid;

/// AM/PM designator for 12-hour time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Meridiem {
    Am,
    Pm,
}

impl Meridiem {
    /// Canonical uppercase suffix.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Am => "AM",
            Self::Pm => "PM",
        }
    }

    /// Normalizes a spoken or typed marker such as `p.m.`, `Pm` or `AM`.
    ///
    /// Returns `None` when the marker does not start with `a` or `p`.
    pub fn from_marker(marker: &str) -> Option<Self> {
        let cleaned: String = marker
            .chars()
            .filter(|ch| *ch != '.' && !ch.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        match cleaned.as_str() {
            "A" | "AM" => Some(Self::Am),
            "P" | "PM" => Some(Self::Pm),
            _ => None,
        }
    }
}

impl Display for Meridiem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Validation error for out-of-range 12-hour values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClockTimeError {
    HourOutOfRange(u32),
    MinuteOutOfRange(u32),
    Malformed(String),
}

impl Display for ClockTimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HourOutOfRange(hour) => write!(f, "hour {hour} is outside 1..=12"),
            Self::MinuteOutOfRange(minute) => write!(f, "minute {minute} is outside 0..=59"),
            Self::Malformed(value) => write!(f, "`{value}` is not a canonical HH:MM AM/PM time"),
        }
    }
}

impl Error for ClockTimeError {}

/// Normalized 12-hour time of day with minute granularity.
///
/// Equality on this type is the scheduler's firing key: two values are
/// equal exactly when their canonical renderings are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ClockTime {
    hour: u8,
    minute: u8,
    meridiem: Meridiem,
}

impl ClockTime {
    /// Builds a validated 12-hour time.
    pub fn new(hour: u32, minute: u32, meridiem: Meridiem) -> Result<Self, ClockTimeError> {
        if !(1..=12).contains(&hour) {
            return Err(ClockTimeError::HourOutOfRange(hour));
        }
        if minute > 59 {
            return Err(ClockTimeError::MinuteOutOfRange(minute));
        }
        Ok(Self {
            hour: hour as u8,
            minute: minute as u8,
            meridiem,
        })
    }

    /// Projects a wall-clock instant onto its minute, dropping seconds.
    pub fn from_datetime(now: NaiveDateTime) -> Self {
        let (is_pm, hour) = now.hour12();
        Self {
            hour: hour as u8,
            minute: now.minute() as u8,
            meridiem: if is_pm { Meridiem::Pm } else { Meridiem::Am },
        }
    }

    /// Parses only the canonical `HH:MM AM` rendering.
    pub fn parse_canonical(value: &str) -> Result<Self, ClockTimeError> {
        let malformed = || ClockTimeError::Malformed(value.to_string());
        let (clock, suffix) = value.split_once(' ').ok_or_else(malformed)?;
        let (hour, minute) = clock.split_once(':').ok_or_else(malformed)?;
        if hour.len() != 2 || minute.len() != 2 || (suffix != "AM" && suffix != "PM") {
            return Err(malformed());
        }
        let hour: u32 = hour.parse().map_err(|_| malformed())?;
        let minute: u32 = minute.parse().map_err(|_| malformed())?;
        let meridiem = Meridiem::from_marker(suffix).ok_or_else(malformed)?;
        Self::new(hour, minute, meridiem)
    }

    pub fn hour(&self) -> u32 {
        u32::from(self.hour)
    }

    pub fn minute(&self) -> u32 {
        u32::from(self.minute)
    }

    pub fn meridiem(&self) -> Meridiem {
        self.meridiem
    }

    /// Hour on the 24-hour dial (`0..=23`).
    pub fn hour24(&self) -> u32 {
        match (self.meridiem, self.hour) {
            (Meridiem::Am, 12) => 0,
            (Meridiem::Am, hour) => u32::from(hour),
            (Meridiem::Pm, 12) => 12,
            (Meridiem::Pm, hour) => u32::from(hour) + 12,
        }
    }
}

impl Display for ClockTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:02}:{:02} {}", self.hour, self.minute, self.meridiem)
    }
}

impl TryFrom<String> for ClockTime {
    type Error = ClockTimeError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse_canonical(&value)
    }
}

impl From<ClockTime> for String {
    fn from(value: ClockTime) -> Self {
        value.to_string()
    }
}

/// Validation failure when constructing an alarm record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlarmValidationError {
    EmptyLabel,
}

impl Display for AlarmValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyLabel => write!(f, "alarm label must not be empty"),
        }
    }
}

impl Error for AlarmValidationError {}

/// One user alarm intent.
///
/// Duplicates are allowed; two alarms with the same time and label are
/// independent records with distinct IDs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alarm {
    pub id: AlarmId,
    pub time: ClockTime,
    pub label: String,
    pub active: bool,
}

impl Alarm {
    /// Creates an active alarm with a fresh ID.
    pub fn new(time: ClockTime, label: impl Into<String>) -> Result<Self, AlarmValidationError> {
        let label = label.into();
        if label.trim().is_empty() {
            return Err(AlarmValidationError::EmptyLabel);
        }
        Ok(Self {
            id: Uuid::new_v4(),
            time,
            label,
            active: true,
        })
    }

    /// Transitions the alarm to its fired state.
    ///
    /// Returns `false` when it was already inactive, so callers can use
    /// the return value as a fire-once guard.
    pub fn mark_fired(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        was_active
    }

    /// List-box rendering, e.g. `✓ 07:00 AM - Wake Up`.
    pub fn display_row(&self) -> String {
        let status = if self.active { "✓" } else { "✗" };
        format!("{status} {} - {}", self.time, self.label)
    }
}

#[cfg(test)]
mod tests {
    use super::{Alarm, AlarmValidationError, ClockTime, ClockTimeError, Meridiem};
    use chrono::NaiveDate;

    fn at(hour: u32, minute: u32, second: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 3, 14)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .expect("valid test timestamp")
    }

    #[test]
    fn display_zero_pads_and_uppercases() {
        let time = ClockTime::new(7, 5, Meridiem::Am).unwrap();
        assert_eq!(time.to_string(), "07:05 AM");
    }

    #[test]
    fn new_rejects_out_of_range_values() {
        assert_eq!(
            ClockTime::new(0, 0, Meridiem::Am),
            Err(ClockTimeError::HourOutOfRange(0))
        );
        assert_eq!(
            ClockTime::new(13, 0, Meridiem::Pm),
            Err(ClockTimeError::HourOutOfRange(13))
        );
        assert_eq!(
            ClockTime::new(4, 60, Meridiem::Pm),
            Err(ClockTimeError::MinuteOutOfRange(60))
        );
    }

    #[test]
    fn from_datetime_drops_seconds_and_maps_midnight_and_noon() {
        assert_eq!(ClockTime::from_datetime(at(0, 0, 59)).to_string(), "12:00 AM");
        assert_eq!(ClockTime::from_datetime(at(12, 30, 1)).to_string(), "12:30 PM");
        assert_eq!(ClockTime::from_datetime(at(23, 59, 30)).to_string(), "11:59 PM");
    }

    #[test]
    fn parse_canonical_only_accepts_canonical_form() {
        let parsed = ClockTime::parse_canonical("09:15 PM").unwrap();
        assert_eq!(parsed.hour24(), 21);
        assert!(ClockTime::parse_canonical("9:15 PM").is_err());
        assert!(ClockTime::parse_canonical("09:15 pm").is_err());
        assert!(ClockTime::parse_canonical("13:15 PM").is_err());
    }

    #[test]
    fn meridiem_marker_normalization() {
        assert_eq!(Meridiem::from_marker("p.m."), Some(Meridiem::Pm));
        assert_eq!(Meridiem::from_marker("AM"), Some(Meridiem::Am));
        assert_eq!(Meridiem::from_marker("x"), None);
    }

    #[test]
    fn alarm_rejects_blank_label_and_fires_once() {
        let time = ClockTime::new(7, 0, Meridiem::Am).unwrap();
        assert_eq!(
            Alarm::new(time, "  ").unwrap_err(),
            AlarmValidationError::EmptyLabel
        );

        let mut alarm = Alarm::new(time, "Wake Up").unwrap();
        assert_eq!(alarm.display_row(), "✓ 07:00 AM - Wake Up");
        assert!(alarm.mark_fired());
        assert!(!alarm.mark_fired());
        assert_eq!(alarm.display_row(), "✗ 07:00 AM - Wake Up");
    }

    #[test]
    fn serializes_time_as_canonical_string() {
        let alarm = Alarm::new(ClockTime::new(4, 24, Meridiem::Pm).unwrap(), "Call").unwrap();
        let value = serde_json::to_value(&alarm).unwrap();
        assert_eq!(value["time"], "04:24 PM");
        let back: Alarm = serde_json::from_value(value).unwrap();
        assert_eq!(back, alarm);
    }
}
