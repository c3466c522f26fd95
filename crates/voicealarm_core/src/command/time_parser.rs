//! Time expression parsing for spoken alarm commands.
//!
//! # Responsibility
//! - Extract one time expression from free text and normalize it to a
//!   12-hour `ClockTime`.
//! - Report which surface form matched and the exact matched substring,
//!   so label extraction can remove it.
//!
//! # Invariants
//! - Forms are tried in a fixed priority order; the first form with any
//!   match wins, even if a later form matches earlier in the text.
//! - A matched-but-out-of-range value is `InvalidTime`, never an alarm.
//! - The 24-hour form never fires when a meridiem marker follows, and the
//!   bare-hour form never fires when a colon or meridiem marker follows.

use crate::model::alarm::{ClockTime, Meridiem};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

static HOUR_MINUTE_MERIDIEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]{1,2}):([0-9]{2})\s*([ap]\.?m\.?)").expect("valid h:mm meridiem regex")
});
static HOUR_MERIDIEM_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([0-9]{1,2})\s*([ap]\.?m\.?)").expect("valid hour meridiem regex")
});
static MERIDIEM_AHEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^\s*[ap]\.?m\.?").expect("valid meridiem lookahead regex"));
static COLON_AHEAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*:").expect("valid colon lookahead regex"));

/// Surface form that produced a time match, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRule {
    /// `4:24 pm`, `4:24 p.m.`
    HourMinuteMeridiem,
    /// `4 pm`
    HourMeridiem,
    /// `16:24`, read on the 24-hour dial.
    TwentyFourHour,
    /// `4`, meridiem inferred from the current hour.
    BareHour,
}

/// Successful extraction result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimeMatch {
    pub time: ClockTime,
    /// Exact substring consumed from the input.
    pub matched: String,
    pub rule: TimeRule,
}

/// Time extraction failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeParseError {
    /// No time form matched anywhere in the text.
    Unparseable,
    /// A form matched but the normalized value is out of range.
    InvalidTime { hour: u32, minute: u32 },
}

impl Display for TimeParseError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unparseable => write!(f, "no time expression found"),
            Self::InvalidTime { hour, minute } => {
                write!(f, "invalid time {hour}:{minute:02}")
            }
        }
    }
}

impl Error for TimeParseError {}

/// Extracts and normalizes the first time expression in `text`.
///
/// `current_hour` is the wall-clock hour (`0..=23`) used only by the
/// bare-hour form to infer AM/PM.
///
/// # Errors
/// - `Unparseable` when none of the four forms match.
/// - `InvalidTime` when the matched hour/minute fall outside 1..=12 / 0..=59.
pub fn parse_time_expression(text: &str, current_hour: u32) -> Result<TimeMatch, TimeParseError> {
    let candidate = match_hour_minute_meridiem(text)
        .or_else(|| match_hour_meridiem(text))
        .or_else(|| match_twenty_four_hour(text))
        .or_else(|| match_bare_hour(text, current_hour))
        .ok_or(TimeParseError::Unparseable)?;

    let time = ClockTime::new(candidate.hour, candidate.minute, candidate.meridiem).map_err(
        |_| TimeParseError::InvalidTime {
            hour: candidate.hour,
            minute: candidate.minute,
        },
    )?;

    Ok(TimeMatch {
        time,
        matched: candidate.matched,
        rule: candidate.rule,
    })
}

/// Unvalidated match, before range checks.
struct Candidate {
    hour: u32,
    minute: u32,
    meridiem: Meridiem,
    matched: String,
    rule: TimeRule,
}

fn match_hour_minute_meridiem(text: &str) -> Option<Candidate> {
    let caps = HOUR_MINUTE_MERIDIEM_RE.captures(text)?;
    Some(Candidate {
        hour: parse_number(caps.get(1)?.as_str()),
        minute: parse_number(caps.get(2)?.as_str()),
        meridiem: Meridiem::from_marker(caps.get(3)?.as_str())?,
        matched: caps.get(0)?.as_str().to_string(),
        rule: TimeRule::HourMinuteMeridiem,
    })
}

fn match_hour_meridiem(text: &str) -> Option<Candidate> {
    let caps = HOUR_MERIDIEM_RE.captures(text)?;
    Some(Candidate {
        hour: parse_number(caps.get(1)?.as_str()),
        minute: 0,
        meridiem: Meridiem::from_marker(caps.get(2)?.as_str())?,
        matched: caps.get(0)?.as_str().to_string(),
        rule: TimeRule::HourMeridiem,
    })
}

fn match_twenty_four_hour(text: &str) -> Option<Candidate> {
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        for hour_len in hour_lengths(bytes, start) {
            let colon = start + hour_len;
            if bytes.get(colon) != Some(&b':') {
                continue;
            }
            let minute_start = colon + 1;
            if ascii_digits_at(bytes, minute_start) < 2 {
                continue;
            }
            let end = minute_start + 2;
            if MERIDIEM_AHEAD_RE.is_match(&text[end..]) {
                continue;
            }

            let (hour, meridiem) = from_twenty_four_hour(parse_number(&text[start..colon]));
            return Some(Candidate {
                hour,
                minute: parse_number(&text[minute_start..end]),
                meridiem,
                matched: text[start..end].to_string(),
                rule: TimeRule::TwentyFourHour,
            });
        }
    }
    None
}

fn match_bare_hour(text: &str, current_hour: u32) -> Option<Candidate> {
    let bytes = text.as_bytes();
    for start in 0..bytes.len() {
        for hour_len in hour_lengths(bytes, start) {
            let end = start + hour_len;
            let rest = &text[end..];
            if COLON_AHEAD_RE.is_match(rest) || MERIDIEM_AHEAD_RE.is_match(rest) {
                continue;
            }

            let hour = parse_number(&text[start..end]);
            return Some(Candidate {
                hour,
                minute: 0,
                meridiem: infer_meridiem(hour, current_hour),
                matched: text[start..end].to_string(),
                rule: TimeRule::BareHour,
            });
        }
    }
    None
}

/// Guesses AM/PM for a bare hour: morning guesses stay in the morning.
pub fn infer_meridiem(hour: u32, current_hour: u32) -> Meridiem {
    if hour <= 12 && current_hour < 12 {
        Meridiem::Am
    } else {
        Meridiem::Pm
    }
}

/// Maps a 24-hour dial value onto 12-hour form. Values past 23 stay
/// out of range and are rejected by validation.
fn from_twenty_four_hour(hour: u32) -> (u32, Meridiem) {
    match hour {
        0 => (12, Meridiem::Am),
        1..=11 => (hour, Meridiem::Am),
        12 => (12, Meridiem::Pm),
        _ => (hour - 12, Meridiem::Pm),
    }
}

/// Candidate hour widths at `start`, longest first.
fn hour_lengths(bytes: &[u8], start: usize) -> impl Iterator<Item = usize> {
    let available = ascii_digits_at(bytes, start).min(2);
    (1..=available).rev()
}

fn ascii_digits_at(bytes: &[u8], start: usize) -> usize {
    bytes
        .get(start..)
        .map(|rest| rest.iter().take_while(|byte| byte.is_ascii_digit()).count())
        .unwrap_or(0)
}

fn parse_number(digits: &str) -> u32 {
    // At most two ASCII digits reach here.
    digits.parse().unwrap_or(u32::MAX)
}
