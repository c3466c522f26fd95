//! Alarm label extraction from voice commands.
//!
//! # Invariants
//! - The returned label is never empty; leftover-free commands get
//!   `DEFAULT_VOICE_LABEL`.
//! - Only whole words `set`, `alarm`, `for` are stripped; `alarms` and
//!   `sunset` survive.

use once_cell::sync::Lazy;
use regex::Regex;

/// Label used when a voice command carries nothing beyond the time.
pub const DEFAULT_VOICE_LABEL: &str = "Alarm";

static BOILERPLATE_WORDS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(set|alarm|for)\b").expect("valid boilerplate regex"));

/// Builds a display label from the command minus its time expression.
pub fn extract_label(command: &str, matched_time: &str) -> String {
    let without_time = remove_case_insensitive(command, matched_time);
    let stripped = BOILERPLATE_WORDS_RE.replace_all(&without_time, "");
    let remainder = stripped.trim();
    if remainder.is_empty() {
        return DEFAULT_VOICE_LABEL.to_string();
    }
    title_case(remainder)
}

fn remove_case_insensitive(text: &str, needle: &str) -> String {
    if needle.is_empty() {
        return text.to_string();
    }
    match Regex::new(&format!("(?i){}", regex::escape(needle))) {
        Ok(pattern) => pattern.replace_all(text, "").into_owned(),
        Err(err) => {
            log::warn!("event=label_extract module=command status=error error={err}");
            text.to_string()
        }
    }
}

/// Upper-cases the first letter of each letter run, lower-cases the rest.
///
/// Any non-letter (space, digit, apostrophe) starts a new run, so
/// `o'clock` becomes `O'Clock`.
pub fn title_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut previous_is_letter = false;
    for ch in text.chars() {
        if ch.is_alphabetic() {
            if previous_is_letter {
                result.extend(ch.to_lowercase());
            } else {
                result.extend(ch.to_uppercase());
            }
            previous_is_letter = true;
        } else {
            result.push(ch);
            previous_is_letter = false;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::{extract_label, title_case, DEFAULT_VOICE_LABEL};

    #[test]
    fn strips_time_and_boilerplate() {
        assert_eq!(
            extract_label("set alarm for 7:30 am wake up", "7:30 am"),
            "Wake Up"
        );
    }

    #[test]
    fn empty_remainder_uses_default_label() {
        assert_eq!(extract_label("set alarm for 8 am", "8 am"), DEFAULT_VOICE_LABEL);
    }

    #[test]
    fn time_removal_ignores_case() {
        assert_eq!(
            extract_label("alarm for 6 PM dinner", "6 pm"),
            "Dinner"
        );
    }

    #[test]
    fn keeps_words_that_only_contain_boilerplate() {
        assert_eq!(
            extract_label("set alarm for 6 pm sunset forecast", "6 pm"),
            "Sunset Forecast"
        );
    }

    #[test]
    fn time_text_is_matched_literally() {
        assert_eq!(
            extract_label("alarm for 4:24 p.m. call mom", "4:24 p.m."),
            "Call Mom"
        );
    }

    #[test]
    fn title_case_restarts_after_non_letters() {
        assert_eq!(title_case("take PILLS at 8"), "Take Pills At 8");
        assert_eq!(title_case("five o'clock"), "Five O'Clock");
    }
}
