//! Command intent classification.
//!
//! # Invariants
//! - Classification is a pure function of the text.
//! - Intents are tested in table order; the first keyword hit wins.

/// Classified purpose of one recognized utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandIntent {
    SetAlarm,
    QueryTime,
    ListAlarms,
    DeleteAll,
    Unknown,
}

/// Keyword table in precedence order.
pub const INTENT_KEYWORDS: &[(CommandIntent, &[&str])] = &[
    (CommandIntent::SetAlarm, &["set alarm", "alarm for"]),
    (
        CommandIntent::QueryTime,
        &["what time", "time is it", "what's the time", "the time now"],
    ),
    (CommandIntent::ListAlarms, &["show", "my alarm", "list alarm"]),
    (CommandIntent::DeleteAll, &["delete all alarm"]),
];

/// Routes recognized text to an intent by substring membership.
pub fn classify_command(text: &str) -> CommandIntent {
    let text = text.to_lowercase();
    INTENT_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|keyword| text.contains(keyword)))
        .map(|(intent, _)| *intent)
        .unwrap_or(CommandIntent::Unknown)
}

#[cfg(test)]
mod tests {
    use super::{classify_command, CommandIntent};

    #[test]
    fn classifies_each_intent() {
        assert_eq!(classify_command("set alarm for 7 am"), CommandIntent::SetAlarm);
        assert_eq!(classify_command("what time is it"), CommandIntent::QueryTime);
        assert_eq!(classify_command("what's the time"), CommandIntent::QueryTime);
        assert_eq!(classify_command("tell me the time now"), CommandIntent::QueryTime);
        assert_eq!(classify_command("list alarms"), CommandIntent::ListAlarms);
        assert_eq!(classify_command("delete all alarms"), CommandIntent::DeleteAll);
        assert_eq!(classify_command("play some music"), CommandIntent::Unknown);
    }

    #[test]
    fn set_alarm_takes_precedence_over_list() {
        assert_eq!(
            classify_command("show my alarm for 5pm"),
            CommandIntent::SetAlarm
        );
        assert_eq!(
            classify_command("set alarm and show it"),
            CommandIntent::SetAlarm
        );
    }

    #[test]
    fn list_keywords_shadow_delete_all() {
        // "my alarm" is checked before "delete all alarm".
        assert_eq!(
            classify_command("delete all my alarms"),
            CommandIntent::ListAlarms
        );
    }

    #[test]
    fn classification_ignores_case() {
        assert_eq!(classify_command("WHAT TIME is it"), CommandIntent::QueryTime);
    }
}
