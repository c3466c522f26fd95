//! Slash command parsing for the interactive console.

use voicealarm_core::ManualAlarmRequest;

pub const HELP: &str = "\
Type a voice command (e.g. `set alarm for 7:30 am wake up`) or:
  /set <hour> <minute> <am|pm> [label...]  add an alarm manually
  /list                                    show all alarms
  /delete <n>                              delete alarm number n
  /clear                                   delete all alarms
  /listen                                  start voice input
  /mute                                    toggle voice input
  /time                                    show the current time
  /help                                    show this help
  /quit                                    exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlashCommand {
    Set(ManualAlarmRequest),
    List,
    /// Zero-based index; `None` when nothing valid was selected.
    Delete(Option<usize>),
    Clear,
    Listen,
    Mute,
    Time,
    Help,
    Quit,
}

/// Parses a line starting with `/`.
pub fn parse_slash(line: &str) -> Result<SlashCommand, String> {
    let mut parts = line.trim().split_whitespace();
    let name = parts.next().unwrap_or_default();
    match name {
        "/set" => {
            let hour = parts.next();
            let minute = parts.next();
            let meridiem = parts.next();
            let (Some(hour), Some(minute), Some(meridiem)) = (hour, minute, meridiem) else {
                return Err("usage: /set <hour> <minute> <am|pm> [label...]".to_string());
            };
            Ok(SlashCommand::Set(ManualAlarmRequest {
                hour: hour.to_string(),
                minute: minute.to_string(),
                meridiem: meridiem.to_string(),
                label: parts.collect::<Vec<_>>().join(" "),
            }))
        }
        "/list" => Ok(SlashCommand::List),
        "/delete" => {
            let index = parts
                .next()
                .and_then(|value| value.parse::<usize>().ok())
                .and_then(|number| number.checked_sub(1));
            Ok(SlashCommand::Delete(index))
        }
        "/clear" => Ok(SlashCommand::Clear),
        "/listen" => Ok(SlashCommand::Listen),
        "/mute" => Ok(SlashCommand::Mute),
        "/time" => Ok(SlashCommand::Time),
        "/help" => Ok(SlashCommand::Help),
        "/quit" | "/exit" => Ok(SlashCommand::Quit),
        other => Err(format!("unknown command `{other}`; try /help")),
    }
}

#[cfg(test)]
mod tests {
    use super::{parse_slash, SlashCommand};

    #[test]
    fn set_collects_trailing_label_words() {
        let Ok(SlashCommand::Set(request)) = parse_slash("/set 7 05 pm take  meds") else {
            panic!("expected /set to parse");
        };
        assert_eq!(request.hour, "7");
        assert_eq!(request.minute, "05");
        assert_eq!(request.meridiem, "pm");
        assert_eq!(request.label, "take meds");
    }

    #[test]
    fn set_requires_three_fields() {
        assert!(parse_slash("/set 7 05").is_err());
    }

    #[test]
    fn delete_is_one_based() {
        assert_eq!(parse_slash("/delete 2"), Ok(SlashCommand::Delete(Some(1))));
        assert_eq!(parse_slash("/delete 0"), Ok(SlashCommand::Delete(None)));
        assert_eq!(parse_slash("/delete x"), Ok(SlashCommand::Delete(None)));
        assert_eq!(parse_slash("/delete"), Ok(SlashCommand::Delete(None)));
    }

    #[test]
    fn unknown_command_is_rejected() {
        assert!(parse_slash("/snooze").unwrap_err().contains("/snooze"));
    }
}
