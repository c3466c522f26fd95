//! Alarm use-case service.
//!
//! # Responsibility
//! - Turn recognized commands and manual form input into store mutations
//!   and spoken responses.
//! - Fire due alarms and apply the user's snooze/dismiss answer.
//!
//! # Invariants
//! - Parse and classification failures become spoken messages; they never
//!   touch the store.
//! - Only this service mutates its `AlarmStore`; callers get copies.
//! - Every response is both queued on the speaker and returned to the
//!   caller, in the same order.

use crate::clock::{spoken_time, Clock};
use crate::command::intent::{classify_command, CommandIntent};
use crate::command::label::{extract_label, DEFAULT_VOICE_LABEL};
use crate::command::time_parser::{parse_time_expression, TimeParseError};
use crate::config::AlarmConfig;
use crate::model::alarm::{Alarm, AlarmValidationError, ClockTime, Meridiem};
use crate::scheduler::{due_alarms, FiredAlarm};
use crate::snooze::{snooze_alarm, AlarmChoice};
use crate::speech::Speaker;
use crate::store::AlarmStore;
use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub const UNPARSEABLE_TIME_REPLY: &str =
    "I couldn't understand the time. Please try again with a format like '4:30 PM' or '4 PM'.";
pub const INVALID_TIME_REPLY: &str = "Invalid time format. Please try again.";
pub const UNKNOWN_COMMAND_REPLY: &str = "Sorry, I didn't understand that command";
pub const NO_ALARMS_REPLY: &str = "You have no active alarms";
pub const ALL_DELETED_REPLY: &str = "All alarms deleted";

/// Raw manual form input, exactly as typed.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ManualAlarmRequest {
    pub hour: String,
    pub minute: String,
    pub meridiem: String,
    /// Blank means "use the configured manual label".
    pub label: String,
}

/// Manual entry rejection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManualInputError {
    NotANumber { field: &'static str, value: String },
    OutOfRange { field: &'static str, value: u32 },
    InvalidMeridiem(String),
    Validation(AlarmValidationError),
}

impl Display for ManualInputError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotANumber { field, value } => write!(f, "{field} `{value}` is not a number"),
            Self::OutOfRange { field, value } => write!(f, "{field} {value} is out of range"),
            Self::InvalidMeridiem(value) => write!(f, "`{value}` is not AM or PM"),
            Self::Validation(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ManualInputError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            _ => None,
        }
    }
}

impl From<AlarmValidationError> for ManualInputError {
    fn from(value: AlarmValidationError) -> Self {
        Self::Validation(value)
    }
}

/// Result of handling one recognized command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    pub intent: CommandIntent,
    /// Alarm created by a set-alarm command.
    pub alarm: Option<Alarm>,
    /// Time extraction failure of a set-alarm command.
    pub error: Option<TimeParseError>,
    /// Responses in the order they were queued for speaking.
    pub utterances: Vec<String>,
    /// Whether the alarm list changed.
    pub alarms_changed: bool,
}

impl CommandOutcome {
    fn new(intent: CommandIntent) -> Self {
        Self {
            intent,
            alarm: None,
            error: None,
            utterances: Vec::new(),
            alarms_changed: false,
        }
    }
}

/// Alarm clock use-cases over one owned store.
pub struct AlarmService {
    store: AlarmStore,
    clock: Arc<dyn Clock>,
    speaker: Speaker,
    snooze_minutes: u32,
    manual_label: String,
}

impl AlarmService {
    pub fn new(clock: Arc<dyn Clock>, speaker: Speaker, config: &AlarmConfig) -> Self {
        Self {
            store: AlarmStore::new(),
            clock,
            speaker,
            snooze_minutes: config.snooze_minutes,
            manual_label: config.manual_label.clone(),
        }
    }

    /// Insertion-ordered alarms.
    pub fn alarms(&self) -> &[Alarm] {
        self.store.list()
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Interprets one recognized utterance.
    pub fn handle_command(&mut self, text: &str) -> CommandOutcome {
        let command = text.trim().to_lowercase();
        let intent = classify_command(&command);
        log::info!("event=command module=service status=ok intent={intent:?}");
        log::debug!("event=command module=service text={command}");

        let mut outcome = CommandOutcome::new(intent);
        match intent {
            CommandIntent::SetAlarm => self.set_alarm_from_voice(&command, &mut outcome),
            CommandIntent::QueryTime => {
                let now = spoken_time(self.clock.now());
                self.reply(&mut outcome, format!("The current time is {now}"));
            }
            CommandIntent::ListAlarms => {
                let reply = self.describe_alarms();
                self.reply(&mut outcome, reply);
            }
            CommandIntent::DeleteAll => {
                self.store.clear();
                outcome.alarms_changed = true;
                self.reply(&mut outcome, ALL_DELETED_REPLY);
            }
            CommandIntent::Unknown => self.reply(&mut outcome, UNKNOWN_COMMAND_REPLY),
        }
        outcome
    }

    fn set_alarm_from_voice(&mut self, command: &str, outcome: &mut CommandOutcome) {
        let parsed = match parse_time_expression(command, self.clock.current_hour()) {
            Ok(parsed) => parsed,
            Err(err) => {
                log::info!("event=alarm_parse module=service status=rejected error={err}");
                let reply = match err {
                    TimeParseError::Unparseable => UNPARSEABLE_TIME_REPLY,
                    TimeParseError::InvalidTime { .. } => INVALID_TIME_REPLY,
                };
                outcome.error = Some(err);
                self.reply(outcome, reply);
                return;
            }
        };

        let label = extract_label(command, &parsed.matched);
        match self.store.add(parsed.time, label.as_str()) {
            Ok(alarm) => {
                outcome.alarms_changed = true;
                self.reply(outcome, format!("Alarm set for {}", alarm.time));
                if alarm.label != DEFAULT_VOICE_LABEL {
                    self.reply(outcome, format!("with label {}", alarm.label));
                }
                outcome.alarm = Some(alarm);
            }
            Err(err) => {
                // extract_label never returns blank text.
                log::error!("event=alarm_add module=service status=error error={err}");
                self.reply(outcome, INVALID_TIME_REPLY);
            }
        }
    }

    fn describe_alarms(&self) -> String {
        if self.store.is_empty() {
            return NO_ALARMS_REPLY.to_string();
        }
        let listed = self
            .store
            .list()
            .iter()
            .map(|alarm| format!("{} {}", alarm.time, alarm.label))
            .collect::<Vec<_>>()
            .join(", ");
        format!("Your alarms are: {listed}")
    }

    /// Adds an alarm from the manual form, bypassing the parser.
    ///
    /// # Errors
    /// - `NotANumber` when hour or minute is not an integer.
    /// - `OutOfRange` when hour is outside 1..=12 or minute outside 0..=59.
    /// - `InvalidMeridiem` when the designator is not AM/PM.
    pub fn set_manual_alarm(&mut self, request: &ManualAlarmRequest) -> Result<Alarm, ManualInputError> {
        let hour = parse_field("hour", &request.hour)?;
        let minute = parse_field("minute", &request.minute)?;
        if !(1..=12).contains(&hour) {
            return Err(ManualInputError::OutOfRange { field: "hour", value: hour });
        }
        if minute > 59 {
            return Err(ManualInputError::OutOfRange { field: "minute", value: minute });
        }
        let meridiem = match request.meridiem.trim().to_ascii_uppercase().as_str() {
            "AM" => Meridiem::Am,
            "PM" => Meridiem::Pm,
            _ => return Err(ManualInputError::InvalidMeridiem(request.meridiem.clone())),
        };
        let time = ClockTime::new(hour, minute, meridiem)
            .map_err(|_| ManualInputError::OutOfRange { field: "hour", value: hour })?;

        let label = request.label.trim();
        let label = if label.is_empty() {
            self.manual_label.as_str()
        } else {
            label
        };
        Ok(self.store.add(time, label.to_string())?)
    }

    /// Deletes the selected alarm; no selection or a stale index is a no-op.
    pub fn delete_alarm(&mut self, index: Option<usize>) -> Option<Alarm> {
        self.store.delete(index)
    }

    pub fn clear_alarms(&mut self) -> usize {
        self.store.clear()
    }

    /// Fires every alarm due at the current minute and announces each.
    pub fn poll_due(&mut self) -> Vec<FiredAlarm> {
        self.poll_due_at(self.clock.now())
    }

    /// Fires every alarm due in the minute containing `now`.
    ///
    /// Used for ticks that were taken earlier than they are handled.
    pub fn poll_due_at(&mut self, now: NaiveDateTime) -> Vec<FiredAlarm> {
        let fired = due_alarms(&mut self.store, now);
        for alarm in &fired {
            self.speaker
                .say(format!("Alarm! {}. Time is {}", alarm.label, alarm.time));
        }
        fired
    }

    /// Applies the user's answer to a fired alarm.
    ///
    /// Returns the new alarm when snoozed; the fired record stays inactive
    /// either way.
    pub fn resolve_fired(&mut self, fired: &FiredAlarm, choice: AlarmChoice) -> Option<Alarm> {
        if choice == AlarmChoice::Dismiss {
            log::info!("event=alarm_dismiss module=service status=ok id={}", fired.id);
            return None;
        }
        let plan = snooze_alarm(fired, self.clock.now(), self.snooze_minutes);
        match self.store.add(plan.time, plan.label) {
            Ok(alarm) => {
                log::info!(
                    "event=alarm_snooze module=service status=ok id={} new_id={} time={}",
                    fired.id,
                    alarm.id,
                    alarm.time
                );
                Some(alarm)
            }
            Err(err) => {
                log::error!("event=alarm_snooze module=service status=error error={err}");
                None
            }
        }
    }

    fn reply(&self, outcome: &mut CommandOutcome, text: impl Into<String>) {
        let text = text.into();
        self.speaker.say(text.clone());
        outcome.utterances.push(text);
    }
}

fn parse_field(field: &'static str, value: &str) -> Result<u32, ManualInputError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ManualInputError::NotANumber {
            field,
            value: value.to_string(),
        })
}
