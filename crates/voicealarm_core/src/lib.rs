//! Core domain logic for the voice alarm clock.
//! This crate is the single source of truth for alarm invariants.
//!
//! Speech capture, speech synthesis and the window are collaborators
//! behind `SpeechRecognizer`, `SpeechSynthesizer` and `AlarmUi`.

pub mod cancel;
pub mod clock;
pub mod command;
pub mod config;
pub mod logging;
pub mod model;
pub mod recognition;
pub mod runtime;
pub mod scheduler;
pub mod service;
pub mod snooze;
pub mod speech;
pub mod store;

pub use cancel::CancelToken;
pub use clock::{display_time, spoken_time, Clock, ManualClock, SystemClock};
pub use command::intent::{classify_command, CommandIntent};
pub use command::label::{extract_label, DEFAULT_VOICE_LABEL};
pub use command::time_parser::{parse_time_expression, TimeMatch, TimeParseError, TimeRule};
pub use config::{load_config, load_config_or_default, AlarmConfig, ConfigError, TtsCommandConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError, LoggingOptions};
pub use model::alarm::{Alarm, AlarmId, AlarmValidationError, ClockTime, ClockTimeError, Meridiem};
pub use recognition::{
    CaptureEvent, CaptureLoop, ListenSettings, RecognitionError, SpeechRecognizer,
};
pub use runtime::{AlarmRuntime, AlarmUi, Request, RuntimeError, RuntimeHandle};
pub use scheduler::{due_alarms, FiredAlarm, SchedulerLoop};
pub use service::alarm_service::{
    AlarmService, CommandOutcome, ManualAlarmRequest, ManualInputError,
};
pub use snooze::{snooze_alarm, AlarmChoice, SnoozePlan};
pub use speech::{
    CommandSynthesizer, SpeechError, SpeechSynthesizer, Speaker, UtteranceQueue, VoiceSettings,
};
pub use store::AlarmStore;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
