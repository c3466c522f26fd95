//! Runtime configuration.
//!
//! # Responsibility
//! - Load alarm clock settings from a JSON file.
//! - Provide defaults for every field so a missing file still runs.
//!
//! # Invariants
//! - A loaded config has passed `validate()`.
//! - Missing fields fall back to their defaults; unknown fields are rejected.

use crate::recognition::ListenSettings;
use crate::scheduler::DEFAULT_POLL_INTERVAL;
use crate::snooze::DEFAULT_SNOOZE_MINUTES;
use crate::speech::VoiceSettings;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Label used by the manual form when none is typed.
pub const DEFAULT_MANUAL_LABEL: &str = "Manual Alarm";

/// External TTS program invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TtsCommandConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// Alarm clock settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AlarmConfig {
    pub poll_interval_secs: u64,
    pub snooze_minutes: u32,
    pub listen_timeout_secs: u64,
    pub phrase_time_limit_secs: u64,
    pub manual_label: String,
    pub voice: VoiceSettings,
    pub tts_command: Option<TtsCommandConfig>,
    pub log_level: Option<String>,
    pub log_dir: Option<String>,
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: DEFAULT_POLL_INTERVAL.as_secs(),
            snooze_minutes: DEFAULT_SNOOZE_MINUTES,
            listen_timeout_secs: 2,
            phrase_time_limit_secs: 5,
            manual_label: DEFAULT_MANUAL_LABEL.to_string(),
            voice: VoiceSettings::default(),
            tts_command: None,
            log_level: None,
            log_dir: None,
        }
    }
}

impl AlarmConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn listen_settings(&self) -> ListenSettings {
        ListenSettings {
            timeout: Duration::from_secs(self.listen_timeout_secs),
            phrase_time_limit: Duration::from_secs(self.phrase_time_limit_secs),
        }
    }

    /// Checks value ranges that serde cannot express.
    pub fn validate(&self) -> Result<(), String> {
        if self.poll_interval_secs == 0 {
            return Err("poll_interval_secs must be greater than 0".to_string());
        }
        if self.poll_interval_secs > 60 {
            // Polls further apart than a minute can skip an alarm's minute.
            return Err("poll_interval_secs must be at most 60".to_string());
        }
        if self.snooze_minutes == 0 {
            return Err("snooze_minutes must be greater than 0".to_string());
        }
        if self.listen_timeout_secs == 0 || self.phrase_time_limit_secs == 0 {
            return Err("listen timeouts must be greater than 0".to_string());
        }
        if !(0.0..=1.0).contains(&self.voice.volume) {
            return Err(format!(
                "voice.volume must be within 0.0..=1.0, got {}",
                self.voice.volume
            ));
        }
        if self.manual_label.trim().is_empty() {
            return Err("manual_label must not be empty".to_string());
        }
        Ok(())
    }
}

/// Configuration loading failure.
#[derive(Debug)]
pub enum ConfigError {
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    Invalid {
        path: PathBuf,
        reason: String,
    },
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "failed to parse config `{}`: {source}", path.display())
            }
            Self::Invalid { path, reason } => {
                write!(f, "invalid config `{}`: {reason}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Read { source, .. } => Some(source),
            Self::Parse { source, .. } => Some(source),
            Self::Invalid { .. } => None,
        }
    }
}

/// Loads and validates a JSON config file.
///
/// # Errors
/// - `Read` when the file cannot be read.
/// - `Parse` on malformed JSON or unknown fields.
/// - `Invalid` when a value is out of range.
pub fn load_config(path: &Path) -> Result<AlarmConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config: AlarmConfig =
        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
    config.validate().map_err(|reason| ConfigError::Invalid {
        path: path.to_path_buf(),
        reason,
    })?;
    Ok(config)
}

/// Loads a config file, falling back to defaults on any failure.
pub fn load_config_or_default(path: &Path) -> AlarmConfig {
    load_config(path).unwrap_or_else(|err| {
        log::warn!("event=config_load module=config status=fallback error={err}");
        AlarmConfig::default()
    })
}
