use std::fs;
use std::time::Duration;
use voicealarm_core::{load_config, load_config_or_default, AlarmConfig, ConfigError};

#[test]
fn partial_file_fills_missing_fields_with_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alarm.json");
    fs::write(
        &path,
        r#"{
            "snooze_minutes": 9,
            "voice": { "rate": 180 },
            "tts_command": { "program": "espeak", "args": ["-s", "{rate}"] }
        }"#,
    )
    .unwrap();

    let config = load_config(&path).unwrap();
    assert_eq!(config.snooze_minutes, 9);
    assert_eq!(config.voice.rate, 180);
    assert_eq!(config.voice.volume, 0.8);
    assert_eq!(config.poll_interval(), Duration::from_secs(30));
    assert_eq!(config.manual_label, "Manual Alarm");

    let tts = config.tts_command.expect("tts command should be parsed");
    assert_eq!(tts.program, "espeak");
    assert_eq!(tts.args, vec!["-s", "{rate}"]);
}

#[test]
fn unknown_field_is_a_parse_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alarm.json");
    fs::write(&path, r#"{ "snooze_minuets": 9 }"#).unwrap();

    assert!(matches!(load_config(&path), Err(ConfigError::Parse { .. })));
}

#[test]
fn out_of_range_value_is_invalid() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alarm.json");
    fs::write(&path, r#"{ "snooze_minutes": 0 }"#).unwrap();

    let err = load_config(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Invalid { .. }));
    assert!(err.to_string().contains("snooze_minutes"));
}

#[test]
fn missing_file_is_a_read_error_and_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.json");

    assert!(matches!(load_config(&path), Err(ConfigError::Read { .. })));
    assert_eq!(load_config_or_default(&path), AlarmConfig::default());
}
