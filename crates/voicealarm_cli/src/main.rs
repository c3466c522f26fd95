//! Interactive voice alarm clock for the terminal.
//!
//! Typed lines stand in for recognized speech; spoken replies are printed
//! (or sent to a configured TTS program).

mod commands;
mod console;

use clap::Parser;
use commands::{parse_slash, SlashCommand, HELP};
use console::{
    print_alarms, spawn_stdin_router, ChannelRecognizer, ConsoleUi, ConsoleVoice, Input,
    PromptSlot,
};
use std::error::Error;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::mpsc::{self, Sender};
use std::sync::{Arc, Mutex};
use voicealarm_core::{
    display_time, init_logging, load_config, load_config_or_default, AlarmConfig, AlarmRuntime,
    Clock, CommandSynthesizer, ConfigError, LoggingOptions, SystemClock,
};

/// Config read from the working directory when `--config` is omitted.
const DEFAULT_CONFIG_FILE: &str = "voicealarm.json";

#[derive(Parser, Debug)]
#[command(version, about = "Voice-controlled alarm clock")]
struct Cli {
    /// JSON config file. Without it `voicealarm.json` is tried, then
    /// built-in defaults.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files.
    #[arg(long)]
    log_dir: Option<String>,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let mut config = resolve_config(cli.config.as_deref(), Path::new(DEFAULT_CONFIG_FILE))?;
    if cli.log_level.is_some() {
        config.log_level = cli.log_level;
    }
    if cli.log_dir.is_some() {
        config.log_dir = cli.log_dir;
    }

    let mut logging = LoggingOptions::from_config(&config)?;
    logging.echo_warnings = true;
    init_logging(&logging)?;

    let voice = match &config.tts_command {
        Some(tts) => ConsoleVoice::Program(CommandSynthesizer::new(
            tts.program.clone(),
            &tts.args,
            &config.voice,
        )),
        None => ConsoleVoice::Print,
    };
    let prompt = PromptSlot::default();
    let clock = Arc::new(SystemClock);
    let mut runtime = AlarmRuntime::start(
        clock.clone(),
        voice,
        ConsoleUi::new(prompt.clone(), config.snooze_minutes),
        &config,
    )?;

    let (phrase_tx, phrase_rx) = mpsc::channel();
    let phrases = Arc::new(Mutex::new(phrase_rx));
    let (input_tx, input_rx) = mpsc::channel();
    // Detached: a blocking stdin read cannot be interrupted.
    let _router = spawn_stdin_router(prompt, input_tx)?;

    println!("Voice Alarm Clock  {}", display_time(clock.now()));
    println!("{HELP}");
    runtime.start_listening(ChannelRecognizer::new(Arc::clone(&phrases)))?;

    for input in input_rx {
        let line = match input {
            Input::Line(line) => line,
            Input::Eof => break,
        };
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        if !line.starts_with('/') {
            forward_phrase(&runtime, &phrase_tx, line);
            continue;
        }
        let command = match parse_slash(line) {
            Ok(command) => command,
            Err(message) => {
                println!("{message}");
                continue;
            }
        };
        if !respond(command, &mut runtime, &phrases, clock.as_ref())? {
            break;
        }
    }

    runtime.shutdown();
    println!("Goodbye.");
    Ok(())
}

/// An explicit config must load; the fallback file may be missing or broken.
fn resolve_config(explicit: Option<&Path>, fallback: &Path) -> Result<AlarmConfig, ConfigError> {
    match explicit {
        Some(path) => load_config(path),
        None => Ok(load_config_or_default(fallback)),
    }
}

fn forward_phrase(runtime: &AlarmRuntime, phrases: &Sender<String>, line: &str) {
    if !runtime.is_listening() {
        println!("Voice input is off; use /listen first.");
        return;
    }
    if phrases.send(line.to_string()).is_err() {
        log::warn!("event=phrase_forward module=cli status=closed");
    }
}

/// Runs one slash command. Returns `false` to quit.
fn respond(
    command: SlashCommand,
    runtime: &mut AlarmRuntime,
    phrases: &Arc<Mutex<mpsc::Receiver<String>>>,
    clock: &dyn Clock,
) -> Result<bool, Box<dyn Error>> {
    let handle = runtime.handle();
    match command {
        SlashCommand::Set(request) => match handle.set_manual_alarm(request)? {
            Ok(alarm) => println!("Added {}", alarm.display_row()),
            Err(err) => println!("Please enter valid time values ({err})"),
        },
        SlashCommand::List => print_alarms(&handle.snapshot()?),
        SlashCommand::Delete(index) => {
            if index.is_none() {
                println!("usage: /delete <n> where n is an alarm number from /list");
            }
            handle.delete_alarm(index)?;
        }
        SlashCommand::Clear => handle.clear()?,
        SlashCommand::Listen => {
            if !runtime.start_listening(ChannelRecognizer::new(Arc::clone(phrases)))? {
                println!("Already listening.");
            }
        }
        SlashCommand::Mute => {
            if !runtime.stop_listening() {
                runtime.start_listening(ChannelRecognizer::new(Arc::clone(phrases)))?;
            }
        }
        SlashCommand::Time => println!("{}", display_time(clock.now())),
        SlashCommand::Help => println!("{HELP}"),
        SlashCommand::Quit => return Ok(false),
    }
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::resolve_config;
    use std::fs;
    use voicealarm_core::{AlarmConfig, ConfigError};

    #[test]
    fn missing_fallback_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = resolve_config(None, &dir.path().join("voicealarm.json")).unwrap();
        assert_eq!(config, AlarmConfig::default());
    }

    #[test]
    fn fallback_file_is_loaded_when_present() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voicealarm.json");
        fs::write(&path, r#"{ "snooze_minutes": 7 }"#).unwrap();
        assert_eq!(resolve_config(None, &path).unwrap().snooze_minutes, 7);
    }

    #[test]
    fn broken_fallback_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voicealarm.json");
        fs::write(&path, "{ not json").unwrap();
        assert_eq!(resolve_config(None, &path).unwrap(), AlarmConfig::default());
    }

    #[test]
    fn explicit_config_must_load() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.json");
        assert!(matches!(
            resolve_config(Some(&missing), &missing),
            Err(ConfigError::Read { .. })
        ));
    }
}
