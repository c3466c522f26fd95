//! Speech synthesis boundary and utterance queue.
//!
//! # Responsibility
//! - Define the `speak(text)` contract expected from a TTS engine.
//! - Serialize all utterances through one consumer thread so overlapping
//!   requests never race on the audio device.
//!
//! # Invariants
//! - `Speaker::say` never blocks on synthesis and never fails the caller.
//! - Synthesizer errors are logged; the queue keeps draining.
//! - Utterances are spoken in submission order.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::process::Command;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

/// Speech synthesis failure.
#[derive(Debug)]
pub enum SpeechError {
    EmptyText,
    Spawn(io::Error),
    Failed { program: String, status: String },
}

impl Display for SpeechError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyText => write!(f, "cannot speak empty text"),
            Self::Spawn(err) => write!(f, "failed to start speech program: {err}"),
            Self::Failed { program, status } => {
                write!(f, "speech program `{program}` exited with {status}")
            }
        }
    }
}

impl Error for SpeechError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for SpeechError {
    fn from(value: io::Error) -> Self {
        Self::Spawn(value)
    }
}

/// Voice tuning handed to synthesizer implementations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceSettings {
    /// Words per minute.
    pub rate: u32,
    /// `0.0..=1.0`.
    pub volume: f32,
    /// Index into the engine's installed voices.
    pub voice_index: usize,
}

impl Default for VoiceSettings {
    fn default() -> Self {
        Self {
            rate: 150,
            volume: 0.8,
            voice_index: 0,
        }
    }
}

/// Text-to-speech engine contract.
pub trait SpeechSynthesizer: Send {
    /// Speaks `text`, blocking until playback finishes.
    fn speak(&mut self, text: &str) -> Result<(), SpeechError>;
}

/// Synthesizer that shells out to an external TTS program.
///
/// `{rate}`, `{volume}` and `{voice}` placeholders in `args` are
/// substituted from the voice settings; the utterance is passed as the
/// final argument.
#[derive(Debug, Clone)]
pub struct CommandSynthesizer {
    program: String,
    args: Vec<String>,
}

impl CommandSynthesizer {
    pub fn new(program: impl Into<String>, args: &[String], voice: &VoiceSettings) -> Self {
        let args = args
            .iter()
            .map(|arg| {
                arg.replace("{rate}", &voice.rate.to_string())
                    .replace("{volume}", &format!("{:.2}", voice.volume))
                    .replace("{voice}", &voice.voice_index.to_string())
            })
            .collect();
        Self {
            program: program.into(),
            args,
        }
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl SpeechSynthesizer for CommandSynthesizer {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }
        let output = Command::new(&self.program)
            .args(&self.args)
            .arg(text)
            .output()?;
        if !output.status.success() {
            return Err(SpeechError::Failed {
                program: self.program.clone(),
                status: output.status.to_string(),
            });
        }
        Ok(())
    }
}

/// Cloneable fire-and-forget handle onto the utterance queue.
#[derive(Debug, Clone)]
pub struct Speaker {
    tx: Sender<String>,
}

impl Speaker {
    /// Creates a speaker and the receiving end of its queue.
    ///
    /// `UtteranceQueue::start` consumes the receiver; tests may read it
    /// directly to observe what would have been spoken.
    pub fn channel() -> (Self, Receiver<String>) {
        let (tx, rx) = mpsc::channel();
        (Self { tx }, rx)
    }

    /// Queues `text` for speaking. Blank text is dropped.
    pub fn say(&self, text: impl Into<String>) {
        let text = text.into();
        if text.trim().is_empty() {
            return;
        }
        log::debug!("event=speak_queue module=speech status=ok text={text}");
        if self.tx.send(text).is_err() {
            log::warn!("event=speak_queue module=speech status=closed");
        }
    }
}

/// Single-consumer worker that feeds queued utterances to a synthesizer.
pub struct UtteranceQueue {
    handle: JoinHandle<()>,
}

impl UtteranceQueue {
    /// Starts the worker and returns it with a speaker handle.
    ///
    /// The worker exits after every `Speaker` clone has been dropped and
    /// the remaining utterances have been spoken.
    pub fn start<S>(synthesizer: S) -> io::Result<(Self, Speaker)>
    where
        S: SpeechSynthesizer + 'static,
    {
        let (speaker, rx) = Speaker::channel();
        let queue = Self::drain(synthesizer, rx)?;
        Ok((queue, speaker))
    }

    fn drain<S>(mut synthesizer: S, rx: Receiver<String>) -> io::Result<Self>
    where
        S: SpeechSynthesizer + 'static,
    {
        let handle = thread::Builder::new()
            .name("utterance-queue".to_string())
            .spawn(move || {
                for text in rx {
                    if let Err(err) = synthesizer.speak(&text) {
                        log::error!("event=speak module=speech status=error error={err}");
                    }
                }
                log::info!("event=speech_queue_stop module=speech status=ok");
            })?;
        Ok(Self { handle })
    }

    /// Waits for the worker to finish draining.
    ///
    /// Drop every `Speaker` first, otherwise this blocks forever.
    pub fn join(self) {
        if self.handle.join().is_err() {
            log::error!("event=speech_queue_join module=speech status=error");
        }
    }
}
