//! Speech capture boundary and the listening loop.
//!
//! # Responsibility
//! - Define the `recognize(timeout, phrase_limit)` contract of a
//!   speech-to-text engine.
//! - Run the capture loop that forwards recognized text to the owning
//!   context.
//!
//! # Invariants
//! - Timeouts are retried silently; unintelligible audio is reported and
//!   retried; a service error ends the loop.
//! - The cancel token is checked between attempts, so a stop request is
//!   honored within one attempt timeout.
//! - Recognized text is lower-cased before it leaves this module.

use crate::cancel::CancelToken;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Status shown when audio was captured but not understood.
pub const UNINTELLIGIBLE_STATUS: &str = "Could not understand audio";

/// Calibration window before the first attempt.
const INITIAL_CALIBRATION: Duration = Duration::from_secs(1);
/// Calibration window before every attempt.
const ATTEMPT_CALIBRATION: Duration = Duration::from_millis(500);

/// One failed recognition attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecognitionError {
    /// No speech started within the attempt timeout.
    Timeout,
    /// Speech was captured but could not be transcribed.
    Unintelligible,
    /// The recognition backend failed; listening must stop.
    Service(String),
}

impl Display for RecognitionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout => write!(f, "no speech detected before timeout"),
            Self::Unintelligible => write!(f, "speech was not intelligible"),
            Self::Service(message) => write!(f, "speech recognition service error: {message}"),
        }
    }
}

impl Error for RecognitionError {}

/// Speech-to-text engine contract.
pub trait SpeechRecognizer: Send {
    /// Captures one phrase and returns its transcription.
    ///
    /// `timeout` bounds the wait for speech to start; `phrase_time_limit`
    /// caps the phrase length.
    fn recognize(
        &mut self,
        timeout: Duration,
        phrase_time_limit: Duration,
    ) -> Result<String, RecognitionError>;

    /// Samples background noise to set the energy threshold.
    fn adjust_for_ambient_noise(&mut self, _duration: Duration) {}
}

/// Per-attempt listening bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ListenSettings {
    pub timeout: Duration,
    pub phrase_time_limit: Duration,
}

impl Default for ListenSettings {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(2),
            phrase_time_limit: Duration::from_secs(5),
        }
    }
}

/// What the capture loop hands to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureEvent {
    /// Lower-cased recognized text.
    Command(String),
    /// Transient or terminal status for display.
    Status(String),
}

/// Background listening loop.
pub struct CaptureLoop {
    handle: JoinHandle<()>,
}

impl CaptureLoop {
    /// Starts listening on a dedicated thread.
    ///
    /// `sink` receives each event; returning `false` means the owner is
    /// gone and the loop ends.
    pub fn spawn<R, F>(
        mut recognizer: R,
        settings: ListenSettings,
        token: CancelToken,
        mut sink: F,
    ) -> io::Result<Self>
    where
        R: SpeechRecognizer + 'static,
        F: FnMut(CaptureEvent) -> bool + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("voice-capture".to_string())
            .spawn(move || {
                log::info!("event=listen_start module=recognition status=ok");
                recognizer.adjust_for_ambient_noise(INITIAL_CALIBRATION);
                run_capture(&mut recognizer, settings, &token, &mut sink);
                log::info!("event=listen_stop module=recognition status=ok");
            })?;
        Ok(Self { handle })
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits for the loop to exit. Cancel its token first.
    pub fn join(self) {
        if self.handle.join().is_err() {
            log::error!("event=listen_join module=recognition status=error");
        }
    }
}

/// Runs attempts until cancelled, the owner is gone, or the service fails.
pub fn run_capture<R, F>(
    recognizer: &mut R,
    settings: ListenSettings,
    token: &CancelToken,
    sink: &mut F,
) where
    R: SpeechRecognizer + ?Sized,
    F: FnMut(CaptureEvent) -> bool,
{
    while !token.is_cancelled() {
        recognizer.adjust_for_ambient_noise(ATTEMPT_CALIBRATION);
        let event = match recognizer.recognize(settings.timeout, settings.phrase_time_limit) {
            Ok(text) => {
                let text = text.trim().to_lowercase();
                if text.is_empty() {
                    continue;
                }
                log::debug!("event=recognized module=recognition status=ok text={text}");
                CaptureEvent::Command(text)
            }
            Err(RecognitionError::Timeout) => continue,
            Err(RecognitionError::Unintelligible) => {
                log::debug!("event=recognized module=recognition status=unintelligible");
                CaptureEvent::Status(UNINTELLIGIBLE_STATUS.to_string())
            }
            Err(RecognitionError::Service(message)) => {
                log::error!("event=recognized module=recognition status=error error={message}");
                sink(CaptureEvent::Status(format!(
                    "Speech recognition error: {message}"
                )));
                return;
            }
        };
        if token.is_cancelled() {
            return;
        }
        if !sink(event) {
            return;
        }
    }
}
