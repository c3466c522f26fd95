//! Single-writer runtime wiring.
//!
//! # Responsibility
//! - Own the `AlarmService` on one thread and feed it every mutation
//!   request through one channel.
//! - Start and stop the scheduler ticker, the capture loop and the
//!   utterance queue.
//!
//! # Invariants
//! - Only the owner thread touches the store; command-driven and
//!   scheduler-driven mutations are serialized by the request channel.
//! - `shutdown()` stops every background thread without process exit.
//! - UI callbacks run on the owner thread; a blocking fired-alarm prompt
//!   delays later requests but never reorders them.
//! - Ticks carry the instant they were taken, so a tick queued behind an
//!   open prompt still checks the minute it was posted in.

use crate::cancel::CancelToken;
use crate::clock::Clock;
use crate::config::AlarmConfig;
use crate::model::alarm::Alarm;
use crate::recognition::{CaptureEvent, CaptureLoop, ListenSettings, SpeechRecognizer};
use crate::scheduler::{FiredAlarm, SchedulerLoop};
use crate::service::alarm_service::{AlarmService, ManualAlarmRequest, ManualInputError};
use crate::snooze::AlarmChoice;
use crate::speech::{SpeechSynthesizer, UtteranceQueue};
use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub const LISTENING_STATUS: &str = "Listening... Speak your command";
pub const IDLE_STATUS: &str = "Start listening to use voice commands";

/// UI boundary driven from the owner thread.
pub trait AlarmUi: Send {
    /// Transient status line (recognition hiccups, last command).
    fn show_status(&mut self, text: &str);

    /// Full alarm list after any change.
    fn alarms_changed(&mut self, alarms: &[Alarm]);

    /// Presents a fired alarm and blocks until the user answers.
    fn notify_alarm_fired(&mut self, fired: &FiredAlarm) -> AlarmChoice;
}

/// Mutation and query requests accepted by the owner thread.
#[derive(Debug)]
pub enum Request {
    Command(String),
    Manual(
        ManualAlarmRequest,
        Sender<Result<Alarm, ManualInputError>>,
    ),
    Delete(Option<usize>),
    Clear,
    Snapshot(Sender<Vec<Alarm>>),
    /// Due-alarm check for the minute containing this instant.
    Tick(NaiveDateTime),
    Status(String),
    Shutdown,
}

/// Runtime failure.
#[derive(Debug)]
pub enum RuntimeError {
    Spawn(io::Error),
    /// The owner thread is gone.
    Stopped,
}

impl Display for RuntimeError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Spawn(err) => write!(f, "failed to start runtime thread: {err}"),
            Self::Stopped => write!(f, "alarm runtime is stopped"),
        }
    }
}

impl Error for RuntimeError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Spawn(err) => Some(err),
            Self::Stopped => None,
        }
    }
}

impl From<io::Error> for RuntimeError {
    fn from(value: io::Error) -> Self {
        Self::Spawn(value)
    }
}

/// Cloneable request sender for UI and input layers.
#[derive(Clone)]
pub struct RuntimeHandle {
    tx: Sender<Request>,
    clock: Arc<dyn Clock>,
}

impl std::fmt::Debug for RuntimeHandle {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeHandle").finish_non_exhaustive()
    }
}

impl RuntimeHandle {
    fn send(&self, request: Request) -> Result<(), RuntimeError> {
        self.tx.send(request).map_err(|_| RuntimeError::Stopped)
    }

    /// Queues recognized (or typed) command text.
    pub fn submit_command(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Request::Command(text.into()))
    }

    /// Adds a manual alarm and waits for the owner's verdict.
    pub fn set_manual_alarm(
        &self,
        request: ManualAlarmRequest,
    ) -> Result<Result<Alarm, ManualInputError>, RuntimeError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(Request::Manual(request, reply_tx))?;
        reply_rx.recv().map_err(|_| RuntimeError::Stopped)
    }

    pub fn delete_alarm(&self, index: Option<usize>) -> Result<(), RuntimeError> {
        self.send(Request::Delete(index))
    }

    pub fn clear(&self) -> Result<(), RuntimeError> {
        self.send(Request::Clear)
    }

    /// Current alarms, after every request queued before this call.
    pub fn snapshot(&self) -> Result<Vec<Alarm>, RuntimeError> {
        let (reply_tx, reply_rx) = mpsc::channel();
        self.send(Request::Snapshot(reply_tx))?;
        reply_rx.recv().map_err(|_| RuntimeError::Stopped)
    }

    /// Requests a due-alarm check stamped with the current time.
    pub fn tick(&self) -> Result<(), RuntimeError> {
        self.send(Request::Tick(self.clock.now()))
    }

    pub fn post_status(&self, text: impl Into<String>) -> Result<(), RuntimeError> {
        self.send(Request::Status(text.into()))
    }
}

struct Listener {
    token: CancelToken,
    capture: CaptureLoop,
}

/// Running alarm clock: owner thread, scheduler, speech queue, listener.
pub struct AlarmRuntime {
    handle: RuntimeHandle,
    token: CancelToken,
    listen_settings: ListenSettings,
    owner: Option<JoinHandle<()>>,
    scheduler: Option<SchedulerLoop>,
    speech: Option<UtteranceQueue>,
    listener: Option<Listener>,
}

impl AlarmRuntime {
    /// Starts the owner thread, the utterance queue and the scheduler.
    pub fn start<S, U>(
        clock: Arc<dyn Clock>,
        synthesizer: S,
        ui: U,
        config: &AlarmConfig,
    ) -> Result<Self, RuntimeError>
    where
        S: SpeechSynthesizer + 'static,
        U: AlarmUi + 'static,
    {
        let (speech, speaker) = UtteranceQueue::start(synthesizer)?;
        let service = AlarmService::new(Arc::clone(&clock), speaker, config);
        let (tx, rx) = mpsc::channel();

        let owner = thread::Builder::new()
            .name("alarm-owner".to_string())
            .spawn(move || run_owner(service, ui, rx))?;

        let token = CancelToken::new();
        let ticker = tx.clone();
        let tick_clock = Arc::clone(&clock);
        let scheduler = SchedulerLoop::spawn(config.poll_interval(), token.clone(), move || {
            ticker.send(Request::Tick(tick_clock.now())).is_ok()
        })?;

        log::info!(
            "event=runtime_start module=runtime status=ok poll_secs={} snooze_minutes={}",
            config.poll_interval_secs,
            config.snooze_minutes
        );

        Ok(Self {
            handle: RuntimeHandle { tx, clock },
            token,
            listen_settings: config.listen_settings(),
            owner: Some(owner),
            scheduler: Some(scheduler),
            speech: Some(speech),
            listener: None,
        })
    }

    pub fn handle(&self) -> RuntimeHandle {
        self.handle.clone()
    }

    pub fn is_listening(&self) -> bool {
        self.listener
            .as_ref()
            .map(|listener| !listener.capture.is_finished())
            .unwrap_or(false)
    }

    /// Starts the capture loop. Returns `false` if already listening.
    pub fn start_listening<R>(&mut self, recognizer: R) -> Result<bool, RuntimeError>
    where
        R: SpeechRecognizer + 'static,
    {
        if self.is_listening() {
            return Ok(false);
        }
        // A loop that ended on a service error still needs joining.
        if let Some(stale) = self.listener.take() {
            stale.capture.join();
        }

        let token = CancelToken::new();
        let sink = self.handle.clone();
        let capture = CaptureLoop::spawn(
            recognizer,
            self.listen_settings,
            token.clone(),
            move |event| {
                let request = match event {
                    CaptureEvent::Command(text) => Request::Command(text),
                    CaptureEvent::Status(text) => Request::Status(text),
                };
                sink.send(request).is_ok()
            },
        )?;
        self.listener = Some(Listener { token, capture });
        self.handle.post_status(LISTENING_STATUS)?;
        Ok(true)
    }

    /// Stops the capture loop. Returns `false` if it was not running.
    ///
    /// Blocks for at most one recognition attempt.
    pub fn stop_listening(&mut self) -> bool {
        let Some(listener) = self.listener.take() else {
            return false;
        };
        let was_running = !listener.capture.is_finished();
        listener.token.cancel();
        listener.capture.join();
        if was_running {
            let _ = self.handle.post_status(IDLE_STATUS);
        }
        was_running
    }

    /// Stops every background thread and waits for them.
    ///
    /// Queued requests ahead of the shutdown are still processed, and
    /// queued utterances are still spoken.
    pub fn shutdown(mut self) {
        self.stop_all();
    }

    fn stop_all(&mut self) {
        self.stop_listening();
        self.token.cancel();
        if let Some(scheduler) = self.scheduler.take() {
            scheduler.join();
        }
        if let Some(owner) = self.owner.take() {
            let _ = self.handle.send(Request::Shutdown);
            if owner.join().is_err() {
                log::error!("event=owner_join module=runtime status=error");
            }
        }
        if let Some(speech) = self.speech.take() {
            speech.join();
        }
        log::info!("event=runtime_stop module=runtime status=ok");
    }
}

impl Drop for AlarmRuntime {
    fn drop(&mut self) {
        if self.owner.is_some() {
            self.stop_all();
        }
    }
}

fn run_owner<U: AlarmUi>(mut service: AlarmService, mut ui: U, rx: Receiver<Request>) {
    for request in rx {
        match request {
            Request::Command(text) => {
                ui.show_status(&format!("Command: {text}"));
                let outcome = service.handle_command(&text);
                if outcome.alarms_changed {
                    ui.alarms_changed(service.alarms());
                }
            }
            Request::Manual(request, reply) => {
                let result = service.set_manual_alarm(&request);
                match &result {
                    Ok(_) => ui.alarms_changed(service.alarms()),
                    Err(err) => {
                        log::info!("event=manual_alarm module=runtime status=rejected error={err}")
                    }
                }
                let _ = reply.send(result);
            }
            Request::Delete(index) => {
                if service.delete_alarm(index).is_some() {
                    ui.alarms_changed(service.alarms());
                }
            }
            Request::Clear => {
                service.clear_alarms();
                ui.alarms_changed(service.alarms());
            }
            Request::Snapshot(reply) => {
                let _ = reply.send(service.alarms().to_vec());
            }
            Request::Tick(now) => fire_due(&mut service, &mut ui, now),
            Request::Status(text) => ui.show_status(&text),
            Request::Shutdown => break,
        }
    }
    log::info!("event=owner_stop module=runtime status=ok");
}

fn fire_due<U: AlarmUi>(service: &mut AlarmService, ui: &mut U, now: NaiveDateTime) {
    let fired = service.poll_due_at(now);
    if fired.is_empty() {
        return;
    }
    ui.alarms_changed(service.alarms());
    for alarm in &fired {
        let choice = ui.notify_alarm_fired(alarm);
        if service.resolve_fired(alarm, choice).is_some() {
            ui.alarms_changed(service.alarms());
        }
    }
}
