//! Terminal stand-ins for the microphone, speaker and window.
//!
//! # Responsibility
//! - Feed typed lines to the capture loop as recognized speech.
//! - Print spoken responses, status lines and the alarm list.
//! - Route the next typed line to a pending fired-alarm prompt.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use voicealarm_core::{
    Alarm, AlarmChoice, AlarmUi, CommandSynthesizer, FiredAlarm, RecognitionError, SpeechError,
    SpeechRecognizer, SpeechSynthesizer,
};

/// Line read from stdin that is not a prompt answer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Line(String),
    Eof,
}

/// Slot holding the answer channel of the prompt currently on screen.
#[derive(Debug, Clone, Default)]
pub struct PromptSlot {
    pending: Arc<Mutex<Option<Sender<AlarmChoice>>>>,
}

impl PromptSlot {
    fn lock(&self) -> MutexGuard<'_, Option<Sender<AlarmChoice>>> {
        self.pending
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Opens a prompt and returns the receiving end of its answer.
    pub fn open(&self) -> Receiver<AlarmChoice> {
        let (tx, rx) = mpsc::channel();
        *self.lock() = Some(tx);
        rx
    }

    /// Answers the open prompt with `line`. Returns `false` when no
    /// prompt is open.
    pub fn answer(&self, line: &str) -> bool {
        let Some(tx) = self.lock().take() else {
            return false;
        };
        let _ = tx.send(parse_choice(line));
        true
    }

    /// Drops the open prompt; its waiter sees a dismissal.
    pub fn abandon(&self) {
        self.lock().take();
    }
}

/// `y`/`yes` snoozes; anything else dismisses.
pub fn parse_choice(line: &str) -> AlarmChoice {
    match line.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "snooze" => AlarmChoice::Snooze,
        _ => AlarmChoice::Dismiss,
    }
}

/// Spawns the stdin reader.
///
/// Lines answer an open prompt first; everything else goes to `inputs`.
pub fn spawn_stdin_router(prompt: PromptSlot, inputs: Sender<Input>) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name("stdin-router".to_string())
        .spawn(move || {
            for line in io::stdin().lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        log::error!("event=stdin_read module=cli status=error error={err}");
                        break;
                    }
                };
                if prompt.answer(&line) {
                    continue;
                }
                if inputs.send(Input::Line(line)).is_err() {
                    return;
                }
            }
            prompt.abandon();
            let _ = inputs.send(Input::Eof);
        })
}

/// Recognizer reading typed phrases from a shared channel.
///
/// The receiver is shared so the capture loop can be restarted after
/// `/mute` without losing the sender side.
#[derive(Debug, Clone)]
pub struct ChannelRecognizer {
    phrases: Arc<Mutex<Receiver<String>>>,
}

impl ChannelRecognizer {
    pub fn new(phrases: Arc<Mutex<Receiver<String>>>) -> Self {
        Self { phrases }
    }
}

impl SpeechRecognizer for ChannelRecognizer {
    fn recognize(
        &mut self,
        timeout: Duration,
        _phrase_time_limit: Duration,
    ) -> Result<String, RecognitionError> {
        let phrases = self
            .phrases
            .lock()
            .map_err(|_| RecognitionError::Service("phrase channel poisoned".to_string()))?;
        match phrases.recv_timeout(timeout) {
            Ok(text) => Ok(text),
            Err(RecvTimeoutError::Timeout) => Err(RecognitionError::Timeout),
            Err(RecvTimeoutError::Disconnected) => {
                Err(RecognitionError::Service("input closed".to_string()))
            }
        }
    }
}

/// Speaks by printing, or through an external TTS program.
pub enum ConsoleVoice {
    Print,
    Program(CommandSynthesizer),
}

impl SpeechSynthesizer for ConsoleVoice {
    fn speak(&mut self, text: &str) -> Result<(), SpeechError> {
        match self {
            Self::Print => {
                println!("🔊 {text}");
                Ok(())
            }
            Self::Program(synth) => {
                println!("🔊 {text}");
                synth.speak(text)
            }
        }
    }
}

/// Window replacement: prints updates and asks the snooze question.
pub struct ConsoleUi {
    prompt: PromptSlot,
    snooze_minutes: u32,
}

impl ConsoleUi {
    pub fn new(prompt: PromptSlot, snooze_minutes: u32) -> Self {
        Self {
            prompt,
            snooze_minutes,
        }
    }
}

impl AlarmUi for ConsoleUi {
    fn show_status(&mut self, text: &str) {
        println!("[status] {text}");
    }

    fn alarms_changed(&mut self, alarms: &[Alarm]) {
        print_alarms(alarms);
    }

    fn notify_alarm_fired(&mut self, fired: &FiredAlarm) -> AlarmChoice {
        let answer = self.prompt.open();
        println!("⏰ ALARM: {} ({})", fired.label, fired.time);
        println!("Snooze for {} minutes? [y/N]", self.snooze_minutes);
        answer.recv().unwrap_or(AlarmChoice::Dismiss)
    }
}

/// Numbered alarm rows, 1-based to match `/delete <n>`.
pub fn format_alarms(alarms: &[Alarm]) -> Vec<String> {
    alarms
        .iter()
        .enumerate()
        .map(|(index, alarm)| format!("{:>2}. {}", index + 1, alarm.display_row()))
        .collect()
}

pub fn print_alarms(alarms: &[Alarm]) {
    if alarms.is_empty() {
        println!("(no alarms)");
        return;
    }
    for row in format_alarms(alarms) {
        println!("{row}");
    }
}

#[cfg(test)]
mod tests {
    use super::{format_alarms, parse_choice, ChannelRecognizer, PromptSlot};
    use std::sync::mpsc;
    use std::sync::{Arc, Mutex};
    use std::time::Duration;
    use voicealarm_core::{
        Alarm, AlarmChoice, ClockTime, Meridiem, RecognitionError, SpeechRecognizer,
    };

    #[test]
    fn only_yes_snoozes() {
        assert_eq!(parse_choice(" Y "), AlarmChoice::Snooze);
        assert_eq!(parse_choice("yes"), AlarmChoice::Snooze);
        assert_eq!(parse_choice(""), AlarmChoice::Dismiss);
        assert_eq!(parse_choice("no"), AlarmChoice::Dismiss);
    }

    #[test]
    fn prompt_slot_routes_one_answer() {
        let slot = PromptSlot::default();
        assert!(!slot.answer("y"));

        let rx = slot.open();
        assert!(slot.answer("y"));
        assert_eq!(rx.recv().unwrap(), AlarmChoice::Snooze);
        assert!(!slot.answer("y"));
    }

    #[test]
    fn abandoned_prompt_reads_as_dismissal() {
        let slot = PromptSlot::default();
        let rx = slot.open();
        slot.abandon();
        assert!(rx.recv().is_err());
    }

    #[test]
    fn channel_recognizer_times_out_then_reports_closed_input() {
        let (tx, rx) = mpsc::channel();
        let mut recognizer = ChannelRecognizer::new(Arc::new(Mutex::new(rx)));
        let wait = Duration::from_millis(10);

        assert_eq!(
            recognizer.recognize(wait, wait),
            Err(RecognitionError::Timeout)
        );
        tx.send("what time is it".to_string()).unwrap();
        assert_eq!(recognizer.recognize(wait, wait).unwrap(), "what time is it");
        drop(tx);
        assert!(matches!(
            recognizer.recognize(wait, wait),
            Err(RecognitionError::Service(_))
        ));
    }

    #[test]
    fn alarm_rows_are_numbered_from_one() {
        let time = ClockTime::new(7, 0, Meridiem::Am).unwrap();
        let alarms = vec![Alarm::new(time, "Wake Up".to_string()).unwrap()];
        assert_eq!(format_alarms(&alarms), vec![" 1. ✓ 07:00 AM - Wake Up"]);
    }
}
