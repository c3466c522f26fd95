//! Alarm firing.
//!
//! # Responsibility
//! - Compare the current minute against active alarms and fire matches.
//! - Run the periodic tick thread that asks the owning context to check.
//!
//! # Invariants
//! - Comparison key is `HH:MM AM/PM`; seconds never matter.
//! - An alarm fires only on its active-to-inactive transition, so two
//!   polls inside the same minute fire it once.
//! - The tick thread never touches the store; it only posts ticks.

use crate::cancel::CancelToken;
use crate::model::alarm::{AlarmId, ClockTime};
use crate::store::AlarmStore;
use chrono::NaiveDateTime;
use std::io;
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Default delay between polls.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(30);

/// Snapshot of an alarm at the moment it fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FiredAlarm {
    pub id: AlarmId,
    pub time: ClockTime,
    pub label: String,
}

/// Fires every active alarm due at `now`.
///
/// Each matching alarm is flipped to inactive before it is reported.
/// Alarms are evaluated one by one; a record that vanished between
/// matching and flipping is skipped without affecting the others.
pub fn due_alarms(store: &mut AlarmStore, now: NaiveDateTime) -> Vec<FiredAlarm> {
    let key = ClockTime::from_datetime(now);
    let candidates: Vec<FiredAlarm> = store
        .list()
        .iter()
        .filter(|alarm| alarm.active && alarm.time == key)
        .map(|alarm| FiredAlarm {
            id: alarm.id,
            time: alarm.time,
            label: alarm.label.clone(),
        })
        .collect();

    candidates
        .into_iter()
        .filter(|fired| {
            let flipped = store.deactivate(fired.id);
            if !flipped {
                log::warn!(
                    "event=alarm_fire module=scheduler status=skipped id={}",
                    fired.id
                );
            }
            flipped
        })
        .inspect(|fired| {
            log::info!(
                "event=alarm_fire module=scheduler status=ok id={} time={}",
                fired.id,
                fired.time
            );
        })
        .collect()
}

/// Background ticker driving the owning context's due-alarm checks.
pub struct SchedulerLoop {
    handle: JoinHandle<()>,
}

impl SchedulerLoop {
    /// Starts the ticker.
    ///
    /// `on_tick` is invoked immediately and then once per `interval`
    /// until `token` is cancelled or `on_tick` returns `false` (the
    /// owning context has gone away).
    pub fn spawn<F>(interval: Duration, token: CancelToken, mut on_tick: F) -> io::Result<Self>
    where
        F: FnMut() -> bool + Send + 'static,
    {
        let handle = thread::Builder::new()
            .name("alarm-scheduler".to_string())
            .spawn(move || {
                log::info!(
                    "event=scheduler_start module=scheduler status=ok interval_ms={}",
                    interval.as_millis()
                );
                while !token.is_cancelled() {
                    if !on_tick() {
                        log::warn!("event=scheduler_stop module=scheduler status=owner_gone");
                        return;
                    }
                    if token.wait_timeout(interval) {
                        break;
                    }
                }
                log::info!("event=scheduler_stop module=scheduler status=ok");
            })?;
        Ok(Self { handle })
    }

    /// Waits for the ticker thread to exit. Cancel its token first.
    pub fn join(self) {
        if self.handle.join().is_err() {
            log::error!("event=scheduler_join module=scheduler status=error");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{due_alarms, SchedulerLoop};
    use crate::cancel::CancelToken;
    use crate::model::alarm::{ClockTime, Meridiem};
    use crate::store::AlarmStore;
    use chrono::NaiveDate;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    fn at(hour: u32, minute: u32, second: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 5, 2)
            .and_then(|date| date.and_hms_opt(hour, minute, second))
            .unwrap()
    }

    #[test]
    fn fires_matching_active_alarm_once_per_minute() {
        let mut store = AlarmStore::new();
        let alarm = store
            .add(ClockTime::new(7, 0, Meridiem::Am).unwrap(), "Wake Up")
            .unwrap();

        let fired = due_alarms(&mut store, at(7, 0, 5));
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].id, alarm.id);
        assert_eq!(fired[0].label, "Wake Up");

        assert!(due_alarms(&mut store, at(7, 0, 35)).is_empty());
        assert!(!store.list()[0].active);
    }

    #[test]
    fn ignores_other_minutes_and_meridiem() {
        let mut store = AlarmStore::new();
        store
            .add(ClockTime::new(7, 0, Meridiem::Am).unwrap(), "Wake Up")
            .unwrap();

        assert!(due_alarms(&mut store, at(19, 0, 0)).is_empty());
        assert!(due_alarms(&mut store, at(7, 1, 0)).is_empty());
        assert!(store.list()[0].active);
    }

    #[test]
    fn fires_every_duplicate_independently() {
        let mut store = AlarmStore::new();
        let time = ClockTime::new(12, 15, Meridiem::Pm).unwrap();
        store.add(time, "A").unwrap();
        store.add(time, "B").unwrap();

        let fired = due_alarms(&mut store, at(12, 15, 0));
        let labels: Vec<_> = fired.iter().map(|f| f.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "B"]);
    }

    #[test]
    fn loop_ticks_until_cancelled() {
        let token = CancelToken::new();
        let ticks = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&ticks);
        let scheduler = SchedulerLoop::spawn(Duration::from_millis(5), token.clone(), move || {
            counter.fetch_add(1, Ordering::SeqCst);
            true
        })
        .unwrap();

        std::thread::sleep(Duration::from_millis(50));
        token.cancel();
        scheduler.join();
        let seen = ticks.load(Ordering::SeqCst);
        assert!(seen >= 1);

        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(ticks.load(Ordering::SeqCst), seen);
    }

    #[test]
    fn loop_stops_when_owner_is_gone() {
        let token = CancelToken::new();
        let scheduler =
            SchedulerLoop::spawn(Duration::from_secs(60), token.clone(), || false).unwrap();
        scheduler.join();
        assert!(!token.is_cancelled());
    }
}
