use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::sync::mpsc::Receiver;
use std::sync::Arc;
use voicealarm_core::{
    AlarmChoice, AlarmConfig, AlarmService, ManualAlarmRequest, ManualClock, Speaker,
};

fn at(hour: u32, minute: u32, second: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2026, 10, 19)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .expect("valid test timestamp")
}

fn service_with_clock(
    now: NaiveDateTime,
    config: &AlarmConfig,
) -> (AlarmService, Arc<ManualClock>, Receiver<String>) {
    let clock = Arc::new(ManualClock::new(now));
    let (speaker, spoken) = Speaker::channel();
    let service = AlarmService::new(clock.clone(), speaker, config);
    (service, clock, spoken)
}

fn manual(hour: &str, minute: &str, meridiem: &str, label: &str) -> ManualAlarmRequest {
    ManualAlarmRequest {
        hour: hour.to_string(),
        minute: minute.to_string(),
        meridiem: meridiem.to_string(),
        label: label.to_string(),
    }
}

#[test]
fn alarm_fires_once_across_two_polls_in_same_minute() {
    let (mut service, clock, spoken) = service_with_clock(at(6, 59, 40), &AlarmConfig::default());
    service
        .set_manual_alarm(&manual("7", "00", "AM", "Wake Up"))
        .unwrap();

    assert!(service.poll_due().is_empty());

    clock.set(at(7, 0, 10));
    let fired = service.poll_due();
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].label, "Wake Up");
    assert_eq!(fired[0].time.to_string(), "07:00 AM");

    clock.advance(Duration::seconds(30));
    assert!(service.poll_due().is_empty());
    assert!(!service.alarms()[0].active);

    let queued: Vec<String> = spoken.try_iter().collect();
    assert_eq!(queued, vec!["Alarm! Wake Up. Time is 07:00 AM"]);
}

#[test]
fn snooze_appends_new_alarm_and_keeps_original_inactive() {
    let (mut service, clock, _spoken) =
        service_with_clock(at(7, 0, 0), &AlarmConfig::default());
    service
        .set_manual_alarm(&manual("7", "00", "AM", "Wake Up"))
        .unwrap();
    let fired = service.poll_due().remove(0);

    clock.set(at(6, 59, 50));
    let snoozed = service
        .resolve_fired(&fired, AlarmChoice::Snooze)
        .expect("snooze should create an alarm");
    assert_eq!(snoozed.time.to_string(), "07:04 AM");
    assert_eq!(snoozed.label, "Wake Up (Snoozed)");
    assert!(snoozed.active);

    let alarms = service.alarms();
    assert_eq!(alarms.len(), 2);
    assert_eq!(alarms[0].id, fired.id);
    assert!(!alarms[0].active);
    assert_eq!(alarms[1].id, snoozed.id);
}

#[test]
fn dismiss_creates_nothing() {
    let (mut service, _clock, _spoken) =
        service_with_clock(at(21, 15, 0), &AlarmConfig::default());
    service
        .set_manual_alarm(&manual("9", "15", "PM", ""))
        .unwrap();
    let fired = service.poll_due().remove(0);

    assert!(service.resolve_fired(&fired, AlarmChoice::Dismiss).is_none());
    assert_eq!(service.alarms().len(), 1);
}

#[test]
fn snoozed_alarm_fires_after_configured_delay() {
    let config = AlarmConfig {
        snooze_minutes: 10,
        ..AlarmConfig::default()
    };
    let (mut service, clock, _spoken) = service_with_clock(at(11, 55, 0), &config);
    service.handle_command("set alarm for 11:55 am stretch");
    let fired = service.poll_due().remove(0);
    service.resolve_fired(&fired, AlarmChoice::Snooze).unwrap();

    clock.set(at(12, 4, 0));
    assert!(service.poll_due().is_empty());

    clock.set(at(12, 5, 20));
    let refired = service.poll_due();
    assert_eq!(refired.len(), 1);
    assert_eq!(refired[0].label, "Stretch (Snoozed)");
    assert_eq!(refired[0].time.to_string(), "12:05 PM");
}

#[test]
fn deleted_alarm_never_fires() {
    let (mut service, _clock, _spoken) =
        service_with_clock(at(8, 30, 0), &AlarmConfig::default());
    service.handle_command("set alarm for 8:30 am");
    service.delete_alarm(Some(0));
    assert!(service.poll_due().is_empty());
}

#[test]
fn clear_then_list_is_empty() {
    let (mut service, _clock, _spoken) =
        service_with_clock(at(8, 30, 0), &AlarmConfig::default());
    service.handle_command("set alarm for 9 am");
    service
        .set_manual_alarm(&manual("10", "15", "pm", "Read"))
        .unwrap();

    assert_eq!(service.clear_alarms(), 2);
    assert!(service.alarms().is_empty());
}

#[test]
fn late_handled_check_uses_the_instant_it_was_taken() {
    let (mut service, clock, _spoken) =
        service_with_clock(at(7, 0, 0), &AlarmConfig::default());
    service
        .set_manual_alarm(&manual("7", "01", "AM", "Stand Up"))
        .unwrap();

    let taken = at(7, 1, 10);
    clock.set(at(7, 2, 5));
    assert!(service.poll_due().is_empty());

    let fired = service.poll_due_at(taken);
    assert_eq!(fired.len(), 1);
    assert_eq!(fired[0].label, "Stand Up");
    assert!(service.poll_due_at(taken).is_empty());
}
