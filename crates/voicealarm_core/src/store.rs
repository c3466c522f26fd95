//! In-memory alarm store.
//!
//! # Responsibility
//! - Own the ordered alarm collection for the lifetime of the process.
//! - Expose the only append/remove entry points.
//!
//! # Invariants
//! - `list()` is insertion-ordered and reflects every prior mutation.
//! - Out-of-range or missing selections are silent no-ops.
//! - The scheduler may only flip `active` via `deactivate`.

use crate::model::alarm::{Alarm, AlarmId, AlarmValidationError, ClockTime};

/// Insertion-ordered alarm collection.
#[derive(Debug, Default)]
pub struct AlarmStore {
    alarms: Vec<Alarm>,
}

impl AlarmStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a new active alarm and returns a copy of it.
    pub fn add(
        &mut self,
        time: ClockTime,
        label: impl Into<String>,
    ) -> Result<Alarm, AlarmValidationError> {
        let alarm = Alarm::new(time, label)?;
        self.alarms.push(alarm.clone());
        log::info!(
            "event=alarm_add module=store status=ok time={} count={}",
            alarm.time,
            self.alarms.len()
        );
        Ok(alarm)
    }

    /// Removes the alarm at `index`.
    ///
    /// `None` models "nothing selected". Returns the removed alarm, or
    /// `None` when there was nothing to remove.
    pub fn delete(&mut self, index: Option<usize>) -> Option<Alarm> {
        let index = index?;
        if index >= self.alarms.len() {
            log::debug!(
                "event=alarm_delete module=store status=skipped index={index} count={}",
                self.alarms.len()
            );
            return None;
        }
        let removed = self.alarms.remove(index);
        log::info!(
            "event=alarm_delete module=store status=ok index={index} count={}",
            self.alarms.len()
        );
        Some(removed)
    }

    /// Removes every alarm and returns how many were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.alarms.len();
        self.alarms.clear();
        log::info!("event=alarm_clear module=store status=ok removed={removed}");
        removed
    }

    /// Read-only, insertion-ordered view.
    pub fn list(&self) -> &[Alarm] {
        &self.alarms
    }

    pub fn get(&self, id: AlarmId) -> Option<&Alarm> {
        self.alarms.iter().find(|alarm| alarm.id == id)
    }

    /// Flips one alarm to inactive. Returns `true` only on the
    /// active-to-inactive transition.
    pub fn deactivate(&mut self, id: AlarmId) -> bool {
        self.alarms
            .iter_mut()
            .find(|alarm| alarm.id == id)
            .map(Alarm::mark_fired)
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.alarms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.alarms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::AlarmStore;
    use crate::model::alarm::{ClockTime, Meridiem};

    fn time(hour: u32, minute: u32, meridiem: Meridiem) -> ClockTime {
        ClockTime::new(hour, minute, meridiem).unwrap()
    }

    #[test]
    fn add_preserves_insertion_order_and_duplicates() {
        let mut store = AlarmStore::new();
        let first = store.add(time(7, 0, Meridiem::Am), "Wake Up").unwrap();
        let second = store.add(time(6, 0, Meridiem::Am), "Early").unwrap();
        let dup = store.add(time(7, 0, Meridiem::Am), "Wake Up").unwrap();

        let ids: Vec<_> = store.list().iter().map(|alarm| alarm.id).collect();
        assert_eq!(ids, vec![first.id, second.id, dup.id]);
        assert_ne!(first.id, dup.id);
        assert!(store.list().iter().all(|alarm| alarm.active));
    }

    #[test]
    fn delete_ignores_missing_or_out_of_range_selection() {
        let mut store = AlarmStore::new();
        store.add(time(7, 0, Meridiem::Am), "A").unwrap();

        assert!(store.delete(None).is_none());
        assert!(store.delete(Some(3)).is_none());
        assert_eq!(store.len(), 1);

        let removed = store.delete(Some(0)).unwrap();
        assert_eq!(removed.label, "A");
        assert!(store.is_empty());
    }

    #[test]
    fn clear_empties_store() {
        let mut store = AlarmStore::new();
        store.add(time(1, 0, Meridiem::Pm), "A").unwrap();
        store.add(time(2, 0, Meridiem::Pm), "B").unwrap();
        assert_eq!(store.clear(), 2);
        assert!(store.list().is_empty());
        assert_eq!(store.clear(), 0);
    }

    #[test]
    fn deactivate_transitions_once() {
        let mut store = AlarmStore::new();
        let alarm = store.add(time(9, 30, Meridiem::Pm), "Sleep").unwrap();
        assert!(store.deactivate(alarm.id));
        assert!(!store.deactivate(alarm.id));
        assert!(!store.get(alarm.id).unwrap().active);
    }
}
