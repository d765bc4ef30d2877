use crate::store::SlotStore;

use super::generator::desired_slots;
use super::types::{ReconcileReport, ShiftSlot, ShiftTask};

/// Reconciles a shift's slots with its desired schedule without touching
/// volunteer assignments.
///
/// Existing slots whose start matches a desired slot are kept and get their
/// end refreshed, so an interval edit does not lose the assignment. An
/// assigned slot that no longer matches is left exactly as it is and
/// reported as a conflict; only unassigned stragglers are removed. Desired
/// slots with no match are created unassigned. Removals and creations are
/// staged on `store`; committing them is the caller's concern.
pub fn synchronise(task: &mut ShiftTask, store: &mut dyn SlotStore) -> ReconcileReport {
    let mut desired = desired_slots(task.window_start, task.window_end, task.interval);
    let mut report = ReconcileReport::default();
    let mut kept: Vec<ShiftSlot> = Vec::with_capacity(task.slots.len() + desired.len());

    for mut slot in task.slots.drain(..) {
        if let Some(bounds) = desired.remove(&slot.start) {
            // A window or interval edit can move the boundary; the
            // assignment stays with the slot.
            slot.end = bounds.end;
            report.preserved.push(slot.clone());
            kept.push(slot);
        } else if slot.is_assigned() {
            report.conflicts.push(slot.clone());
            kept.push(slot);
        } else {
            store.stage_remove(&slot);
            report.removed.push(slot);
        }
    }

    for bounds in desired.into_values() {
        let slot = ShiftSlot::unassigned(&task.event, bounds.start, bounds.end);
        store.stage_insert(&slot);
        report.created.push(slot.clone());
        kept.push(slot);
    }

    kept.sort_by_key(|slot| slot.start);
    task.slots = kept;

    report.warning = conflict_warning(&task.name, report.conflicts.len());
    report
}

/// Throws away every existing slot, assigned or not, and regenerates the
/// full desired set. Silently discards volunteer sign-ups; callers must
/// treat this as an explicit, destructive opt-in.
pub fn force_regenerate(task: &mut ShiftTask, store: &mut dyn SlotStore) -> ReconcileReport {
    let mut report = ReconcileReport::default();

    for slot in task.slots.drain(..) {
        store.stage_remove(&slot);
        report.removed.push(slot);
    }
    let fresh = create_desired(task, store, &mut report);
    task.slots = fresh;
    report
}

/// Creation-only path for a freshly defined shift with no slots yet.
pub fn initialise(task: &mut ShiftTask, store: &mut dyn SlotStore) -> ReconcileReport {
    let mut report = ReconcileReport::default();
    let fresh = create_desired(task, store, &mut report);
    task.slots = fresh;
    report
}

fn create_desired(
    task: &ShiftTask,
    store: &mut dyn SlotStore,
    report: &mut ReconcileReport,
) -> Vec<ShiftSlot> {
    let desired = desired_slots(task.window_start, task.window_end, task.interval);
    let mut fresh: Vec<ShiftSlot> = desired
        .into_values()
        .map(|bounds| ShiftSlot::unassigned(&task.event, bounds.start, bounds.end))
        .collect();
    fresh.sort_by_key(|slot| slot.start);

    for slot in &fresh {
        store.stage_insert(slot);
        report.created.push(slot.clone());
    }
    fresh
}

fn conflict_warning(shift: &str, conflicts: usize) -> Option<String> {
    if conflicts == 0 {
        return None;
    }
    Some(format!(
        "{} sign-up(s) with assigned volunteers were left untouched for \"{}\". Adjust them manually.",
        conflicts, shift
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::interval::SlotInterval;
    use crate::schedule::types::Volunteer;
    use crate::store::PendingChanges;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, minute: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, hour, minute, 0).unwrap()
    }

    fn door_shift(interval: SlotInterval) -> ShiftTask {
        ShiftTask::new("Door", "Spring Gathering", at(9, 0), at(13, 0), interval)
    }

    fn volunteer(name: &str) -> Option<Volunteer> {
        Some(Volunteer { name: name.to_string(), contact: None })
    }

    #[test]
    fn initialise_creates_the_full_desired_set() {
        let mut task = door_shift(SlotInterval::hours(2));
        let mut staged = PendingChanges::new();
        let report = initialise(&mut task, &mut staged);

        assert_eq!(report.created.len(), 2);
        assert!(report.removed.is_empty());
        assert!(report.preserved.is_empty());
        assert!(report.conflicts.is_empty());
        assert!(report.warning.is_none());
        assert_eq!(staged.inserts.len(), 2);
        assert_eq!(task.slots[0].start, at(9, 0));
        assert_eq!(task.slots[1].start, at(11, 0));
    }

    #[test]
    fn synchronise_twice_is_idempotent() {
        let mut task = door_shift(SlotInterval::hours(2));
        let mut staged = PendingChanges::new();
        initialise(&mut task, &mut staged);

        let report = synchronise(&mut task, &mut staged);
        assert!(report.created.is_empty());
        assert!(report.removed.is_empty());
        assert_eq!(report.preserved.len(), 2);
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn matching_starts_are_preserved_even_when_assigned() {
        let mut task = door_shift(SlotInterval::hours(2));
        let mut staged = PendingChanges::new();
        initialise(&mut task, &mut staged);
        task.slot_at_mut(at(11, 0)).unwrap().volunteer = volunteer("Vera");

        let report = synchronise(&mut task, &mut staged);
        assert_eq!(report.preserved.len(), 2);
        assert!(report.created.is_empty());
        assert!(report.removed.is_empty());
        assert!(report.conflicts.is_empty());
        assert_eq!(task.slot_at(at(11, 0)).unwrap().volunteer, volunteer("Vera"));
    }

    #[test]
    fn interval_edit_refreshes_ends_in_place() {
        let mut task = door_shift(SlotInterval::hours(1));
        let mut staged = PendingChanges::new();
        initialise(&mut task, &mut staged);
        assert_eq!(task.slots.len(), 4);

        // Halving the slot count: 10:00 and 12:00 survive nothing, but the
        // 9:00 and 11:00 starts still line up and keep their slots.
        task.interval = SlotInterval::hours(2);
        task.slot_at_mut(at(11, 0)).unwrap().volunteer = volunteer("Vera");
        let report = synchronise(&mut task, &mut staged);

        assert_eq!(report.preserved.len(), 2);
        assert_eq!(report.removed.len(), 2);
        assert!(report.created.is_empty());
        assert!(report.conflicts.is_empty());
        let refreshed = task.slot_at(at(9, 0)).unwrap();
        assert_eq!(refreshed.end, at(11, 0));
        assert_eq!(task.slot_at(at(11, 0)).unwrap().end, at(13, 0));
        assert_eq!(task.slot_at(at(11, 0)).unwrap().volunteer, volunteer("Vera"));
    }

    #[test]
    fn assigned_slots_that_no_longer_match_become_conflicts() {
        let mut task = door_shift(SlotInterval::hours(2));
        let mut staged = PendingChanges::new();
        // Stale roster from an older window: 10:00 open, 11:00 taken.
        task.slots = vec![
            ShiftSlot::unassigned(&task.event, at(10, 0), at(11, 0)),
            ShiftSlot {
                event: task.event.clone(),
                start: at(11, 0),
                end: at(13, 0),
                volunteer: volunteer("Vera"),
            },
        ];
        task.interval = SlotInterval::hours(3);
        let before = task.slot_at(at(11, 0)).unwrap().clone();

        let report = synchronise(&mut task, &mut staged);

        // Desired is {09:00-12:00} only; 12:00-13:00 would be partial.
        assert_eq!(report.created.len(), 1);
        assert_eq!(report.created[0].start, at(9, 0));
        assert_eq!(report.created[0].end, at(12, 0));
        assert_eq!(report.removed.len(), 1);
        assert_eq!(report.removed[0].start, at(10, 0));
        assert_eq!(report.conflicts.len(), 1);
        assert!(report.preserved.is_empty());

        // The conflicting slot is untouched in every field.
        assert_eq!(task.slot_at(at(11, 0)).unwrap(), &before);

        let warning = report.warning.expect("conflicts must produce a warning");
        assert!(warning.contains('1'), "warning should carry the count: {warning}");
        assert!(warning.contains("\"Door\""), "warning should name the shift: {warning}");
        assert!(warning.contains("Adjust them manually"));
    }

    #[test]
    fn empty_window_removes_all_unassigned_slots() {
        let mut task = door_shift(SlotInterval::hours(2));
        let mut staged = PendingChanges::new();
        initialise(&mut task, &mut staged);

        task.window_end = task.window_start;
        let report = synchronise(&mut task, &mut staged);
        assert_eq!(report.removed.len(), 2);
        assert!(report.created.is_empty());
        assert!(report.preserved.is_empty());
        assert!(task.slots.is_empty());
        assert_eq!(staged.removes.len(), 2);
    }

    #[test]
    fn force_regenerate_discards_assignments() {
        let mut task = door_shift(SlotInterval::hours(2));
        let mut staged = PendingChanges::new();
        initialise(&mut task, &mut staged);
        task.slot_at_mut(at(9, 0)).unwrap().volunteer = volunteer("Vera");

        let report = force_regenerate(&mut task, &mut staged);
        assert_eq!(report.removed.len(), 2);
        assert_eq!(report.created.len(), 2);
        assert!(report.preserved.is_empty());
        assert!(report.conflicts.is_empty());
        assert!(report.warning.is_none());
        assert!(task.slots.iter().all(|slot| !slot.is_assigned()));
    }

    #[test]
    fn staged_changes_mirror_the_report() {
        let mut task = door_shift(SlotInterval::hours(1));
        let mut staged = PendingChanges::new();
        let init = initialise(&mut task, &mut staged);
        assert_eq!(staged.inserts.len(), init.created.len());

        staged.clear();
        task.interval = SlotInterval::hours(2);
        let sync = synchronise(&mut task, &mut staged);
        assert_eq!(staged.inserts.len(), sync.created.len());
        assert_eq!(staged.removes.len(), sync.removed.len());
    }
}
