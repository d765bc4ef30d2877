use std::collections::HashMap;

use chrono::{DateTime, Utc};

use super::interval::SlotInterval;

/// Upper bound on slots generated for one shift. Calendar arithmetic that
/// fails to advance the cursor stops here instead of looping forever.
pub const MAX_SLOTS_PER_TASK: usize = 1000;

/// Boundaries of one desired slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SlotBounds {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Computes the desired slot set for a window and interval, keyed by slot
/// start.
///
/// Slots are laid end to end from `window_start`; a slot whose end would
/// pass `window_end` is never produced, so a window that is not an exact
/// multiple of the interval loses the trailing remainder. An inverted or
/// empty window, or an interval with no elapsed length, yields an empty
/// set. Callers must not rely on map iteration order.
pub fn desired_slots(
    window_start: DateTime<Utc>,
    window_end: DateTime<Utc>,
    interval: SlotInterval,
) -> HashMap<DateTime<Utc>, SlotBounds> {
    let mut desired = HashMap::new();
    if interval.effective_seconds() <= 0 {
        return desired;
    }

    let mut cursor = window_start;
    while desired.len() < MAX_SLOTS_PER_TASK {
        let next = interval.advance(cursor);
        if next > window_end {
            break;
        }
        desired.insert(cursor, SlotBounds { start: cursor, end: next });
        cursor = next;
    }
    desired
}
