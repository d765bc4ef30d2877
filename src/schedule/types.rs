use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::interval::SlotInterval;

/// A volunteer attached to a slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub name: String,
    pub contact: Option<String>,
}

/// One bounded unit of duty time, owned by its shift. Carries a copy of the
/// owning event name so exports and listings do not need the shift at hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShiftSlot {
    pub event: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub volunteer: Option<Volunteer>,
}

impl ShiftSlot {
    pub fn unassigned(event: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        ShiftSlot {
            event: event.to_string(),
            start,
            end,
            volunteer: None,
        }
    }

    pub fn is_assigned(&self) -> bool {
        self.volunteer.is_some()
    }
}

/// A recurring volunteer duty tied to an event: a time window, the slot
/// interval that tiles it, and the slots generated so far.
///
/// Slot identity is the `start` timestamp: two slots of the same shift with
/// equal starts are the same slot, whatever their ends say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShiftTask {
    pub name: String,
    pub event: String,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
    pub interval: SlotInterval,
    /// Hides the shift from the public listing; the scheduler ignores it.
    pub disable_signups: bool,
    pub slots: Vec<ShiftSlot>,
}

impl ShiftTask {
    pub fn new(
        name: &str,
        event: &str,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
        interval: SlotInterval,
    ) -> Self {
        ShiftTask {
            name: name.to_string(),
            event: event.to_string(),
            window_start,
            window_end,
            interval,
            disable_signups: false,
            slots: Vec::new(),
        }
    }

    pub fn slot_at(&self, start: DateTime<Utc>) -> Option<&ShiftSlot> {
        self.slots.iter().find(|slot| slot.start == start)
    }

    pub fn slot_at_mut(&mut self, start: DateTime<Utc>) -> Option<&mut ShiftSlot> {
        self.slots.iter_mut().find(|slot| slot.start == start)
    }
}

/// Outcome of one reconciliation run. Never persisted; it exists to tell
/// the operator what happened.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReconcileReport {
    pub created: Vec<ShiftSlot>,
    pub removed: Vec<ShiftSlot>,
    pub preserved: Vec<ShiftSlot>,
    pub conflicts: Vec<ShiftSlot>,
    pub warning: Option<String>,
}
