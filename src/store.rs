use crate::schedule::ShiftSlot;

/// Staging surface for slot persistence. The reconciliation engine records
/// which slots should be inserted or deleted; deciding when (and whether)
/// to commit them is the caller's concern. Boundary refreshes on preserved
/// slots travel with the owning shift aggregate instead.
pub trait SlotStore {
    fn stage_insert(&mut self, slot: &ShiftSlot);
    fn stage_remove(&mut self, slot: &ShiftSlot);
}

/// In-memory staging area used by the CLI and web layers, and by tests.
#[derive(Debug, Default)]
pub struct PendingChanges {
    pub inserts: Vec<ShiftSlot>,
    pub removes: Vec<ShiftSlot>,
}

impl PendingChanges {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.inserts.clear();
        self.removes.clear();
    }
}

impl SlotStore for PendingChanges {
    fn stage_insert(&mut self, slot: &ShiftSlot) {
        self.inserts.push(slot.clone());
    }

    fn stage_remove(&mut self, slot: &ShiftSlot) {
        self.removes.push(slot.clone());
    }
}
