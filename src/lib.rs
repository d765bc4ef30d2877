//! Volunteer shift planning for member events: each shift defines a time
//! window and a slot interval, the scheduler tiles the window with slots,
//! and reconciliation keeps previously generated slots (and the volunteers
//! signed up to them) in step with edited definitions.

pub mod display;
pub mod error;
pub mod parser;
pub mod schedule;
pub mod signup;
pub mod store;
pub mod web;

pub use error::ScheduleError;
pub use schedule::{
    force_regenerate, initialise, synchronise, ReconcileReport, ShiftSlot, ShiftTask,
    SlotInterval, Volunteer,
};
pub use store::{PendingChanges, SlotStore};
