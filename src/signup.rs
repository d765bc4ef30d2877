use std::collections::HashMap;
use std::io::Write;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::display::format_slot_time;
use crate::error::ScheduleError;
use crate::schedule::{ShiftTask, Volunteer};

/// A volunteer sign-up for one open slot, as submitted from the public form.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub shift: String,
    pub slot_start: DateTime<Utc>,
    pub name: String,
    pub contact: Option<String>,
}

/// Validates a sign-up against the current shift map.
pub fn validate_signup(
    req: &SignupRequest,
    shifts: &HashMap<String, ShiftTask>,
) -> Result<(), ScheduleError> {
    if req.name.trim().is_empty() {
        return Err(ScheduleError::InvalidSignup("volunteer name is required".to_string()));
    }

    let task = shifts
        .get(&req.shift)
        .ok_or_else(|| ScheduleError::UnknownShift(req.shift.clone()))?;
    if task.disable_signups {
        return Err(ScheduleError::SignupsDisabled(req.shift.clone()));
    }

    let slot = task.slot_at(req.slot_start).ok_or_else(|| ScheduleError::UnknownSlot {
        shift: req.shift.clone(),
        start: format_slot_time(req.slot_start),
    })?;
    if slot.is_assigned() {
        return Err(ScheduleError::SlotTaken(format_slot_time(req.slot_start)));
    }

    Ok(())
}

/// Validates a sign-up and assigns the volunteer to the slot.
pub fn apply_signup(
    req: &SignupRequest,
    shifts: &mut HashMap<String, ShiftTask>,
) -> Result<(), ScheduleError> {
    validate_signup(req, shifts)?;

    if let Some(slot) = shifts
        .get_mut(&req.shift)
        .and_then(|task| task.slot_at_mut(req.slot_start))
    {
        slot.volunteer = Some(Volunteer {
            name: req.name.trim().to_string(),
            contact: req.contact.clone(),
        });
    }
    Ok(())
}

/// Writes every current assignment as CSV, one row per assigned slot.
pub fn export_assignments<'a, W, I>(shifts: I, writer: W) -> Result<(), ScheduleError>
where
    W: Write,
    I: IntoIterator<Item = &'a ShiftTask>,
{
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["event", "shift", "start (UTC)", "end (UTC)", "volunteer", "contact"])?;

    for task in shifts {
        for slot in &task.slots {
            if let Some(volunteer) = &slot.volunteer {
                let start = format_slot_time(slot.start);
                let end = format_slot_time(slot.end);
                wtr.write_record([
                    slot.event.as_str(),
                    task.name.as_str(),
                    start.as_str(),
                    end.as_str(),
                    volunteer.name.as_str(),
                    volunteer.contact.as_deref().unwrap_or(""),
                ])?;
            }
        }
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::{initialise, SlotInterval};
    use crate::store::PendingChanges;
    use chrono::TimeZone;

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 5, 1, hour, 0, 0).unwrap()
    }

    fn shift_map() -> HashMap<String, ShiftTask> {
        let mut task = ShiftTask::new(
            "Door",
            "Spring Gathering",
            at(9),
            at(13),
            SlotInterval::hours(2),
        );
        initialise(&mut task, &mut PendingChanges::new());
        HashMap::from([(task.name.clone(), task)])
    }

    fn request(shift: &str, hour: u32, name: &str) -> SignupRequest {
        SignupRequest {
            shift: shift.to_string(),
            slot_start: at(hour),
            name: name.to_string(),
            contact: None,
        }
    }

    #[test]
    fn applies_a_valid_signup() {
        let mut shifts = shift_map();
        apply_signup(&request("Door", 9, "Vera"), &mut shifts).unwrap();
        let slot = shifts["Door"].slot_at(at(9)).unwrap();
        assert_eq!(slot.volunteer.as_ref().unwrap().name, "Vera");
    }

    #[test]
    fn rejects_blank_names_unknown_shifts_and_unknown_slots() {
        let mut shifts = shift_map();
        assert!(matches!(
            apply_signup(&request("Door", 9, "  "), &mut shifts),
            Err(ScheduleError::InvalidSignup(_))
        ));
        assert!(matches!(
            apply_signup(&request("Bar", 9, "Vera"), &mut shifts),
            Err(ScheduleError::UnknownShift(_))
        ));
        assert!(matches!(
            apply_signup(&request("Door", 10, "Vera"), &mut shifts),
            Err(ScheduleError::UnknownSlot { .. })
        ));
    }

    #[test]
    fn rejects_taken_slots_and_disabled_shifts() {
        let mut shifts = shift_map();
        apply_signup(&request("Door", 9, "Vera"), &mut shifts).unwrap();
        assert!(matches!(
            apply_signup(&request("Door", 9, "Onni"), &mut shifts),
            Err(ScheduleError::SlotTaken(_))
        ));

        shifts.get_mut("Door").unwrap().disable_signups = true;
        assert!(matches!(
            apply_signup(&request("Door", 11, "Onni"), &mut shifts),
            Err(ScheduleError::SignupsDisabled(_))
        ));
    }

    #[test]
    fn exports_only_assigned_slots() {
        let mut shifts = shift_map();
        apply_signup(&request("Door", 11, "Vera"), &mut shifts).unwrap();

        let mut out = Vec::new();
        export_assignments(shifts.values(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();

        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "event,shift,start (UTC),end (UTC),volunteer,contact"
        );
        assert_eq!(
            lines.next().unwrap(),
            "Spring Gathering,Door,2026-05-01 11:00,2026-05-01 13:00,Vera,"
        );
        assert!(lines.next().is_none());
    }
}
