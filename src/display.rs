use std::fs::File;
use std::io::Write;

use chrono::{DateTime, Utc};

use crate::error::ScheduleError;
use crate::schedule::{ReconcileReport, ShiftSlot, ShiftTask};

/// Formats a slot timestamp for terminal, file, and export output (UTC).
pub fn format_slot_time(ts: DateTime<Utc>) -> String {
    ts.format("%Y-%m-%d %H:%M").to_string()
}

/// Formats one slot as "start - end [volunteer]".
pub fn format_slot(slot: &ShiftSlot) -> String {
    let who = match &slot.volunteer {
        Some(volunteer) => volunteer.name.as_str(),
        None => "OPEN",
    };
    format!(
        "{} - {} [{}]",
        format_slot_time(slot.start),
        format_slot_time(slot.end),
        who
    )
}

/// Prints a reconciliation report and the resulting roster for one shift.
pub fn print_report(shift: &ShiftTask, report: &ReconcileReport) {
    println!("\n=== {} ({}) ===", shift.name, shift.event);
    println!(
        "created: {}, removed: {}, preserved: {}, conflicts: {}",
        report.created.len(),
        report.removed.len(),
        report.preserved.len(),
        report.conflicts.len()
    );
    if let Some(warning) = &report.warning {
        println!("⚠️  {}", warning);
    }

    println!("Slots (every {}):", shift.interval);
    for slot in &shift.slots {
        println!("  {}", format_slot(slot));
    }
}

/// Writes a shift's roster to a file, one slot per line.
pub fn write_roster_to_file(shift: &ShiftTask, filename: &str) -> Result<(), ScheduleError> {
    let mut file = File::create(filename)?;

    writeln!(file, "** {} ({}) **", shift.name, shift.event)?;
    for slot in &shift.slots {
        writeln!(file, "{}", format_slot(slot))?;
    }

    Ok(())
}
