use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use csv::{Reader, StringRecord};
use tracing::warn;

use crate::error::ScheduleError;
use crate::schedule::{parse_interval, ShiftTask};

/// Timestamp format shared by the definition sheet and the exports (UTC).
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M";

/// Parses a window timestamp in the shared CSV format.
pub fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, ScheduleError> {
    NaiveDateTime::parse_from_str(value.trim(), TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(|_| ScheduleError::InvalidTimestamp { value: value.trim().to_string() })
}

/// Parses a boolean value from various string representations
fn parse_bool(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower == "yes" || lower == "true" || lower == "1"
}

fn column(headers: &StringRecord, needle: &'static str) -> Result<usize, ScheduleError> {
    headers
        .iter()
        .position(|h| h.to_lowercase().contains(needle))
        .ok_or(ScheduleError::MissingColumn(needle))
}

/// Loads shift definitions from a CSV file.
pub fn load_shifts<P: AsRef<Path>>(csv_path: P) -> Result<Vec<ShiftTask>, ScheduleError> {
    let mut reader = Reader::from_path(csv_path)?;
    load_shifts_from_reader(&mut reader)
}

/// Loads shift definitions from any CSV reader.
///
/// Columns are located by header text, so the sheet can carry extra columns
/// in any order. Rows missing a shift name are skipped, as are rows whose
/// window or interval does not parse (each skip is logged). A repeated
/// shift name replaces the earlier definition, so an edited sheet can be
/// re-uploaded whole.
pub fn load_shifts_from_reader<R: Read>(
    reader: &mut Reader<R>,
) -> Result<Vec<ShiftTask>, ScheduleError> {
    let headers = reader.headers()?.clone();

    let event_col = column(&headers, "event")?;
    let name_col = column(&headers, "shift")?;
    let start_col = column(&headers, "window start")?;
    let end_col = column(&headers, "window end")?;
    let interval_col = column(&headers, "interval")?;
    let disable_col = column(&headers, "disable").ok();

    let mut shifts: HashMap<String, ShiftTask> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for result in reader.records() {
        let record = result?;

        let name = record.get(name_col).unwrap_or("").trim().to_string();
        if name.is_empty() {
            continue;
        }
        let event = record.get(event_col).unwrap_or("").trim().to_string();

        let window_start = match parse_timestamp(record.get(start_col).unwrap_or("")) {
            Ok(ts) => ts,
            Err(err) => {
                warn!(shift = %name, %err, "skipping shift row");
                continue;
            }
        };
        let window_end = match parse_timestamp(record.get(end_col).unwrap_or("")) {
            Ok(ts) => ts,
            Err(err) => {
                warn!(shift = %name, %err, "skipping shift row");
                continue;
            }
        };
        let interval = match parse_interval(record.get(interval_col).unwrap_or("")) {
            Ok(interval) => interval,
            Err(err) => {
                warn!(shift = %name, %err, "skipping shift row");
                continue;
            }
        };

        let mut task = ShiftTask::new(&name, &event, window_start, window_end, interval);
        task.disable_signups = disable_col
            .map(|col| parse_bool(record.get(col).unwrap_or("")))
            .unwrap_or(false);

        // Last definition wins, but the sheet's row order is kept.
        if shifts.insert(name.clone(), task).is_none() {
            order.push(name);
        }
    }

    Ok(order.into_iter().filter_map(|name| shifts.remove(&name)).collect())
}
