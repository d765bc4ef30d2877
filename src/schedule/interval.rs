use std::fmt;

use chrono::{DateTime, Duration, Months, Utc};
use serde::{Deserialize, Serialize};

use crate::error::ScheduleError;

/// Spacing between consecutive slot starts.
///
/// The month component follows calendar arithmetic (adding one month to
/// Jan 31 lands on the last day of February), so the elapsed length of an
/// interval depends on where it is applied. `effective_seconds` measures it
/// against a fixed reference instant instead of assuming any unit has a
/// constant size.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlotInterval {
    pub months: u32,
    pub days: u32,
    pub hours: u32,
    pub minutes: u32,
}

impl SlotInterval {
    pub fn minutes(minutes: u32) -> Self {
        SlotInterval { minutes, ..Default::default() }
    }

    pub fn hours(hours: u32) -> Self {
        SlotInterval { hours, ..Default::default() }
    }

    /// Advances a cursor by one interval, calendar months first, then the
    /// fixed-size components.
    pub fn advance(&self, from: DateTime<Utc>) -> DateTime<Utc> {
        from + Months::new(self.months)
            + Duration::days(i64::from(self.days))
            + Duration::hours(i64::from(self.hours))
            + Duration::minutes(i64::from(self.minutes))
    }

    /// Elapsed length of the interval in seconds, measured at the Unix
    /// epoch. Zero means the interval cannot produce slots.
    pub fn effective_seconds(&self) -> i64 {
        let reference = DateTime::<Utc>::UNIX_EPOCH;
        (self.advance(reference) - reference).num_seconds()
    }
}

impl fmt::Display for SlotInterval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.effective_seconds() == 0 {
            return write!(f, "0m");
        }
        if self.months > 0 {
            write!(f, "{}mo", self.months)?;
        }
        if self.days > 0 {
            write!(f, "{}d", self.days)?;
        }
        if self.hours > 0 {
            write!(f, "{}h", self.hours)?;
        }
        if self.minutes > 0 {
            write!(f, "{}m", self.minutes)?;
        }
        Ok(())
    }
}

/// Parses a compact interval string such as "2h", "90m", "1d12h" or "1mo".
/// A bare number is taken as minutes.
pub fn parse_interval(text: &str) -> Result<SlotInterval, ScheduleError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ScheduleError::InvalidInterval(text.to_string()));
    }

    if let Ok(minutes) = trimmed.parse::<u32>() {
        return Ok(SlotInterval::minutes(minutes));
    }

    let mut interval = SlotInterval::default();
    let mut rest = trimmed;
    while !rest.is_empty() {
        let digit_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(|| ScheduleError::InvalidInterval(text.to_string()))?;
        if digit_end == 0 {
            return Err(ScheduleError::InvalidInterval(text.to_string()));
        }
        let value: u32 = rest[..digit_end]
            .parse()
            .map_err(|_| ScheduleError::InvalidInterval(text.to_string()))?;

        let after = &rest[digit_end..];
        let unit_end = after
            .find(|c: char| c.is_ascii_digit())
            .unwrap_or(after.len());
        match &after[..unit_end] {
            "mo" => interval.months += value,
            "d" => interval.days += value,
            "h" => interval.hours += value,
            "m" => interval.minutes += value,
            _ => return Err(ScheduleError::InvalidInterval(text.to_string())),
        }
        rest = &after[unit_end..];
    }

    Ok(interval)
}
