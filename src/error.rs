use thiserror::Error;

/// Errors surfaced by the ingestion, sign-up, and export paths.
///
/// The scheduling core itself is total: degenerate windows and intervals
/// produce an empty desired set, never one of these.
#[derive(Debug, Error)]
pub enum ScheduleError {
    #[error("failed to read CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("missing required column containing {0:?}")]
    MissingColumn(&'static str),

    #[error("invalid timestamp {value:?}, expected YYYY-MM-DD HH:MM (UTC)")]
    InvalidTimestamp { value: String },

    #[error("invalid interval {0:?}, expected e.g. \"2h\", \"90m\", \"1d12h\", \"1mo\"")]
    InvalidInterval(String),

    #[error("unknown shift {0:?}")]
    UnknownShift(String),

    #[error("shift {shift:?} has no slot starting at {start}")]
    UnknownSlot { shift: String, start: String },

    #[error("the slot starting at {0} is already taken")]
    SlotTaken(String),

    #[error("sign-ups are disabled for shift {0:?}")]
    SignupsDisabled(String),

    #[error("invalid sign-up: {0}")]
    InvalidSignup(String),
}
