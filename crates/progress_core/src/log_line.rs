use chrono::{DateTime, Utc};
use serde::Serialize;

/// One line of a job's activity log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogLine {
    pub at: DateTime<Utc>,
    /// Progress at the moment the line was written.
    pub percent: u8,
    pub message: String,
}

impl LogLine {
    /// Controllers stamp lines on the job's own timeline, so under a manual
    /// clock `at` moves with the simulated time rather than the wall clock.
    pub fn new(at: DateTime<Utc>, percent: u8, message: impl Into<String>) -> Self {
        Self {
            at,
            percent,
            message: message.into(),
        }
    }

    /// A line stamped with the current wall-clock time.
    pub fn now(percent: u8, message: impl Into<String>) -> Self {
        Self::new(Utc::now(), percent, message)
    }
}
