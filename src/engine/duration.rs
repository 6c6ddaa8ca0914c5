use chrono::{NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use rust_decimal::Decimal;

use super::FieldError;

/// Absolute start and end instants of an event.
///
/// Times of day are combined with the event date; when the end time is not
/// after the start time the event is taken to finish on the following day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EventWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl EventWindow {
    /// Build the window for `date`, rejecting identical start and end times.
    pub fn new(date: NaiveDate, start: NaiveTime, end: NaiveTime) -> Result<Self, FieldError> {
        if start == end {
            return Err(FieldError::new(
                "end_time",
                "End time must differ from start time",
            ));
        }

        let start_at = date.and_time(start);
        let mut end_at = date.and_time(end);
        if end_at <= start_at {
            end_at += TimeDelta::days(1);
        }

        Ok(Self {
            start: start_at,
            end: end_at,
        })
    }

    pub fn length(&self) -> TimeDelta {
        self.end - self.start
    }

    /// Elapsed time rounded to the nearest whole minute (30 s rounds up).
    pub fn total_minutes(&self) -> i32 {
        let seconds = self.length().num_seconds();
        ((seconds + 30) / 60) as i32
    }

    /// Length in hours with two decimals.
    pub fn hours(&self) -> Decimal {
        minutes_to_hours(self.total_minutes())
    }

    pub fn crosses_midnight(&self) -> bool {
        self.end.date() > self.start.date()
    }

    /// Inclusive on both ends: an event is running at its first and last instant.
    pub fn contains(&self, instant: NaiveDateTime) -> bool {
        self.start <= instant && instant <= self.end
    }
}

/// Minutes expressed as hours with two decimals, for display.
pub fn minutes_to_hours(minutes: i32) -> Decimal {
    (Decimal::from(minutes) / Decimal::from(60)).round_dp(2)
}

/// Human readable duration such as `4h`, `3h 30m` or `45m`.
pub fn format_minutes(minutes: i32) -> String {
    let (hours, rest) = (minutes / 60, minutes % 60);
    match (hours, rest) {
        (0, m) => format!("{m}m"),
        (h, 0) => format!("{h}h"),
        (h, m) => format!("{h}h {m}m"),
    }
}
