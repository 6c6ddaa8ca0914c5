//! Double-booking rules: no overlap and a minimum gap between events held on
//! the same calendar date.
//!
//! Only bookings sharing an `event_date` are compared. A booking on D from
//! 22:00 to 02:00 is not checked against one on D+1 from 01:00 to 03:00, even
//! though their absolute windows overlap.

use std::fmt;

use chrono::{NaiveDate, NaiveTime, TimeDelta};
use serde::Serialize;
use uuid::Uuid;

use super::duration::EventWindow;
use crate::models::contracts;

/// An existing booking as seen by the validator.
#[derive(Debug, Clone)]
pub struct BookedSlot {
    pub contract_id: Uuid,
    pub contract_number: String,
    pub title: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub window: EventWindow,
}

impl BookedSlot {
    /// `None` for rows whose stored times are degenerate; those can never have
    /// been admitted and are skipped.
    pub fn from_contract(contract: &contracts::Model) -> Option<Self> {
        let window =
            EventWindow::new(contract.event_date, contract.start_time, contract.end_time).ok()?;

        Some(Self {
            contract_id: contract.id,
            contract_number: contract.contract_number.clone(),
            title: contract.title.clone(),
            event_date: contract.event_date,
            start_time: contract.start_time,
            end_time: contract.end_time,
            window,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConflictKind {
    Overlap,
    InsufficientGap { gap_minutes: i64, required_minutes: i64 },
}

/// A candidate window collides with an existing booking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleConflict {
    pub contract_id: Uuid,
    pub contract_number: String,
    pub title: String,
    pub event_date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    #[serde(flatten)]
    pub kind: ConflictKind,
}

impl fmt::Display for ScheduleConflict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Schedule conflict with contract {} on {} from {} to {}",
            self.contract_number,
            self.event_date,
            self.start_time.format("%H:%M"),
            self.end_time.format("%H:%M"),
        )?;

        match self.kind {
            ConflictKind::Overlap => f.write_str(": events cannot overlap"),
            ConflictKind::InsufficientGap {
                gap_minutes,
                required_minutes,
            } => write!(
                f,
                ": only {gap_minutes} minutes between events, at least {required_minutes} required"
            ),
        }
    }
}

impl std::error::Error for ScheduleConflict {}

/// Compare `candidate` against one booking.
///
/// Intervals are half-open, so touching endpoints never overlap; they are then
/// subject to the gap rule like any other pair of separate events.
pub fn compare(
    candidate: &EventWindow,
    slot: &BookedSlot,
    min_gap: TimeDelta,
) -> Option<ConflictKind> {
    let existing = &slot.window;

    if candidate.start < existing.end && candidate.end > existing.start {
        return Some(ConflictKind::Overlap);
    }

    let gap = if candidate.start >= existing.end {
        candidate.start - existing.end
    } else {
        existing.start - candidate.end
    };

    (gap < min_gap).then(|| ConflictKind::InsufficientGap {
        gap_minutes: gap.num_minutes(),
        required_minutes: min_gap.num_minutes(),
    })
}

/// Every booking that `candidate` collides with, in the order given.
pub fn find_conflicts(
    candidate: &EventWindow,
    slots: &[BookedSlot],
    min_gap: TimeDelta,
) -> Vec<ScheduleConflict> {
    slots
        .iter()
        .filter_map(|slot| {
            compare(candidate, slot, min_gap).map(|kind| ScheduleConflict {
                contract_id: slot.contract_id,
                contract_number: slot.contract_number.clone(),
                title: slot.title.clone(),
                event_date: slot.event_date,
                start_time: slot.start_time,
                end_time: slot.end_time,
                kind,
            })
        })
        .collect()
}

/// Reject on the first colliding booking.
pub fn check(
    candidate: &EventWindow,
    slots: &[BookedSlot],
    min_gap: TimeDelta,
) -> Result<(), ScheduleConflict> {
    match find_conflicts(candidate, slots, min_gap).into_iter().next() {
        Some(conflict) => Err(conflict),
        None => Ok(()),
    }
}
