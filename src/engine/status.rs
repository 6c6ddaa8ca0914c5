//! Contract lifecycle.
//!
//! ```text
//! pending ──confirm──▶ confirmed ──start──▶ in_progress ──complete──▶ completed
//!    └──────cancel──────────┴──▶ cancelled
//! ```
//!
//! Besides the explicit transitions, every save re-derives the status from the
//! clock and the advance payment. `cancelled` is never derived and never left.

use std::fmt;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::Serialize;
use thiserror::Error;

use super::duration::EventWindow;
use crate::models::contracts::Status;

/// User-triggered lifecycle actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Transition {
    Confirm,
    Start,
    Complete,
    Cancel,
}

impl Transition {
    pub fn as_str(self) -> &'static str {
        match self {
            Transition::Confirm => "confirm",
            Transition::Start => "start",
            Transition::Complete => "complete",
            Transition::Cancel => "cancel",
        }
    }
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error, Serialize)]
#[error("Cannot {transition} a contract that is {from}")]
pub struct IllegalTransition {
    pub from: Status,
    pub transition: Transition,
}

impl Status {
    pub fn is_terminal(self) -> bool {
        matches!(self, Status::Completed | Status::Cancelled)
    }

    /// Whether a contract in this status occupies its time slot.
    pub fn blocks_schedule(self) -> bool {
        matches!(
            self,
            Status::Pending | Status::Confirmed | Status::InProgress
        )
    }

    /// Statuses that occupy a time slot, for repository filters.
    pub fn blocking() -> [Status; 3] {
        [Status::Pending, Status::Confirmed, Status::InProgress]
    }

    /// Target of `transition`, if the transition table allows it from `self`.
    pub fn after(self, transition: Transition) -> Option<Status> {
        use Status::*;
        use Transition::*;

        match (self, transition) {
            (Pending, Confirm) => Some(Confirmed),
            (Confirmed, Start) => Some(InProgress),
            (InProgress, Complete) => Some(Completed),
            (Pending | Confirmed, Cancel) => Some(Cancelled),
            _ => None,
        }
    }

    pub fn apply(self, transition: Transition) -> Result<Status, IllegalTransition> {
        self.after(transition).ok_or(IllegalTransition {
            from: self,
            transition,
        })
    }

    /// Position along the forward path; `cancelled` sits outside it.
    pub fn progress_rank(self) -> Option<u8> {
        match self {
            Status::Pending => Some(0),
            Status::Confirmed => Some(1),
            Status::InProgress => Some(2),
            Status::Completed => Some(3),
            Status::Cancelled => None,
        }
    }

    /// Status implied by the clock and the payment state.
    pub fn derive(
        self,
        window: &EventWindow,
        now: NaiveDateTime,
        advance_payment: Decimal,
    ) -> Status {
        if self == Status::Cancelled {
            return Status::Cancelled;
        }

        if now > window.end {
            Status::Completed
        } else if window.contains(now) {
            Status::InProgress
        } else if advance_payment > Decimal::ZERO {
            Status::Confirmed
        } else {
            Status::Pending
        }
    }
}
