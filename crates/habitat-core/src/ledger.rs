//! Day ledger records and the read models derived from them.
//!
//! A [`Day`] row exists only once something has been toggled on that date.
//! Completion state is the presence of a [`CompletionEntry`] for a
//! `(day, habit)` pair; there is no boolean column that could disagree with it.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::calendar::Weekday;

// ─── Ledger records ──────────────────────────────────────────────────────────

/// The ledger row for one calendar date. At most one exists per date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Day {
  pub day_id: Uuid,
  pub date:   NaiveDate,
}

/// Evidence that a habit was completed on a day.
/// At most one exists per `(day_id, habit_id)` pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionEntry {
  pub completion_id: Uuid,
  pub day_id:        Uuid,
  pub habit_id:      Uuid,
}

/// Result of a toggle: the completion state after the flip.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionState {
  pub completed: bool,
}

// ─── Read models ─────────────────────────────────────────────────────────────

/// What a single calendar day looks like: which habits are due and which have
/// been completed.
///
/// `completed_habits` is read straight from the ledger, so it may name a
/// habit that is not (or no longer) due on that day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayView {
  pub date:             NaiveDate,
  pub weekday:          Weekday,
  pub due_habits:       BTreeSet<Uuid>,
  pub completed_habits: BTreeSet<Uuid>,
}

/// A ledger day together with its number of completion entries, as produced
/// by the storage aggregate query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayTally {
  pub day:       Day,
  pub completed: u32,
}

/// One row of the summary: completed vs. due habits on a ledger day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DaySummary {
  pub day_id:    Uuid,
  pub date:      NaiveDate,
  pub completed: u32,
  pub due:       u32,
}

impl DaySummary {
  /// Completed over due, or `None` when nothing was due.
  pub fn ratio(&self) -> Option<f64> {
    (self.due > 0).then(|| f64::from(self.completed) / f64::from(self.due))
  }
}
