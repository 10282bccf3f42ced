//! The `HabitStore` trait: the storage collaborator behind [`crate::Tracker`].
//!
//! The trait is implemented by storage backends (e.g. `habitat-store-sqlite`).
//! It exposes only the narrow set of primitives the scheduling logic needs;
//! all due/summary rules are applied by the tracker, not by the backend.

use std::{collections::BTreeSet, future::Future};

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  habit::Habit,
  ledger::{CompletionState, Day, DayTally},
};

/// Abstraction over a Habitat storage backend.
///
/// Habits are insert-only. Day rows are created lazily and never deleted.
/// Completion entries are inserted and deleted, never updated.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait HabitStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Habit registry ────────────────────────────────────────────────────

  /// Persist a fully-built habit together with its weekday set.
  fn insert_habit(
    &self,
    habit: Habit,
  ) -> impl Future<Output = Result<Habit, Self::Error>> + Send + '_;

  /// Retrieve a habit by id. Returns `None` if not found.
  fn get_habit(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Habit>, Self::Error>> + Send + '_;

  /// All habits, ordered by creation day then title.
  fn list_habits(
    &self,
  ) -> impl Future<Output = Result<Vec<Habit>, Self::Error>> + Send + '_;

  // ── Day ledger ────────────────────────────────────────────────────────

  /// The ledger row for `date`, if one has been created.
  fn find_day(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Option<Day>, Self::Error>> + Send + '_;

  /// Insert a ledger row for `date` unless one exists, then return the row.
  ///
  /// Must be conflict-safe: concurrent callers for the same date all observe
  /// the same single row.
  fn get_or_create_day(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<Day, Self::Error>> + Send + '_;

  /// Ids of habits with a completion entry on `date`. Empty when no ledger
  /// row exists for that date.
  fn completed_habits(
    &self,
    date: NaiveDate,
  ) -> impl Future<Output = Result<BTreeSet<Uuid>, Self::Error>> + Send + '_;

  /// Atomically flip completion of `habit_id` on `date`, creating the day's
  /// ledger row if needed.
  ///
  /// Returns `None`, having written nothing, if the habit does not exist.
  /// Concurrent calls for the same pair must serialise so that at most one
  /// completion entry ever exists for it.
  fn toggle_completion(
    &self,
    date: NaiveDate,
    habit_id: Uuid,
  ) -> impl Future<Output = Result<Option<CompletionState>, Self::Error>>
  + Send
  + '_;

  /// Every ledger day with its completion-entry count, ordered by date
  /// ascending.
  fn day_tallies(
    &self,
  ) -> impl Future<Output = Result<Vec<DayTally>, Self::Error>> + Send + '_;
}
