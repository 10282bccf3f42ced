//! [`Tracker`] — the habit-tracking operations, composed over a [`HabitStore`].

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use tracing::{debug, info};
use uuid::Uuid;

use crate::{
  Error, Result,
  calendar::{Calendar, CalendarDay},
  habit::{Habit, NewHabit},
  ledger::{CompletionState, DaySummary, DayView},
  schedule::ActivationPolicy,
  store::HabitStore,
};

/// Registers habits, evaluates due habits, toggles completions and builds the
/// per-day summary.
///
/// Holds the [`Calendar`] used to turn timestamps into days and the
/// [`ActivationPolicy`] shared by due-habit evaluation and the summary.
#[derive(Debug, Clone)]
pub struct Tracker<S> {
  store:    S,
  calendar: Calendar,
  policy:   ActivationPolicy,
}

impl<S: HabitStore> Tracker<S> {
  /// A tracker on a UTC calendar with the default activation policy.
  pub fn new(store: S) -> Self {
    Self {
      store,
      calendar: Calendar::default(),
      policy: ActivationPolicy::default(),
    }
  }

  pub fn with_calendar(mut self, calendar: Calendar) -> Self {
    self.calendar = calendar;
    self
  }

  pub fn with_policy(mut self, policy: ActivationPolicy) -> Self {
    self.policy = policy;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn calendar(&self) -> &Calendar { &self.calendar }

  // ── Habit registry ──────────────────────────────────────────────────────

  /// Validate and persist a new habit created today.
  pub async fn register_habit(&self, input: NewHabit) -> Result<Habit> {
    self.register_habit_at(input, Utc::now()).await
  }

  /// Validate and persist a new habit whose creation day is the calendar day
  /// containing `now`.
  pub async fn register_habit_at(
    &self,
    input: NewHabit,
    now: DateTime<Utc>,
  ) -> Result<Habit> {
    let habit = input.into_habit(self.calendar.normalize(now))?;
    let habit = self.store.insert_habit(habit).await.map_err(Error::storage)?;
    info!(
      habit_id = %habit.habit_id,
      created_at = %habit.created_at,
      "registered habit"
    );
    Ok(habit)
  }

  pub async fn get_habit(&self, id: Uuid) -> Result<Habit> {
    self
      .store
      .get_habit(id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::HabitNotFound(id))
  }

  pub async fn list_habits(&self) -> Result<Vec<Habit>> {
    self.store.list_habits().await.map_err(Error::storage)
  }

  // ── Scheduling ──────────────────────────────────────────────────────────

  /// Ids of the habits due on `day`.
  pub async fn due_habits(&self, day: CalendarDay) -> Result<BTreeSet<Uuid>> {
    let habits = self.list_habits().await?;
    let due = self.policy.due_habits(&habits, &day);
    debug!(%day, due = due.len(), "evaluated due habits");
    Ok(due)
  }

  /// Due and completed habits for `day`. Never creates a ledger row.
  pub async fn get_day(&self, day: CalendarDay) -> Result<DayView> {
    let due_habits = self.due_habits(day).await?;
    let completed_habits = self
      .store
      .completed_habits(day.date)
      .await
      .map_err(Error::storage)?;

    Ok(DayView {
      date: day.date,
      weekday: day.weekday,
      due_habits,
      completed_habits,
    })
  }

  // ── Completion ──────────────────────────────────────────────────────────

  /// Flip completion of `habit_id` on `day` and return the new state.
  ///
  /// Two consecutive toggles cancel out. A toggle is not idempotent on its
  /// own: a caller that retries after losing the response to a toggle that
  /// did commit will flip the state back.
  pub async fn toggle_habit(
    &self,
    day: CalendarDay,
    habit_id: Uuid,
  ) -> Result<CompletionState> {
    let state = self
      .store
      .toggle_completion(day.date, habit_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::HabitNotFound(habit_id))?;
    debug!(%day, %habit_id, completed = state.completed, "toggled habit");
    Ok(state)
  }

  // ── Summary ─────────────────────────────────────────────────────────────

  /// Completed vs. due counts for every ledger day, oldest first.
  pub async fn summary(&self) -> Result<Vec<DaySummary>> {
    let habits = self.list_habits().await?;
    let tallies = self.store.day_tallies().await.map_err(Error::storage)?;
    Ok(self.policy.summarize(&habits, tallies))
  }
}
