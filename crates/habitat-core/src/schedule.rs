//! Scheduling rules: which habits apply to a calendar day.
//!
//! Both the due-habit evaluation and the summary's due count go through
//! [`ActivationPolicy::is_habit_active_on`], so the creation-day boundary is
//! decided in exactly one place.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  calendar::CalendarDay,
  habit::Habit,
  ledger::{DaySummary, DayTally},
};

/// When a newly registered habit starts counting.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActivationPolicy {
  /// Active from the day after registration (`created_at < day`).
  #[default]
  NextDay,
  /// Active from the registration day itself (`created_at <= day`).
  SameDay,
}

impl ActivationPolicy {
  /// Whether `habit` already existed on `day` under this policy.
  pub fn is_habit_active_on(self, habit: &Habit, day: &CalendarDay) -> bool {
    match self {
      Self::NextDay => habit.created_at < day.date,
      Self::SameDay => habit.created_at <= day.date,
    }
  }

  /// Whether `habit` is due on `day`: it recurs on that weekday and is active.
  pub fn is_due(self, habit: &Habit, day: &CalendarDay) -> bool {
    habit.recurs_on(day) && self.is_habit_active_on(habit, day)
  }

  /// Ids of the habits in `habits` that are due on `day`.
  pub fn due_habits<'a, I>(self, habits: I, day: &CalendarDay) -> BTreeSet<Uuid>
  where
    I: IntoIterator<Item = &'a Habit>,
  {
    habits
      .into_iter()
      .filter(|h| self.is_due(h, day))
      .map(|h| h.habit_id)
      .collect()
  }

  /// Number of habits in `habits` due on `day`.
  pub fn due_count<'a, I>(self, habits: I, day: &CalendarDay) -> u32
  where
    I: IntoIterator<Item = &'a Habit>,
  {
    let n = habits.into_iter().filter(|h| self.is_due(h, day)).count();
    u32::try_from(n).unwrap_or(u32::MAX)
  }

  /// Pair each ledger tally with its due count. Output order follows
  /// `tallies`.
  pub fn summarize(self, habits: &[Habit], tallies: Vec<DayTally>) -> Vec<DaySummary> {
    tallies
      .into_iter()
      .map(|t| {
        let day = CalendarDay::from_date(t.day.date);
        DaySummary {
          day_id:    t.day.day_id,
          date:      t.day.date,
          completed: t.completed,
          due:       self.due_count(habits, &day),
        }
      })
      .collect()
  }
}
