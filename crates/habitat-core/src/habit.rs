//! Habit definitions and their weekday recurrence sets.
//!
//! A habit is created once and never changed afterwards: its id, title,
//! creation day and weekday set are fixed at registration.

use std::collections::BTreeSet;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Error, Result,
  calendar::{CalendarDay, Weekday},
};

// ─── WeekdaySet ──────────────────────────────────────────────────────────────

/// The weekdays on which a habit recurs. Duplicates collapse; iteration and
/// serialisation are in index order (`[1,3,5]`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeekdaySet(BTreeSet<Weekday>);

impl WeekdaySet {
  /// Validate raw weekday indices, rejecting anything outside 0..=6.
  pub fn from_indices<I>(indices: I) -> Result<Self>
  where
    I: IntoIterator<Item = i64>,
  {
    indices
      .into_iter()
      .map(|i| {
        Weekday::from_index(i).ok_or_else(|| {
          Error::Validation(format!("weekday {i} is outside 0..=6"))
        })
      })
      .collect::<Result<BTreeSet<_>>>()
      .map(Self)
  }

  pub fn contains(&self, weekday: Weekday) -> bool { self.0.contains(&weekday) }

  pub fn is_empty(&self) -> bool { self.0.is_empty() }

  pub fn iter(&self) -> impl Iterator<Item = Weekday> + '_ {
    self.0.iter().copied()
  }
}

impl FromIterator<Weekday> for WeekdaySet {
  fn from_iter<T: IntoIterator<Item = Weekday>>(iter: T) -> Self {
    Self(iter.into_iter().collect())
  }
}

// ─── Habit ───────────────────────────────────────────────────────────────────

/// A recurring task with a weekday pattern and a creation day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Habit {
  pub habit_id:   Uuid,
  pub title:      String,
  /// The calendar day on which the habit was registered.
  pub created_at: NaiveDate,
  pub weekdays:   WeekdaySet,
}

impl Habit {
  /// Whether `day`'s weekday is one this habit recurs on. Says nothing about
  /// whether the habit existed yet; see [`crate::schedule`].
  pub fn recurs_on(&self, day: &CalendarDay) -> bool {
    self.weekdays.contains(day.weekday)
  }
}

// ─── NewHabit ────────────────────────────────────────────────────────────────

/// Unvalidated input to [`crate::Tracker::register_habit`].
///
/// Weekdays are kept as wide integers so out-of-range values surface as a
/// validation error instead of a decoding failure.
#[derive(Debug, Clone, Deserialize)]
pub struct NewHabit {
  pub title:    String,
  #[serde(alias = "weekDays")]
  pub weekdays: Vec<i64>,
}

impl NewHabit {
  pub fn new(title: impl Into<String>, weekdays: impl IntoIterator<Item = i64>) -> Self {
    Self { title: title.into(), weekdays: weekdays.into_iter().collect() }
  }

  /// Check the input and build the persisted [`Habit`], stamped with
  /// `created_at`.
  pub fn into_habit(self, created_at: CalendarDay) -> Result<Habit> {
    let title = self.title.trim();
    if title.is_empty() {
      return Err(Error::Validation("title must not be empty".into()));
    }
    let weekdays = WeekdaySet::from_indices(self.weekdays)?;

    Ok(Habit {
      habit_id: Uuid::new_v4(),
      title: title.to_owned(),
      created_at: created_at.date,
      weekdays,
    })
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn monday() -> CalendarDay {
    CalendarDay::from_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
  }

  #[test]
  fn weekdays_are_deduplicated_and_sorted() {
    let habit = NewHabit::new("Drink water", [5, 1, 3, 1, 5])
      .into_habit(monday())
      .unwrap();
    let indices: Vec<u8> = habit.weekdays.iter().map(Weekday::index).collect();
    assert_eq!(indices, vec![1, 3, 5]);
    assert_eq!(serde_json::to_string(&habit.weekdays).unwrap(), "[1,3,5]");
  }

  #[test]
  fn title_is_trimmed() {
    let habit = NewHabit::new("  Read  ", [0]).into_habit(monday()).unwrap();
    assert_eq!(habit.title, "Read");
    assert_eq!(habit.created_at, monday().date);
  }

  #[test]
  fn empty_title_is_rejected() {
    for title in ["", "   \t"] {
      let err = NewHabit::new(title, [1]).into_habit(monday()).unwrap_err();
      assert!(matches!(err, Error::Validation(_)));
    }
  }

  #[test]
  fn out_of_range_weekday_is_rejected() {
    for bad in [7, -1, 42] {
      let err = NewHabit::new("Run", [1, bad]).into_habit(monday()).unwrap_err();
      assert!(matches!(err, Error::Validation(_)), "{bad} gave {err:?}");
    }
  }

  #[test]
  fn empty_weekday_set_is_allowed() {
    let habit = NewHabit::new("Someday", Vec::new()).into_habit(monday()).unwrap();
    assert!(habit.weekdays.is_empty());
    assert!(!habit.recurs_on(&monday()));
  }

  #[test]
  fn new_habit_accepts_camel_case_weekdays() {
    let input: NewHabit =
      serde_json::from_str(r#"{"title":"Stretch","weekDays":[0,6]}"#).unwrap();
    assert_eq!(input.weekdays, vec![0, 6]);
  }
}
