//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Calendar days are stored as `YYYY-MM-DD` strings, so lexical order is
//! chronological order. UUIDs are stored as hyphenated lowercase strings.
//! Weekdays are stored as their 0–6 index.

use chrono::NaiveDate;
use habitat_core::{
  calendar::Weekday,
  habit::{Habit, WeekdaySet},
  ledger::{CompletionEntry, Day, DayTally},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ─────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── NaiveDate ───────────────────────────────────────────────────────────────

const DATE_FORMAT: &str = "%Y-%m-%d";

pub fn encode_date(date: NaiveDate) -> String {
  date.format(DATE_FORMAT).to_string()
}

pub fn decode_date(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, DATE_FORMAT)
    .map_err(|e| Error::DateParse(format!("{s:?}: {e}")))
}

// ─── Weekday ─────────────────────────────────────────────────────────────────

pub fn decode_weekday(index: i64) -> Result<Weekday> {
  Weekday::from_index(index).ok_or(Error::UnknownWeekday(index))
}

// ─── Counts ──────────────────────────────────────────────────────────────────

pub fn decode_count(n: i64) -> Result<u32> {
  u32::try_from(n).map_err(|_| Error::InvalidCount(n))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read from a `habits` row plus its `habit_weekdays` rows.
pub struct RawHabit {
  pub habit_id:   String,
  pub title:      String,
  pub created_at: String,
  pub weekdays:   Vec<i64>,
}

impl RawHabit {
  pub fn into_habit(self) -> Result<Habit> {
    Ok(Habit {
      habit_id:   decode_uuid(&self.habit_id)?,
      title:      self.title,
      created_at: decode_date(&self.created_at)?,
      weekdays:   self
        .weekdays
        .into_iter()
        .map(decode_weekday)
        .collect::<Result<WeekdaySet>>()?,
    })
  }
}

/// Raw strings read directly from a `days` row.
pub struct RawDay {
  pub day_id: String,
  pub date:   String,
}

impl RawDay {
  pub fn into_day(self) -> Result<Day> {
    Ok(Day {
      day_id: decode_uuid(&self.day_id)?,
      date:   decode_date(&self.date)?,
    })
  }
}

/// Raw strings read directly from a `completions` row.
pub struct RawCompletion {
  pub completion_id: String,
  pub day_id:        String,
  pub habit_id:      String,
}

impl RawCompletion {
  pub fn into_entry(self) -> Result<CompletionEntry> {
    Ok(CompletionEntry {
      completion_id: decode_uuid(&self.completion_id)?,
      day_id:        decode_uuid(&self.day_id)?,
      habit_id:      decode_uuid(&self.habit_id)?,
    })
  }
}

/// A `days` row joined with its completion count.
pub struct RawDayTally {
  pub day:       RawDay,
  pub completed: i64,
}

impl RawDayTally {
  pub fn into_tally(self) -> Result<DayTally> {
    Ok(DayTally {
      day:       self.day.into_day()?,
      completed: decode_count(self.completed)?,
    })
  }
}
