//! Calendar conventions shared by every scheduling rule.
//!
//! A [`CalendarDay`] is the unit of scheduling: a date with no time component
//! plus its [`Weekday`]. Timestamps are turned into calendar days by a
//! [`Calendar`], which truncates them to midnight in a fixed UTC offset.
//! Weekdays are numbered 0–6 starting from Sunday.
//!
//! Nothing outside this module does day-of-week arithmetic.

use std::fmt;

use chrono::{
  DateTime, Datelike, FixedOffset, NaiveDate, NaiveDateTime, Offset as _, Utc,
};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

// ─── Weekday ─────────────────────────────────────────────────────────────────

/// Day of the week, serialised as its index (Sunday = 0 … Saturday = 6).
#[derive(
  Debug,
  Clone,
  Copy,
  PartialEq,
  Eq,
  PartialOrd,
  Ord,
  Hash,
  Serialize,
  Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum Weekday {
  Sunday = 0,
  Monday = 1,
  Tuesday = 2,
  Wednesday = 3,
  Thursday = 4,
  Friday = 5,
  Saturday = 6,
}

impl Weekday {
  /// All weekdays in index order.
  pub const ALL: [Weekday; 7] = [
    Self::Sunday,
    Self::Monday,
    Self::Tuesday,
    Self::Wednesday,
    Self::Thursday,
    Self::Friday,
    Self::Saturday,
  ];

  pub fn index(self) -> u8 { self as u8 }

  /// Look up a weekday by index. Accepts a wide integer so that callers can
  /// pass unvalidated input (e.g. `-1` or `7`) and get `None` back.
  pub fn from_index(index: i64) -> Option<Self> {
    usize::try_from(index)
      .ok()
      .and_then(|i| Self::ALL.get(i).copied())
  }

  fn of(date: NaiveDate) -> Self {
    Self::ALL[date.weekday().num_days_from_sunday() as usize]
  }
}

impl From<Weekday> for u8 {
  fn from(w: Weekday) -> Self { w.index() }
}

impl TryFrom<u8> for Weekday {
  type Error = Error;

  fn try_from(index: u8) -> Result<Self> {
    Self::from_index(i64::from(index)).ok_or_else(|| {
      Error::Validation(format!("weekday {index} is outside 0..=6"))
    })
  }
}

// ─── CalendarDay ─────────────────────────────────────────────────────────────

/// A midnight-truncated date together with its weekday.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize,
)]
pub struct CalendarDay {
  pub date:    NaiveDate,
  pub weekday: Weekday,
}

impl CalendarDay {
  pub fn from_date(date: NaiveDate) -> Self {
    Self { date, weekday: Weekday::of(date) }
  }
}

impl fmt::Display for CalendarDay {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.date.format("%Y-%m-%d"))
  }
}

// ─── Calendar ────────────────────────────────────────────────────────────────

/// Turns timestamps into [`CalendarDay`]s using a fixed UTC offset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Calendar {
  offset: FixedOffset,
}

impl Default for Calendar {
  fn default() -> Self { Self::utc() }
}

impl Calendar {
  pub fn utc() -> Self {
    Self { offset: Utc.fix() }
  }

  /// A calendar whose days begin at local midnight for `minutes` east of UTC.
  pub fn with_offset_minutes(minutes: i32) -> Result<Self> {
    minutes
      .checked_mul(60)
      .and_then(FixedOffset::east_opt)
      .map(|offset| Self { offset })
      .ok_or_else(|| {
        Error::Validation(format!("UTC offset of {minutes} minutes is out of range"))
      })
  }

  /// Truncate `ts` to midnight in this calendar's offset.
  pub fn normalize(&self, ts: DateTime<Utc>) -> CalendarDay {
    CalendarDay::from_date(ts.with_timezone(&self.offset).date_naive())
  }

  /// The calendar day containing the current instant.
  pub fn today(&self) -> CalendarDay { self.normalize(Utc::now()) }

  /// Parse a user-supplied date or timestamp.
  ///
  /// Accepted forms:
  /// - `2024-01-03` (taken as that day),
  /// - an RFC 3339 timestamp such as `2024-01-03T22:15:00Z` (converted to this
  ///   calendar's offset first); a positive offset may also be written with
  ///   a space instead of `+`, as form-decoding produces,
  /// - a naive `2024-01-03T22:15:00` timestamp (already in this calendar's
  ///   offset).
  pub fn parse(&self, input: &str) -> Result<CalendarDay> {
    let s = input.trim();

    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
      return Ok(CalendarDay::from_date(date));
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
      return Ok(self.normalize(dt.with_timezone(&Utc)));
    }
    // An unescaped `+` in a query string arrives as a space.
    if let Some((head, tail)) = s.rsplit_once(' ')
      && head.contains('T')
      && let Ok(dt) = DateTime::parse_from_rfc3339(&format!("{head}+{tail}"))
    {
      return Ok(self.normalize(dt.with_timezone(&Utc)));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
      if let Ok(ndt) = NaiveDateTime::parse_from_str(s, fmt) {
        return Ok(CalendarDay::from_date(ndt.date()));
      }
    }

    Err(Error::InvalidDate(format!("cannot parse {input:?} as a date")))
  }
}
