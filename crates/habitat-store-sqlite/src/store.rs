//! [`SqliteStore`] — the SQLite implementation of [`HabitStore`].

use std::{
  collections::{BTreeSet, HashMap},
  path::Path,
};

use chrono::NaiveDate;
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use tracing::debug;
use uuid::Uuid;

use habitat_core::{
  habit::Habit,
  ledger::{CompletionEntry, CompletionState, Day, DayTally},
  store::HabitStore,
};

use crate::{
  Result,
  encode::{RawCompletion, RawDay, RawDayTally, RawHabit, encode_date, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Habitat store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All clones
/// share one connection thread, so calls are applied one at a time.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Number of ledger rows for `date`. Only ever 0 or 1; exposed so tests can
  /// check the uniqueness invariant directly.
  pub async fn day_row_count(&self, date: NaiveDate) -> Result<i64> {
    let date_str = encode_date(date);
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT count(*) FROM days WHERE date = ?1",
          rusqlite::params![date_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n)
  }

  /// Number of completion entries for `(date, habit_id)`. Only ever 0 or 1.
  pub async fn completion_row_count(
    &self,
    date: NaiveDate,
    habit_id: Uuid,
  ) -> Result<i64> {
    let date_str  = encode_date(date);
    let habit_str = encode_uuid(habit_id);
    let n: i64 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT count(*)
           FROM completions c
           JOIN days d ON d.day_id = c.day_id
           WHERE d.date = ?1 AND c.habit_id = ?2",
          rusqlite::params![date_str, habit_str],
          |r| r.get(0),
        )?)
      })
      .await?;
    Ok(n)
  }
}

impl SqliteStore {
  /// Every completion entry recorded on `date`. Empty when no ledger row
  /// exists for that date.
  pub async fn completion_entries(
    &self,
    date: NaiveDate,
  ) -> Result<Vec<CompletionEntry>> {
    let date_str = encode_date(date);

    let raws: Vec<RawCompletion> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT c.completion_id, c.day_id, c.habit_id
           FROM completions c
           JOIN days d ON d.day_id = c.day_id
           WHERE d.date = ?1
           ORDER BY c.habit_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![date_str], |row| {
            Ok(RawCompletion {
              completion_id: row.get(0)?,
              day_id:        row.get(1)?,
              habit_id:      row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawCompletion::into_entry).collect()
  }

  /// Run raw SQL against the connection, bypassing the store API.
  #[cfg(test)]
  pub(crate) async fn execute_raw(&self, sql: &'static str) -> Result<()> {
    self
      .conn
      .call(move |conn| {
        conn.execute_batch(sql)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Row helpers (run on the connection thread) ──────────────────────────────

/// Insert a `days` row for `date` unless one exists, then read back whichever
/// row holds that date. Returns the row and whether this call created it.
fn insert_or_fetch_day(
  conn: &rusqlite::Connection,
  candidate_id: &str,
  date: &str,
) -> rusqlite::Result<(RawDay, bool)> {
  let inserted = conn.execute(
    "INSERT INTO days (day_id, date) VALUES (?1, ?2)
     ON CONFLICT (date) DO NOTHING",
    rusqlite::params![candidate_id, date],
  )?;

  let day = conn.query_row(
    "SELECT day_id, date FROM days WHERE date = ?1",
    rusqlite::params![date],
    |row| {
      Ok(RawDay {
        day_id: row.get(0)?,
        date:   row.get(1)?,
      })
    },
  )?;

  Ok((day, inserted == 1))
}

fn habit_exists(conn: &rusqlite::Connection, habit_id: &str) -> rusqlite::Result<bool> {
  Ok(
    conn
      .query_row(
        "SELECT 1 FROM habits WHERE habit_id = ?1",
        rusqlite::params![habit_id],
        |_| Ok(()),
      )
      .optional()?
      .is_some(),
  )
}

// ─── HabitStore impl ─────────────────────────────────────────────────────────

impl HabitStore for SqliteStore {
  type Error = crate::Error;

  // ── Habit registry ────────────────────────────────────────────────────────

  async fn insert_habit(&self, habit: Habit) -> Result<Habit> {
    let id_str   = encode_uuid(habit.habit_id);
    let title    = habit.title.clone();
    let at_str   = encode_date(habit.created_at);
    let weekdays: Vec<u8> = habit.weekdays.iter().map(|w| w.index()).collect();

    self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
          "INSERT INTO habits (habit_id, title, created_at) VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, title, at_str],
        )?;
        {
          let mut stmt = tx.prepare(
            "INSERT INTO habit_weekdays (habit_id, weekday) VALUES (?1, ?2)",
          )?;
          for w in weekdays {
            stmt.execute(rusqlite::params![id_str, w])?;
          }
        }
        tx.commit()?;
        Ok(())
      })
      .await?;

    Ok(habit)
  }

  async fn get_habit(&self, id: Uuid) -> Result<Option<Habit>> {
    let id_str = encode_uuid(id);

    let raw: Option<RawHabit> = self
      .conn
      .call(move |conn| {
        let row = conn
          .query_row(
            "SELECT habit_id, title, created_at FROM habits WHERE habit_id = ?1",
            rusqlite::params![id_str],
            |row| {
              Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
              ))
            },
          )
          .optional()?;

        let Some((habit_id, title, created_at)) = row else {
          return Ok(None);
        };

        let mut stmt = conn.prepare(
          "SELECT weekday FROM habit_weekdays WHERE habit_id = ?1 ORDER BY weekday",
        )?;
        let weekdays = stmt
          .query_map(rusqlite::params![id_str], |r| r.get(0))?
          .collect::<rusqlite::Result<Vec<i64>>>()?;

        Ok(Some(RawHabit { habit_id, title, created_at, weekdays }))
      })
      .await?;

    raw.map(RawHabit::into_habit).transpose()
  }

  async fn list_habits(&self) -> Result<Vec<Habit>> {
    let raws: Vec<RawHabit> = self
      .conn
      .call(|conn| {
        let mut weekdays: HashMap<String, Vec<i64>> = HashMap::new();
        {
          let mut stmt = conn.prepare(
            "SELECT habit_id, weekday FROM habit_weekdays ORDER BY habit_id, weekday",
          )?;
          let rows = stmt.query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, i64>(1)?)))?;
          for row in rows {
            let (habit_id, w) = row?;
            weekdays.entry(habit_id).or_default().push(w);
          }
        }

        let mut stmt = conn.prepare(
          "SELECT habit_id, title, created_at FROM habits
           ORDER BY created_at ASC, title ASC, habit_id ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawHabit {
              habit_id:   row.get(0)?,
              title:      row.get(1)?,
              created_at: row.get(2)?,
              weekdays:   Vec::new(),
            })
          })?
          .map(|r| {
            r.map(|mut raw| {
              raw.weekdays = weekdays.remove(&raw.habit_id).unwrap_or_default();
              raw
            })
          })
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHabit::into_habit).collect()
  }

  // ── Day ledger ────────────────────────────────────────────────────────────

  async fn find_day(&self, date: NaiveDate) -> Result<Option<Day>> {
    let date_str = encode_date(date);

    let raw: Option<RawDay> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT day_id, date FROM days WHERE date = ?1",
              rusqlite::params![date_str],
              |row| {
                Ok(RawDay {
                  day_id: row.get(0)?,
                  date:   row.get(1)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawDay::into_day).transpose()
  }

  async fn get_or_create_day(&self, date: NaiveDate) -> Result<Day> {
    let date_str     = encode_date(date);
    let candidate_id = encode_uuid(Uuid::new_v4());

    let (raw, created) = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let out = insert_or_fetch_day(&tx, &candidate_id, &date_str)?;
        tx.commit()?;
        Ok(out)
      })
      .await?;

    if created {
      debug!(%date, day_id = %raw.day_id, "created ledger day");
    }
    raw.into_day()
  }

  async fn completed_habits(&self, date: NaiveDate) -> Result<BTreeSet<Uuid>> {
    let entries = self.completion_entries(date).await?;
    Ok(entries.into_iter().map(|e| e.habit_id).collect())
  }

  async fn toggle_completion(
    &self,
    date: NaiveDate,
    habit_id: Uuid,
  ) -> Result<Option<CompletionState>> {
    let date_str      = encode_date(date);
    let habit_str     = encode_uuid(habit_id);
    let candidate_day = encode_uuid(Uuid::new_v4());
    let completion_id = encode_uuid(Uuid::new_v4());

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        // Unknown habit: dropping `tx` rolls back, nothing was written.
        if !habit_exists(&tx, &habit_str)? {
          return Ok(None);
        }

        let (day, day_created) = insert_or_fetch_day(&tx, &candidate_day, &date_str)?;

        let removed = tx.execute(
          "DELETE FROM completions WHERE day_id = ?1 AND habit_id = ?2",
          rusqlite::params![day.day_id, habit_str],
        )?;
        if removed == 0 {
          tx.execute(
            "INSERT INTO completions (completion_id, day_id, habit_id)
             VALUES (?1, ?2, ?3)",
            rusqlite::params![completion_id, day.day_id, habit_str],
          )?;
        }

        tx.commit()?;
        Ok(Some((day_created, removed == 0)))
      })
      .await?;

    Ok(outcome.map(|(day_created, completed)| {
      if day_created {
        debug!(%date, "created ledger day");
      }
      CompletionState { completed }
    }))
  }

  async fn day_tallies(&self) -> Result<Vec<DayTally>> {
    let raws: Vec<RawDayTally> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(
          "SELECT
             d.day_id,
             d.date,
             (SELECT count(*) FROM completions c WHERE c.day_id = d.day_id)
           FROM days d
           ORDER BY d.date ASC",
        )?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawDayTally {
              day:       RawDay {
                day_id: row.get(0)?,
                date:   row.get(1)?,
              },
              completed: row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawDayTally::into_tally).collect()
  }
}
