//! SQL schema for the Habitat SQLite store.
//!
//! Executed once at connection startup. `PRAGMA user_version` records the
//! schema revision for future migrations.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

-- Habits are insert-only.
CREATE TABLE IF NOT EXISTS habits (
    habit_id    TEXT PRIMARY KEY,
    title       TEXT NOT NULL CHECK (length(title) > 0),
    created_at  TEXT NOT NULL          -- YYYY-MM-DD calendar day
);

CREATE TABLE IF NOT EXISTS habit_weekdays (
    habit_id TEXT    NOT NULL REFERENCES habits(habit_id),
    weekday  INTEGER NOT NULL CHECK (weekday BETWEEN 0 AND 6),  -- 0 = Sunday
    PRIMARY KEY (habit_id, weekday)
);

-- One ledger row per calendar day, created on first toggle.
CREATE TABLE IF NOT EXISTS days (
    day_id  TEXT PRIMARY KEY,
    date    TEXT NOT NULL UNIQUE       -- YYYY-MM-DD calendar day
);

-- Presence of a row means the habit was completed on that day.
CREATE TABLE IF NOT EXISTS completions (
    completion_id TEXT PRIMARY KEY,
    day_id        TEXT NOT NULL REFERENCES days(day_id),
    habit_id      TEXT NOT NULL REFERENCES habits(habit_id),
    UNIQUE (day_id, habit_id)
);

CREATE INDEX IF NOT EXISTS habits_created_idx     ON habits(created_at);
CREATE INDEX IF NOT EXISTS completions_habit_idx  ON completions(habit_id);

PRAGMA user_version = 1;
";
