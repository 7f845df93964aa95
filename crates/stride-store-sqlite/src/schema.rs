//! SQL schema for the Stride SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;
PRAGMA busy_timeout = 5000;

-- Events are strictly append-only.
-- No UPDATE or DELETE is ever issued against this table.
CREATE TABLE IF NOT EXISTS activity_events (
    event_id    TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    kind        TEXT NOT NULL,   -- 'mood_log' | 'journal_entry' | 'micro_session'
    occurred_at TEXT NOT NULL,   -- ISO 8601 UTC
    payload     TEXT NOT NULL DEFAULT 'null'
);

-- One row per (user, habit, day); toggling off keeps the row.
CREATE TABLE IF NOT EXISTS habit_completions (
    user_id   TEXT NOT NULL,
    habit_id  TEXT NOT NULL,
    day       TEXT NOT NULL,     -- YYYY-MM-DD
    completed INTEGER NOT NULL,
    PRIMARY KEY (user_id, habit_id, day)
);

CREATE TABLE IF NOT EXISTS daily_metrics (
    user_id       TEXT NOT NULL,
    day           TEXT NOT NULL,
    mood          INTEGER,
    energy        INTEGER,
    stress        INTEGER,
    sleep_hours   REAL,
    sleep_quality INTEGER,
    PRIMARY KEY (user_id, day)
);

-- total_xp is only ever moved by relative increments; the level columns
-- are a cache of level_for(total_xp).
CREATE TABLE IF NOT EXISTS profiles (
    user_id          TEXT PRIMARY KEY,
    total_xp         INTEGER NOT NULL DEFAULT 0,
    current_level    INTEGER NOT NULL DEFAULT 1,
    xp_to_next_level INTEGER NOT NULL DEFAULT 100,
    updated_at       TEXT NOT NULL
);

-- The ledger is strictly append-only.
CREATE TABLE IF NOT EXISTS xp_transactions (
    tx_id       TEXT PRIMARY KEY,
    user_id     TEXT NOT NULL,
    amount      INTEGER NOT NULL CHECK (amount > 0),
    source      TEXT NOT NULL,
    source_id   TEXT,
    description TEXT,
    created_at  TEXT NOT NULL
);

-- Append-only 'has earned' facts; the PK is the idempotence guard.
CREATE TABLE IF NOT EXISTS achievement_awards (
    user_id     TEXT NOT NULL,
    achievement TEXT NOT NULL,
    earned_at   TEXT NOT NULL,
    PRIMARY KEY (user_id, achievement)
);

CREATE TABLE IF NOT EXISTS challenges (
    challenge_id TEXT PRIMARY KEY,
    name         TEXT NOT NULL,
    created_at   TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS challenge_participants (
    participant_id    TEXT PRIMARY KEY,
    challenge_id      TEXT NOT NULL REFERENCES challenges(challenge_id),
    user_id           TEXT NOT NULL,
    joined_at         TEXT NOT NULL,
    current_streak    INTEGER NOT NULL DEFAULT 0,
    best_streak       INTEGER NOT NULL DEFAULT 0,
    total_completions INTEGER NOT NULL DEFAULT 0,
    status            TEXT NOT NULL DEFAULT 'active',
    UNIQUE (challenge_id, user_id)
);

CREATE TABLE IF NOT EXISTS challenge_checkins (
    participant_id TEXT NOT NULL REFERENCES challenge_participants(participant_id),
    day            TEXT NOT NULL,
    completed      INTEGER NOT NULL,
    notes          TEXT,
    PRIMARY KEY (participant_id, day)
);

-- Recomputable projection; overwritten on every aggregation.
CREATE TABLE IF NOT EXISTS weekly_scorecards (
    user_id                TEXT NOT NULL,
    week_start             TEXT NOT NULL,   -- always a Monday
    avg_mood               REAL,
    avg_energy             REAL,
    avg_stress             REAL,
    avg_sleep_hours        REAL,
    avg_sleep_quality      REAL,
    total_habits_completed INTEGER NOT NULL DEFAULT 0,
    PRIMARY KEY (user_id, week_start)
);

-- Durable once-per-day marks, keyed by (scope, day); purged by TTL.
CREATE TABLE IF NOT EXISTS day_marks (
    scope       TEXT NOT NULL,
    day         TEXT NOT NULL,
    recorded_at TEXT NOT NULL,
    PRIMARY KEY (scope, day)
);

CREATE INDEX IF NOT EXISTS events_user_kind_idx
    ON activity_events(user_id, kind);
CREATE INDEX IF NOT EXISTS xp_user_idx
    ON xp_transactions(user_id);
CREATE INDEX IF NOT EXISTS xp_source_idx
    ON xp_transactions(user_id, source, source_id);
CREATE INDEX IF NOT EXISTS participants_challenge_idx
    ON challenge_participants(challenge_id);
CREATE INDEX IF NOT EXISTS metrics_user_idx
    ON daily_metrics(user_id, day);

PRAGMA user_version = 1;
";
