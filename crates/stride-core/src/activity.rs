//! Activity events and per-day facts — the authoritative inputs the rest of
//! the engine derives from.
//!
//! Mood logs, journal entries, and micro-sessions are immutable events with
//! an arbitrary timestamp. Habit completions and daily metrics inherently
//! have one row per calendar day and use upsert semantics instead.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Activity kinds ──────────────────────────────────────────────────────────

/// A category of user action that contributes to a streak.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
  MoodLog,
  JournalEntry,
  HabitCompletion,
  MicroSession,
}

impl ActivityKind {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::MoodLog => "mood_log",
      Self::JournalEntry => "journal_entry",
      Self::HabitCompletion => "habit_completion",
      Self::MicroSession => "micro_session",
    }
  }

  pub fn from_discriminant(s: &str) -> Result<Self> {
    match s {
      "mood_log" => Ok(Self::MoodLog),
      "journal_entry" => Ok(Self::JournalEntry),
      "habit_completion" => Ok(Self::HabitCompletion),
      "micro_session" => Ok(Self::MicroSession),
      other => Err(Error::UnknownActivityKind(other.to_owned())),
    }
  }
}

// ─── Events ──────────────────────────────────────────────────────────────────

/// An immutable fact: one user action at one point in time. Never mutated,
/// never deleted except under full account erasure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityEvent {
  pub event_id:    Uuid,
  pub user_id:     Uuid,
  pub kind:        ActivityKind,
  pub occurred_at: DateTime<Utc>,
  pub payload:     serde_json::Value,
}

/// Input to [`crate::store::ProgressStore::record_event`].
#[derive(Debug, Clone)]
pub struct NewActivityEvent {
  pub user_id:     Uuid,
  pub kind:        ActivityKind,
  pub occurred_at: DateTime<Utc>,
  pub payload:     serde_json::Value,
}

impl NewActivityEvent {
  pub fn new(
    user_id: Uuid,
    kind: ActivityKind,
    occurred_at: DateTime<Utc>,
  ) -> Self {
    Self {
      user_id,
      kind,
      occurred_at,
      payload: serde_json::Value::Null,
    }
  }
}

// ─── Per-day facts ───────────────────────────────────────────────────────────

/// Whether a habit was completed on a given day. One row per
/// `(user, habit, day)`; toggling off keeps the row with `completed = false`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HabitCompletion {
  pub user_id:   Uuid,
  pub habit_id:  Uuid,
  pub day:       NaiveDate,
  pub completed: bool,
}

/// A user's self-reported metrics for one day. Every field is optional;
/// the weekly scorecard averages only what was actually logged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyMetrics {
  pub user_id:       Uuid,
  pub day:           NaiveDate,
  pub mood:          Option<i32>,
  pub energy:        Option<i32>,
  pub stress:        Option<i32>,
  pub sleep_hours:   Option<f64>,
  pub sleep_quality: Option<i32>,
}

/// The metric values of a daily submission, before the engine has resolved
/// which calendar day they belong to.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct MetricValues {
  pub mood:          Option<i32>,
  pub energy:        Option<i32>,
  pub stress:        Option<i32>,
  pub sleep_hours:   Option<f64>,
  pub sleep_quality: Option<i32>,
}

impl MetricValues {
  /// Reject out-of-range values at the engine boundary; nothing is ever
  /// silently coerced. Scale fields are 1–10, sleep is 0–24 hours.
  pub fn validate(&self) -> Result<()> {
    fn check_scale(field: &'static str, value: Option<i32>) -> Result<()> {
      match value {
        Some(v) if !(1..=10).contains(&v) => {
          Err(Error::MetricOutOfRange { field, value: f64::from(v) })
        }
        _ => Ok(()),
      }
    }

    check_scale("mood", self.mood)?;
    check_scale("energy", self.energy)?;
    check_scale("stress", self.stress)?;
    check_scale("sleep_quality", self.sleep_quality)?;

    if let Some(hours) = self.sleep_hours
      && !(0.0..=24.0).contains(&hours)
    {
      return Err(Error::MetricOutOfRange {
        field: "sleep_hours",
        value: hours,
      });
    }
    Ok(())
  }
}

/// Aggregate totals used by the achievement rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActivityCounts {
  pub mood_checkins:    u32,
  pub journal_entries:  u32,
  pub habits_completed: u32,
}
