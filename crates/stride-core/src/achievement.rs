//! Achievement rules and awards.
//!
//! The rule set is a closed enum rather than a runtime-extensible map, so
//! adding a rule is a compile-time-checked change. Awards are append-only
//! "has earned" facts, unique per `(user, achievement)`; idempotence comes
//! from that uniqueness invariant, not from evaluator-side memory.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Summary ─────────────────────────────────────────────────────────────────

/// The aggregate counters the rules are evaluated against.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct ActivitySummary {
  pub total_mood_checkins:    u32,
  pub total_journal_entries:  u32,
  pub total_habits_completed: u32,
  pub current_habit_streak:   u32,
}

// ─── Rules ───────────────────────────────────────────────────────────────────

/// Every achievement the engine can award. Thresholds are part of the
/// contract; they are asserted in the tests below.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Achievement {
  FirstMoodLog,
  FirstJournalEntry,
  FirstHabitCompletion,
  HabitStreak3,
  HabitStreak7,
  MoodCheckins10,
  JournalEntries5,
  HabitsCompleted20,
}

impl Achievement {
  pub const ALL: [Achievement; 8] = [
    Self::FirstMoodLog,
    Self::FirstJournalEntry,
    Self::FirstHabitCompletion,
    Self::HabitStreak3,
    Self::HabitStreak7,
    Self::MoodCheckins10,
    Self::JournalEntries5,
    Self::HabitsCompleted20,
  ];

  /// The identifier stored in the `achievement` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn id(&self) -> &'static str {
    match self {
      Self::FirstMoodLog => "first_mood_log",
      Self::FirstJournalEntry => "first_journal_entry",
      Self::FirstHabitCompletion => "first_habit_completion",
      Self::HabitStreak3 => "habit_streak_3",
      Self::HabitStreak7 => "habit_streak_7",
      Self::MoodCheckins10 => "mood_checkins_10",
      Self::JournalEntries5 => "journal_entries_5",
      Self::HabitsCompleted20 => "habits_completed_20",
    }
  }

  pub fn from_id(s: &str) -> Result<Self> {
    match s {
      "first_mood_log" => Ok(Self::FirstMoodLog),
      "first_journal_entry" => Ok(Self::FirstJournalEntry),
      "first_habit_completion" => Ok(Self::FirstHabitCompletion),
      "habit_streak_3" => Ok(Self::HabitStreak3),
      "habit_streak_7" => Ok(Self::HabitStreak7),
      "mood_checkins_10" => Ok(Self::MoodCheckins10),
      "journal_entries_5" => Ok(Self::JournalEntries5),
      "habits_completed_20" => Ok(Self::HabitsCompleted20),
      other => Err(Error::UnknownAchievement(other.to_owned())),
    }
  }

  /// Display name shown by the presentation layer.
  pub fn title(&self) -> &'static str {
    match self {
      Self::FirstMoodLog => "First Check-In",
      Self::FirstJournalEntry => "Dear Diary",
      Self::FirstHabitCompletion => "Off the Mark",
      Self::HabitStreak3 => "Three in a Row",
      Self::HabitStreak7 => "A Full Week",
      Self::MoodCheckins10 => "Regular Reflector",
      Self::JournalEntries5 => "Finding the Words",
      Self::HabitsCompleted20 => "Habit Builder",
    }
  }

  /// Whether `summary` satisfies this rule. Pure; safe to re-evaluate
  /// after every activity event.
  pub fn earned(&self, summary: &ActivitySummary) -> bool {
    match self {
      Self::FirstMoodLog => summary.total_mood_checkins >= 1,
      Self::FirstJournalEntry => summary.total_journal_entries >= 1,
      Self::FirstHabitCompletion => summary.total_habits_completed >= 1,
      Self::HabitStreak3 => summary.current_habit_streak >= 3,
      Self::HabitStreak7 => summary.current_habit_streak >= 7,
      Self::MoodCheckins10 => summary.total_mood_checkins >= 10,
      Self::JournalEntries5 => summary.total_journal_entries >= 5,
      Self::HabitsCompleted20 => summary.total_habits_completed >= 20,
    }
  }
}

// ─── Awards ──────────────────────────────────────────────────────────────────

/// A "has earned" fact. Created once, never updated or removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AchievementAward {
  pub user_id:     Uuid,
  pub achievement: Achievement,
  pub earned_at:   DateTime<Utc>,
}
