//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings, calendar days as
//! `YYYY-MM-DD`, UUIDs as hyphenated lowercase strings, and enums as their
//! snake_case discriminants. Event payloads are stored as compact JSON.

use chrono::{DateTime, NaiveDate, Utc};
use stride_core::{
  achievement::{Achievement, AchievementAward},
  activity::DailyMetrics,
  challenge::{
    Challenge, ChallengeCheckin, ChallengeParticipant, ParticipantStatus,
  },
  scorecard::WeeklyScorecard,
  xp::{GamificationProfile, XpSource, XpTransaction},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::Decode(format!("bad timestamp {s:?}: {e}")))
}

// ─── NaiveDate ───────────────────────────────────────────────────────────────

pub fn encode_day(day: NaiveDate) -> String {
  day.format("%Y-%m-%d").to_string()
}

pub fn decode_day(s: &str) -> Result<NaiveDate> {
  NaiveDate::parse_from_str(s, "%Y-%m-%d")
    .map_err(|e| Error::Decode(format!("bad day {s:?}: {e}")))
}

// ─── Enums ───────────────────────────────────────────────────────────────────

pub fn decode_source(s: &str) -> Result<XpSource> {
  Ok(XpSource::from_discriminant(s)?)
}

pub fn decode_achievement(s: &str) -> Result<Achievement> {
  Ok(Achievement::from_id(s)?)
}

pub fn decode_status(s: &str) -> Result<ParticipantStatus> {
  ParticipantStatus::from_discriminant(s)
    .ok_or_else(|| Error::Decode(format!("unknown participant status: {s:?}")))
}

fn decode_count(n: i64, column: &'static str) -> Result<u32> {
  u32::try_from(n)
    .map_err(|_| Error::Decode(format!("negative {column}: {n}")))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw columns read directly from a `profiles` row.
pub struct RawProfile {
  pub user_id:          String,
  pub total_xp:         i64,
  pub current_level:    i64,
  pub xp_to_next_level: i64,
  pub updated_at:       String,
}

impl RawProfile {
  pub fn into_profile(self) -> Result<GamificationProfile> {
    Ok(GamificationProfile {
      user_id:          decode_uuid(&self.user_id)?,
      total_xp:         self.total_xp,
      current_level:    decode_count(self.current_level, "level")?,
      xp_to_next_level: self.xp_to_next_level,
      updated_at:       decode_dt(&self.updated_at)?,
    })
  }
}

/// Raw columns read directly from an `xp_transactions` row.
pub struct RawTransaction {
  pub tx_id:       String,
  pub user_id:     String,
  pub amount:      i64,
  pub source:      String,
  pub source_id:   Option<String>,
  pub description: Option<String>,
  pub created_at:  String,
}

impl RawTransaction {
  pub fn into_transaction(self) -> Result<XpTransaction> {
    Ok(XpTransaction {
      tx_id:       decode_uuid(&self.tx_id)?,
      user_id:     decode_uuid(&self.user_id)?,
      amount:      self.amount,
      source:      decode_source(&self.source)?,
      source_id:   self.source_id,
      description: self.description,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Raw columns read directly from an `achievement_awards` row.
pub struct RawAward {
  pub user_id:     String,
  pub achievement: String,
  pub earned_at:   String,
}

impl RawAward {
  pub fn into_award(self) -> Result<AchievementAward> {
    Ok(AchievementAward {
      user_id:     decode_uuid(&self.user_id)?,
      achievement: decode_achievement(&self.achievement)?,
      earned_at:   decode_dt(&self.earned_at)?,
    })
  }
}

/// Raw columns read directly from a `challenges` row.
pub struct RawChallenge {
  pub challenge_id: String,
  pub name:         String,
  pub created_at:   String,
}

impl RawChallenge {
  pub fn into_challenge(self) -> Result<Challenge> {
    Ok(Challenge {
      challenge_id: decode_uuid(&self.challenge_id)?,
      name:         self.name,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

/// Raw columns read directly from a `challenge_participants` row.
pub struct RawParticipant {
  pub participant_id:    String,
  pub challenge_id:      String,
  pub user_id:           String,
  pub joined_at:         String,
  pub current_streak:    i64,
  pub best_streak:       i64,
  pub total_completions: i64,
  pub status:            String,
}

impl RawParticipant {
  pub fn into_participant(self) -> Result<ChallengeParticipant> {
    Ok(ChallengeParticipant {
      participant_id:    decode_uuid(&self.participant_id)?,
      challenge_id:      decode_uuid(&self.challenge_id)?,
      user_id:           decode_uuid(&self.user_id)?,
      joined_at:         decode_dt(&self.joined_at)?,
      current_streak:    decode_count(self.current_streak, "current_streak")?,
      best_streak:       decode_count(self.best_streak, "best_streak")?,
      total_completions: decode_count(
        self.total_completions,
        "total_completions",
      )?,
      status:            decode_status(&self.status)?,
    })
  }
}

/// Raw columns read directly from a `challenge_checkins` row.
pub struct RawCheckin {
  pub participant_id: String,
  pub day:            String,
  pub completed:      bool,
  pub notes:          Option<String>,
}

impl RawCheckin {
  pub fn into_checkin(self) -> Result<ChallengeCheckin> {
    Ok(ChallengeCheckin {
      participant_id: decode_uuid(&self.participant_id)?,
      day:            decode_day(&self.day)?,
      completed:      self.completed,
      notes:          self.notes,
    })
  }
}

/// Raw columns read directly from a `daily_metrics` row.
pub struct RawMetrics {
  pub user_id:       String,
  pub day:           String,
  pub mood:          Option<i32>,
  pub energy:        Option<i32>,
  pub stress:        Option<i32>,
  pub sleep_hours:   Option<f64>,
  pub sleep_quality: Option<i32>,
}

impl RawMetrics {
  pub fn into_metrics(self) -> Result<DailyMetrics> {
    Ok(DailyMetrics {
      user_id:       decode_uuid(&self.user_id)?,
      day:           decode_day(&self.day)?,
      mood:          self.mood,
      energy:        self.energy,
      stress:        self.stress,
      sleep_hours:   self.sleep_hours,
      sleep_quality: self.sleep_quality,
    })
  }
}

/// Raw columns read directly from a `weekly_scorecards` row.
pub struct RawScorecard {
  pub user_id:                String,
  pub week_start:             String,
  pub avg_mood:               Option<f64>,
  pub avg_energy:             Option<f64>,
  pub avg_stress:             Option<f64>,
  pub avg_sleep_hours:        Option<f64>,
  pub avg_sleep_quality:      Option<f64>,
  pub total_habits_completed: i64,
}

impl RawScorecard {
  pub fn into_scorecard(self) -> Result<WeeklyScorecard> {
    Ok(WeeklyScorecard {
      user_id:                decode_uuid(&self.user_id)?,
      week_start:             decode_day(&self.week_start)?,
      avg_mood:               self.avg_mood,
      avg_energy:             self.avg_energy,
      avg_stress:             self.avg_stress,
      avg_sleep_hours:        self.avg_sleep_hours,
      avg_sleep_quality:      self.avg_sleep_quality,
      total_habits_completed: decode_count(
        self.total_habits_completed,
        "total_habits_completed",
      )?,
    })
  }
}
