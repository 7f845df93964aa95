//! Challenges, participants, check-ins, and leaderboard ranking.
//!
//! Unlike streaks, participant counters are mutated incrementally on each
//! check-in rather than recomputed from scratch: check-ins are sparse,
//! explicitly dated, and have no cheap full-history scan path. The counter
//! transition is therefore guarded by the store's per-participant
//! serialization (see `ProgressStore::upsert_checkin`).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Entities ────────────────────────────────────────────────────────────────

/// A group challenge that users join and check into day by day.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Challenge {
  pub challenge_id: Uuid,
  pub name:         String,
  pub created_at:   DateTime<Utc>,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ParticipantStatus {
  Active,
  Completed,
  Withdrawn,
}

impl ParticipantStatus {
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::Active => "active",
      Self::Completed => "completed",
      Self::Withdrawn => "withdrawn",
    }
  }

  pub fn from_discriminant(s: &str) -> Option<Self> {
    match s {
      "active" => Some(Self::Active),
      "completed" => Some(Self::Completed),
      "withdrawn" => Some(Self::Withdrawn),
      _ => None,
    }
  }
}

/// One user's membership in one challenge, with incrementally maintained
/// counters. Unique per `(challenge, user)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeParticipant {
  pub participant_id:    Uuid,
  pub challenge_id:      Uuid,
  pub user_id:           Uuid,
  pub joined_at:         DateTime<Utc>,
  pub current_streak:    u32,
  pub best_streak:       u32,
  pub total_completions: u32,
  pub status:            ParticipantStatus,
}

/// One participant's check-in for one day; upsert-by-`(participant, day)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChallengeCheckin {
  pub participant_id: Uuid,
  pub day:            NaiveDate,
  pub completed:      bool,
  pub notes:          Option<String>,
}

// ─── Leaderboard ─────────────────────────────────────────────────────────────

/// A ranked leaderboard row. `rank` starts at 1.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LeaderboardEntry {
  pub rank:        u32,
  pub participant: ChallengeParticipant,
}

/// Rank participants by completion count, descending.
///
/// Ties break toward the earlier `joined_at`, then toward the smaller
/// participant id — the ordering is fully specified rather than left to
/// sort-stability accident.
pub fn rank(
  mut participants: Vec<ChallengeParticipant>,
) -> Vec<LeaderboardEntry> {
  participants.sort_by(|a, b| {
    b.total_completions
      .cmp(&a.total_completions)
      .then_with(|| a.joined_at.cmp(&b.joined_at))
      .then_with(|| a.participant_id.cmp(&b.participant_id))
  });

  participants
    .into_iter()
    .enumerate()
    .map(|(i, participant)| LeaderboardEntry {
      rank: i as u32 + 1,
      participant,
    })
    .collect()
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn participant(
    completions: u32,
    joined_at: DateTime<Utc>,
  ) -> ChallengeParticipant {
    ChallengeParticipant {
      participant_id: Uuid::new_v4(),
      challenge_id: Uuid::nil(),
      user_id: Uuid::new_v4(),
      joined_at,
      current_streak: 0,
      best_streak: 0,
      total_completions: completions,
      status: ParticipantStatus::Active,
    }
  }

  #[test]
  fn ranks_by_completions_descending() {
    let t0 = Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap();
    let ranked = rank(vec![
      participant(2, t0),
      participant(9, t0),
      participant(5, t0),
    ]);
    let totals: Vec<u32> = ranked
      .iter()
      .map(|e| e.participant.total_completions)
      .collect();
    assert_eq!(totals, [9, 5, 2]);
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[2].rank, 3);
  }

  #[test]
  fn ties_break_toward_earlier_join() {
    let t1 = Utc.with_ymd_and_hms(2026, 7, 1, 9, 0, 0).unwrap();
    let t2 = Utc.with_ymd_and_hms(2026, 7, 2, 9, 0, 0).unwrap();
    let early = participant(5, t1);
    let late = participant(5, t2);
    let early_id = early.participant_id;

    // Input order is reversed to prove the ordering is not accidental.
    let ranked = rank(vec![late, early]);
    assert_eq!(ranked[0].participant.participant_id, early_id);
    assert_eq!(ranked[0].rank, 1);
    assert_eq!(ranked[1].rank, 2);
  }
}
