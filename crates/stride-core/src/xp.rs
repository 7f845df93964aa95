//! The XP ledger and leveling curve.
//!
//! XP awards are append-only ledger rows; a user's profile caches the running
//! total plus the level fields derived from it. The profile is never an
//! independent source of truth — the sum of a user's transactions must equal
//! `total_xp` at all times.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Sources ─────────────────────────────────────────────────────────────────

/// What earned the XP. A closed set so that adding a source is a
/// compile-time-checked change.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum XpSource {
  /// A daily metrics submission.
  DailyCheckin,
  /// A newly earned achievement.
  Achievement,
}

impl XpSource {
  /// The discriminant string stored in the `source` column.
  /// Must match the `rename_all = "snake_case"` serde tags above.
  pub fn discriminant(&self) -> &'static str {
    match self {
      Self::DailyCheckin => "daily_checkin",
      Self::Achievement => "achievement",
    }
  }

  pub fn from_discriminant(s: &str) -> crate::Result<Self> {
    match s {
      "daily_checkin" => Ok(Self::DailyCheckin),
      "achievement" => Ok(Self::Achievement),
      other => Err(crate::Error::UnknownXpSource(other.to_owned())),
    }
  }
}

// ─── Ledger ──────────────────────────────────────────────────────────────────

/// An immutable ledger row. Once written, never updated or deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct XpTransaction {
  pub tx_id:       Uuid,
  pub user_id:     Uuid,
  pub amount:      i64,
  pub source:      XpSource,
  /// Key of the event that earned the XP; the idempotence handle for
  /// retried awards.
  pub source_id:   Option<String>,
  pub description: Option<String>,
  pub created_at:  DateTime<Utc>,
}

/// Input to [`crate::store::ProgressStore::apply_xp`].
/// `created_at` is always set by the store; it is not accepted from callers.
#[derive(Debug, Clone)]
pub struct NewXpAward {
  pub user_id:     Uuid,
  pub amount:      i64,
  pub source:      XpSource,
  pub source_id:   Option<String>,
  pub description: Option<String>,
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// One row per user. `current_level` and `xp_to_next_level` are always a
/// pure function of `total_xp` (see [`level_for`]); the profile is a cache
/// of that function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GamificationProfile {
  pub user_id:          Uuid,
  pub total_xp:         i64,
  pub current_level:    u32,
  pub xp_to_next_level: i64,
  pub updated_at:       DateTime<Utc>,
}

impl GamificationProfile {
  /// The profile a user has before earning any XP: level 1, 100 XP to go.
  pub fn fresh(user_id: Uuid) -> Self {
    let (current_level, xp_to_next_level) = level_for(0);
    Self {
      user_id,
      total_xp: 0,
      current_level,
      xp_to_next_level,
      updated_at: Utc::now(),
    }
  }
}

// ─── Leveling curve ──────────────────────────────────────────────────────────

/// XP cost of advancing out of `level`. Level N costs `100 * N`.
fn cost_of(level: u32) -> i64 { 100 * i64::from(level) }

/// Map a total XP amount to `(level, xp_to_next_level)`.
///
/// Starting at level 1 with 0 XP, thresholds accumulate 100, 200, 300, ...
/// `xp_to_next_level` is the remainder needed to cross into the next level.
/// Pure, stateless, and independent of transaction order.
pub fn level_for(total_xp: i64) -> (u32, i64) {
  let total_xp = total_xp.max(0);
  let mut level = 1u32;
  // Cumulative XP required to have reached `level`.
  let mut threshold = 0i64;
  while threshold + cost_of(level) <= total_xp {
    threshold += cost_of(level);
    level += 1;
  }
  (level, threshold + cost_of(level) - total_xp)
}
