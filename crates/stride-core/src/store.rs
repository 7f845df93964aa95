//! The `ProgressStore` trait — the engine's storage boundary.
//!
//! The trait is implemented by storage backends (e.g. `stride-store-sqlite`).
//! Higher layers (`stride-api`, the [`Engine`](crate::engine::Engine))
//! depend on this abstraction, not on any concrete backend.
//!
//! Authoritative facts (events, habit completions, metrics, the XP ledger,
//! awards, check-ins) live behind the write methods; everything else in the
//! engine is a recomputable projection over the read methods.
//!
//! All methods return `Send` futures so the trait can be used in
//! multi-threaded async runtimes (e.g. tokio with `axum`).

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  achievement::{Achievement, AchievementAward},
  activity::{
    ActivityCounts, ActivityEvent, ActivityKind, DailyMetrics, HabitCompletion,
    NewActivityEvent,
  },
  challenge::{
    Challenge, ChallengeCheckin, ChallengeParticipant,
  },
  scorecard::WeeklyScorecard,
  xp::{GamificationProfile, NewXpAward, XpTransaction},
};

pub trait ProgressStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Activity events ───────────────────────────────────────────────────

  /// Persist a new immutable activity event.
  fn record_event(
    &self,
    input: NewActivityEvent,
  ) -> impl Future<Output = Result<ActivityEvent, Self::Error>> + Send + '_;

  /// All raw event timestamps for `(user, kind)`. Day normalization is the
  /// engine's job, so the policy decision stays in one place.
  fn activity_timestamps(
    &self,
    user_id: Uuid,
    kind: ActivityKind,
  ) -> impl Future<Output = Result<Vec<DateTime<Utc>>, Self::Error>> + Send + '_;

  /// Aggregate totals for the achievement rules.
  fn activity_counts(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<ActivityCounts, Self::Error>> + Send + '_;

  // ── Habits ────────────────────────────────────────────────────────────

  /// Upsert the completion flag for `(user, habit, day)`.
  fn set_habit_completion(
    &self,
    user_id: Uuid,
    habit_id: Uuid,
    day: NaiveDate,
    completed: bool,
  ) -> impl Future<Output = Result<HabitCompletion, Self::Error>> + Send + '_;

  /// Distinct days on which the user completed at least one habit.
  fn habit_days(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<NaiveDate>, Self::Error>> + Send + '_;

  /// Habit completions inside `[week_start, week_start + 6]`.
  fn habits_completed_in_week(
    &self,
    user_id: Uuid,
    week_start: NaiveDate,
  ) -> impl Future<Output = Result<u32, Self::Error>> + Send + '_;

  // ── Daily metrics ─────────────────────────────────────────────────────

  /// Upsert the metric row for `(user, day)`.
  fn upsert_daily_metrics(
    &self,
    metrics: DailyMetrics,
  ) -> impl Future<Output = Result<DailyMetrics, Self::Error>> + Send + '_;

  /// Metric rows with `day` inside `[week_start, week_start + 6]`.
  fn metrics_in_week(
    &self,
    user_id: Uuid,
    week_start: NaiveDate,
  ) -> impl Future<Output = Result<Vec<DailyMetrics>, Self::Error>> + Send + '_;

  // ── XP ledger ─────────────────────────────────────────────────────────

  /// Atomically add `input.amount` to the profile total (creating the
  /// profile if absent), recompute the level fields from the
  /// post-increment total, and append the ledger row — all inside one
  /// storage transaction. Two concurrent awards must both land.
  ///
  /// The store does not enforce per-event idempotence; callers guard with
  /// [`ProgressStore::has_awarded_xp`] first.
  fn apply_xp(
    &self,
    input: NewXpAward,
  ) -> impl Future<
    Output = Result<(XpTransaction, GamificationProfile), Self::Error>,
  > + Send
  + '_;

  /// Whether a ledger row for `(user, source, source_id)` already exists.
  fn has_awarded_xp<'a>(
    &'a self,
    user_id: Uuid,
    source: crate::xp::XpSource,
    source_id: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Retrieve a profile. Returns `None` if the user has never earned XP.
  fn get_profile(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Option<GamificationProfile>, Self::Error>>
  + Send
  + '_;

  /// The full ledger for a user, oldest first.
  fn xp_transactions(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<XpTransaction>, Self::Error>> + Send + '_;

  // ── Achievements ──────────────────────────────────────────────────────

  /// Insert an award if absent. Returns `true` iff this call created the
  /// row — the uniqueness invariant that makes concurrent evaluation safe.
  fn insert_award(
    &self,
    user_id: Uuid,
    achievement: Achievement,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn list_awards(
    &self,
    user_id: Uuid,
  ) -> impl Future<Output = Result<Vec<AchievementAward>, Self::Error>>
  + Send
  + '_;

  // ── Weekly scorecards ─────────────────────────────────────────────────

  /// Overwrite the scorecard for `(user, week_start)`.
  fn upsert_scorecard(
    &self,
    scorecard: WeeklyScorecard,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;

  fn get_scorecard(
    &self,
    user_id: Uuid,
    week_start: NaiveDate,
  ) -> impl Future<Output = Result<Option<WeeklyScorecard>, Self::Error>>
  + Send
  + '_;

  // ── Challenges ────────────────────────────────────────────────────────

  fn create_challenge(
    &self,
    name: String,
  ) -> impl Future<Output = Result<Challenge, Self::Error>> + Send + '_;

  fn get_challenge(
    &self,
    challenge_id: Uuid,
  ) -> impl Future<Output = Result<Option<Challenge>, Self::Error>> + Send + '_;

  /// Add a user to a challenge. Idempotent: re-joining returns the
  /// existing participant row.
  fn join_challenge(
    &self,
    challenge_id: Uuid,
    user_id: Uuid,
  ) -> impl Future<Output = Result<ChallengeParticipant, Self::Error>>
  + Send
  + '_;

  fn get_participant(
    &self,
    participant_id: Uuid,
  ) -> impl Future<Output = Result<Option<ChallengeParticipant>, Self::Error>>
  + Send
  + '_;

  fn list_participants(
    &self,
    challenge_id: Uuid,
  ) -> impl Future<Output = Result<Vec<ChallengeParticipant>, Self::Error>>
  + Send
  + '_;

  /// Upsert the check-in for `(participant, day)` and apply the counter
  /// transition inside one storage transaction, serialized per participant.
  ///
  /// Counters move only when a day flips to completed for the first time;
  /// re-submitting an already-completed day and submitting
  /// `completed = false` on a fresh day both leave them untouched.
  fn upsert_checkin(
    &self,
    participant_id: Uuid,
    day: NaiveDate,
    completed: bool,
    notes: Option<String>,
  ) -> impl Future<
    Output = Result<(ChallengeCheckin, ChallengeParticipant), Self::Error>,
  > + Send
  + '_;

  // ── Day marks ─────────────────────────────────────────────────────────

  /// Record that `scope` has fired for `day`. Returns `true` only on the
  /// first call per `(scope, day)` — the durable replacement for a
  /// process-lifetime "already done today" set.
  fn mark_day<'a>(
    &'a self,
    scope: &'a str,
    day: NaiveDate,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;

  /// Delete marks older than `before`; returns how many were removed.
  fn purge_day_marks(
    &self,
    before: NaiveDate,
  ) -> impl Future<Output = Result<u64, Self::Error>> + Send + '_;
}
