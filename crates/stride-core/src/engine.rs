//! The engine — request-scoped orchestration over a [`ProgressStore`].
//!
//! Each inbound event upserts its authoritative fact, re-evaluates the
//! achievement rules against a fresh summary, and (for daily metrics)
//! appends to the XP ledger. Outbound queries are pure reads. No background
//! loop lives here; every operation runs to completion within the request
//! that triggered it.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::{
  Error, Result,
  achievement::{Achievement, AchievementAward, ActivitySummary},
  activity::{
    ActivityEvent, ActivityKind, DailyMetrics, HabitCompletion, MetricValues,
    NewActivityEvent,
  },
  calendar::{DayPolicy, week_start_for},
  challenge::{
    self, Challenge, ChallengeCheckin, ChallengeParticipant, LeaderboardEntry,
  },
  scorecard::{self, WeeklyScorecard},
  store::ProgressStore,
  streak::{self, StreakState},
  xp::{GamificationProfile, NewXpAward, XpSource, XpTransaction},
};

/// XP granted for submitting the daily metrics check-in, unless overridden
/// with [`Engine::with_daily_checkin_xp`].
pub const DEFAULT_DAILY_CHECKIN_XP: i64 = 50;

/// XP granted alongside each newly earned achievement.
const ACHIEVEMENT_XP: i64 = 25;

// ─── Engine ──────────────────────────────────────────────────────────────────

/// The progress & gamification engine over a storage backend `S`.
///
/// Holds the single global [`DayPolicy`]; call sites never pick their own
/// timezone handling.
pub struct Engine<S> {
  store:            S,
  policy:           DayPolicy,
  daily_checkin_xp: i64,
}

/// Everything a daily metrics submission produced.
#[derive(Debug, Clone)]
pub struct DailyCheckinOutcome {
  pub metrics:      DailyMetrics,
  /// `None` when the check-in XP for this day was already awarded.
  pub xp:           Option<XpTransaction>,
  pub profile:      GamificationProfile,
  pub newly_earned: Vec<Achievement>,
}

impl<S: ProgressStore> Engine<S> {
  pub fn new(store: S, policy: DayPolicy) -> Self {
    Self {
      store,
      policy,
      daily_checkin_xp: DEFAULT_DAILY_CHECKIN_XP,
    }
  }

  pub fn with_daily_checkin_xp(mut self, amount: i64) -> Self {
    self.daily_checkin_xp = amount;
    self
  }

  pub fn store(&self) -> &S { &self.store }

  pub fn policy(&self) -> DayPolicy { self.policy }

  // ── Inbound events ────────────────────────────────────────────────────

  /// Record a mood check-in and re-check achievements.
  pub async fn log_mood(
    &self,
    user_id: Uuid,
    occurred_at: DateTime<Utc>,
    payload: serde_json::Value,
  ) -> Result<(ActivityEvent, Vec<Achievement>)> {
    self
      .record_activity(user_id, ActivityKind::MoodLog, occurred_at, payload)
      .await
  }

  /// Record a journal entry and re-check achievements.
  pub async fn log_journal_entry(
    &self,
    user_id: Uuid,
    occurred_at: DateTime<Utc>,
    payload: serde_json::Value,
  ) -> Result<(ActivityEvent, Vec<Achievement>)> {
    self
      .record_activity(
        user_id,
        ActivityKind::JournalEntry,
        occurred_at,
        payload,
      )
      .await
  }

  /// Record a completed micro-session and re-check achievements.
  pub async fn complete_micro_session(
    &self,
    user_id: Uuid,
    occurred_at: DateTime<Utc>,
  ) -> Result<(ActivityEvent, Vec<Achievement>)> {
    self
      .record_activity(
        user_id,
        ActivityKind::MicroSession,
        occurred_at,
        serde_json::Value::Null,
      )
      .await
  }

  async fn record_activity(
    &self,
    user_id: Uuid,
    kind: ActivityKind,
    occurred_at: DateTime<Utc>,
    payload: serde_json::Value,
  ) -> Result<(ActivityEvent, Vec<Achievement>)> {
    let event = self
      .store
      .record_event(NewActivityEvent { user_id, kind, occurred_at, payload })
      .await
      .map_err(Error::store)?;
    let newly_earned = self.evaluate_achievements(user_id).await?;
    Ok((event, newly_earned))
  }

  /// Set or clear a habit completion for the day `occurred_at` falls on.
  pub async fn toggle_habit(
    &self,
    user_id: Uuid,
    habit_id: Uuid,
    occurred_at: DateTime<Utc>,
    completed: bool,
  ) -> Result<(HabitCompletion, Vec<Achievement>)> {
    let day = self.policy.day_of(occurred_at);
    let completion = self
      .store
      .set_habit_completion(user_id, habit_id, day, completed)
      .await
      .map_err(Error::store)?;
    let newly_earned = self.evaluate_achievements(user_id).await?;
    Ok((completion, newly_earned))
  }

  /// Upsert the day's metrics, award the check-in XP (at most once per
  /// `(user, day)`), and re-check achievements.
  pub async fn submit_daily_metrics(
    &self,
    user_id: Uuid,
    occurred_at: DateTime<Utc>,
    values: MetricValues,
  ) -> Result<DailyCheckinOutcome> {
    values.validate()?;

    let day = self.policy.day_of(occurred_at);
    let metrics = self
      .store
      .upsert_daily_metrics(DailyMetrics {
        user_id,
        day,
        mood: values.mood,
        energy: values.energy,
        stress: values.stress,
        sleep_hours: values.sleep_hours,
        sleep_quality: values.sleep_quality,
      })
      .await
      .map_err(Error::store)?;

    // Retried or edited submissions for the same day must not double-pay.
    let source_id = day.to_string();
    let already = self
      .store
      .has_awarded_xp(user_id, XpSource::DailyCheckin, &source_id)
      .await
      .map_err(Error::store)?;
    let xp = if already {
      None
    } else {
      let (tx, _) = self
        .store
        .apply_xp(NewXpAward {
          user_id,
          amount: self.daily_checkin_xp,
          source: XpSource::DailyCheckin,
          source_id: Some(source_id),
          description: Some("Daily check-in".to_owned()),
        })
        .await
        .map_err(Error::store)?;
      Some(tx)
    };

    let newly_earned = self.evaluate_achievements(user_id).await?;
    let profile = self.profile(user_id).await?;

    Ok(DailyCheckinOutcome { metrics, xp, profile, newly_earned })
  }

  // ── Challenges ────────────────────────────────────────────────────────

  pub async fn create_challenge(&self, name: String) -> Result<Challenge> {
    self.store.create_challenge(name).await.map_err(Error::store)
  }

  /// Join a challenge; idempotent per `(challenge, user)`.
  pub async fn join_challenge(
    &self,
    challenge_id: Uuid,
    user_id: Uuid,
  ) -> Result<ChallengeParticipant> {
    self
      .store
      .get_challenge(challenge_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ChallengeNotFound(challenge_id))?;
    self
      .store
      .join_challenge(challenge_id, user_id)
      .await
      .map_err(Error::store)
  }

  /// Upsert a challenge check-in. Counters move only on a newly completed
  /// day; the store serializes the transition per participant.
  pub async fn challenge_checkin(
    &self,
    participant_id: Uuid,
    day: NaiveDate,
    completed: bool,
    notes: Option<String>,
  ) -> Result<(ChallengeCheckin, ChallengeParticipant)> {
    self
      .store
      .get_participant(participant_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ParticipantNotFound(participant_id))?;
    let (checkin, participant) = self
      .store
      .upsert_checkin(participant_id, day, completed, notes)
      .await
      .map_err(Error::store)?;
    self.evaluate_achievements(participant.user_id).await?;
    Ok((checkin, participant))
  }

  // ── Achievement evaluation ────────────────────────────────────────────

  /// Re-check every rule against a freshly computed summary and award the
  /// ones not yet earned. Safe to call redundantly: the award table's
  /// uniqueness invariant, not evaluator memory, prevents re-awarding.
  pub async fn evaluate_achievements(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<Achievement>> {
    let counts =
      self.store.activity_counts(user_id).await.map_err(Error::store)?;
    let habit_days =
      self.store.habit_days(user_id).await.map_err(Error::store)?;
    let habit_streak = streak::compute(&habit_days, self.policy.today());

    let summary = ActivitySummary {
      total_mood_checkins:    counts.mood_checkins,
      total_journal_entries:  counts.journal_entries,
      total_habits_completed: counts.habits_completed,
      current_habit_streak:   habit_streak.current,
    };

    let mut newly_earned = Vec::new();
    for achievement in Achievement::ALL {
      if !achievement.earned(&summary) {
        continue;
      }
      let inserted = self
        .store
        .insert_award(user_id, achievement)
        .await
        .map_err(Error::store)?;
      if inserted {
        // The award row is the idempotence guard for the bonus as well.
        self
          .store
          .apply_xp(NewXpAward {
            user_id,
            amount: ACHIEVEMENT_XP,
            source: XpSource::Achievement,
            source_id: Some(achievement.id().to_owned()),
            description: Some(achievement.title().to_owned()),
          })
          .await
          .map_err(Error::store)?;
        newly_earned.push(achievement);
      }
    }
    Ok(newly_earned)
  }

  // ── XP ────────────────────────────────────────────────────────────────

  /// Append a ledger row and bump the profile. Rejects non-positive
  /// amounts at the boundary.
  pub async fn award_xp(
    &self,
    award: NewXpAward,
  ) -> Result<(XpTransaction, GamificationProfile)> {
    if award.amount <= 0 {
      return Err(Error::InvalidXpAmount(award.amount));
    }
    self.store.apply_xp(award).await.map_err(Error::store)
  }

  // ── Outbound queries ──────────────────────────────────────────────────

  /// Current and longest streak for `(user, kind)`, recomputed in full
  /// from the authoritative day set.
  pub async fn streak(
    &self,
    user_id: Uuid,
    kind: ActivityKind,
  ) -> Result<StreakState> {
    let days = match kind {
      ActivityKind::HabitCompletion => {
        self.store.habit_days(user_id).await.map_err(Error::store)?
      }
      _ => {
        let timestamps = self
          .store
          .activity_timestamps(user_id, kind)
          .await
          .map_err(Error::store)?;
        timestamps.iter().map(|ts| self.policy.day_of(*ts)).collect()
      }
    };
    Ok(streak::compute(&days, self.policy.today()))
  }

  /// A user's profile; users who have never earned XP get the level-1
  /// default rather than a not-found error.
  pub async fn profile(&self, user_id: Uuid) -> Result<GamificationProfile> {
    let profile =
      self.store.get_profile(user_id).await.map_err(Error::store)?;
    Ok(profile.unwrap_or_else(|| GamificationProfile::fresh(user_id)))
  }

  pub async fn achievements(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<AchievementAward>> {
    self.store.list_awards(user_id).await.map_err(Error::store)
  }

  pub async fn xp_transactions(
    &self,
    user_id: Uuid,
  ) -> Result<Vec<XpTransaction>> {
    self.store.xp_transactions(user_id).await.map_err(Error::store)
  }

  /// Recompute the scorecard for the week containing `date`, persist it,
  /// and return it. Any date in the week is accepted; it is normalized to
  /// the Monday anchor first.
  pub async fn weekly_scorecard(
    &self,
    user_id: Uuid,
    date: NaiveDate,
  ) -> Result<WeeklyScorecard> {
    let week_start = week_start_for(date);
    let rows = self
      .store
      .metrics_in_week(user_id, week_start)
      .await
      .map_err(Error::store)?;
    let habits = self
      .store
      .habits_completed_in_week(user_id, week_start)
      .await
      .map_err(Error::store)?;

    let card = scorecard::aggregate_rows(user_id, week_start, &rows, habits);
    self
      .store
      .upsert_scorecard(card.clone())
      .await
      .map_err(Error::store)?;
    Ok(card)
  }

  /// The ranked leaderboard for a challenge, recomputed on read.
  pub async fn challenge_leaderboard(
    &self,
    challenge_id: Uuid,
  ) -> Result<Vec<LeaderboardEntry>> {
    self
      .store
      .get_challenge(challenge_id)
      .await
      .map_err(Error::store)?
      .ok_or(Error::ChallengeNotFound(challenge_id))?;
    let participants = self
      .store
      .list_participants(challenge_id)
      .await
      .map_err(Error::store)?;
    Ok(challenge::rank(participants))
  }

  // ── Day marks ─────────────────────────────────────────────────────────

  /// Once-per-day gate for collaborator-side jobs (e.g. reminder sends).
  /// Durable and shared across instances, unlike a process-lifetime set.
  pub async fn mark_day(&self, scope: &str, day: NaiveDate) -> Result<bool> {
    self.store.mark_day(scope, day).await.map_err(Error::store)
  }

  /// TTL cleanup for the day-mark store.
  pub async fn purge_day_marks(&self, before: NaiveDate) -> Result<u64> {
    self.store.purge_day_marks(before).await.map_err(Error::store)
  }
}
