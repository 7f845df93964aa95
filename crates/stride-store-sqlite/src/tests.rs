//! Integration tests for `SqliteStore` against an in-memory database,
//! including engine-level flows driven through [`stride_core::Engine`].

use chrono::{Duration, NaiveDate, Utc};
use stride_core::{
  Engine, Error as CoreError,
  achievement::Achievement,
  activity::{ActivityKind, MetricValues, NewActivityEvent},
  calendar::{DayPolicy, week_start_for},
  store::ProgressStore,
  xp::{NewXpAward, XpSource},
};
use uuid::Uuid;

use crate::{Error, SqliteStore};

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

async fn engine() -> Engine<SqliteStore> {
  Engine::new(store().await, DayPolicy::Utc)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
  NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn award(user_id: Uuid, amount: i64) -> NewXpAward {
  NewXpAward {
    user_id,
    amount,
    source: XpSource::DailyCheckin,
    source_id: None,
    description: None,
  }
}

// ─── Activity events ─────────────────────────────────────────────────────────

#[tokio::test]
async fn record_event_and_read_back_timestamps() {
  let s = store().await;
  let user = Uuid::new_v4();

  let event = s
    .record_event(NewActivityEvent::new(
      user,
      ActivityKind::MoodLog,
      Utc::now(),
    ))
    .await
    .unwrap();
  assert_eq!(event.user_id, user);

  let timestamps = s
    .activity_timestamps(user, ActivityKind::MoodLog)
    .await
    .unwrap();
  assert_eq!(timestamps.len(), 1);

  // Other kinds and other users see nothing.
  assert!(s
    .activity_timestamps(user, ActivityKind::JournalEntry)
    .await
    .unwrap()
    .is_empty());
  assert!(s
    .activity_timestamps(Uuid::new_v4(), ActivityKind::MoodLog)
    .await
    .unwrap()
    .is_empty());
}

#[tokio::test]
async fn activity_counts_split_by_kind() {
  let s = store().await;
  let user = Uuid::new_v4();
  let now = Utc::now();

  for _ in 0..3 {
    s.record_event(NewActivityEvent::new(user, ActivityKind::MoodLog, now))
      .await
      .unwrap();
  }
  s.record_event(NewActivityEvent::new(user, ActivityKind::JournalEntry, now))
    .await
    .unwrap();
  s.set_habit_completion(user, Uuid::new_v4(), date(2026, 3, 2), true)
    .await
    .unwrap();

  let counts = s.activity_counts(user).await.unwrap();
  assert_eq!(counts.mood_checkins, 3);
  assert_eq!(counts.journal_entries, 1);
  assert_eq!(counts.habits_completed, 1);
}

// ─── Habits ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn habit_toggle_is_an_upsert() {
  let s = store().await;
  let user = Uuid::new_v4();
  let habit = Uuid::new_v4();
  let day = date(2026, 3, 2);

  s.set_habit_completion(user, habit, day, true).await.unwrap();
  assert_eq!(s.habit_days(user).await.unwrap(), vec![day]);

  // Toggling off keeps the row but removes the day from the streak set.
  s.set_habit_completion(user, habit, day, false).await.unwrap();
  assert!(s.habit_days(user).await.unwrap().is_empty());

  s.set_habit_completion(user, habit, day, true).await.unwrap();
  assert_eq!(s.habit_days(user).await.unwrap(), vec![day]);
}

#[tokio::test]
async fn habit_days_are_distinct_across_habits() {
  let s = store().await;
  let user = Uuid::new_v4();
  let day = date(2026, 3, 2);

  s.set_habit_completion(user, Uuid::new_v4(), day, true).await.unwrap();
  s.set_habit_completion(user, Uuid::new_v4(), day, true).await.unwrap();

  // Two habits on the same day are one streak day but two completions.
  assert_eq!(s.habit_days(user).await.unwrap(), vec![day]);
  assert_eq!(s.activity_counts(user).await.unwrap().habits_completed, 2);
}

// ─── XP ledger ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn first_award_creates_the_profile() {
  let s = store().await;
  let user = Uuid::new_v4();

  let (tx, profile) = s.apply_xp(award(user, 50)).await.unwrap();
  assert_eq!(tx.amount, 50);
  assert_eq!(profile.total_xp, 50);
  assert_eq!(profile.current_level, 1);
  assert_eq!(profile.xp_to_next_level, 50);
}

#[tokio::test]
async fn three_daily_checkins_reach_level_two() {
  let s = store().await;
  let user = Uuid::new_v4();

  for _ in 0..3 {
    s.apply_xp(award(user, 50)).await.unwrap();
  }

  let profile = s.get_profile(user).await.unwrap().unwrap();
  assert_eq!(profile.total_xp, 150);
  assert_eq!(profile.current_level, 2);
  assert_eq!(profile.xp_to_next_level, 150);
}

#[tokio::test]
async fn ledger_sum_always_matches_profile_total() {
  let s = store().await;
  let user = Uuid::new_v4();

  for amount in [10, 25, 40, 5] {
    s.apply_xp(award(user, amount)).await.unwrap();

    let profile = s.get_profile(user).await.unwrap().unwrap();
    let sum: i64 = s
      .xp_transactions(user)
      .await
      .unwrap()
      .iter()
      .map(|t| t.amount)
      .sum();
    assert_eq!(sum, profile.total_xp);
  }
}

#[tokio::test]
async fn concurrent_awards_all_land() {
  let s = store().await;
  let user = Uuid::new_v4();

  let mut handles = Vec::new();
  for _ in 0..10 {
    let s = s.clone();
    handles.push(tokio::spawn(async move {
      s.apply_xp(award(user, 10)).await.unwrap();
    }));
  }
  for handle in handles {
    handle.await.unwrap();
  }

  let profile = s.get_profile(user).await.unwrap().unwrap();
  assert_eq!(profile.total_xp, 100);

  let sum: i64 = s
    .xp_transactions(user)
    .await
    .unwrap()
    .iter()
    .map(|t| t.amount)
    .sum();
  assert_eq!(sum, 100);
}

#[tokio::test]
async fn has_awarded_xp_matches_on_source_key() {
  let s = store().await;
  let user = Uuid::new_v4();

  s.apply_xp(NewXpAward {
    user_id: user,
    amount: 50,
    source: XpSource::DailyCheckin,
    source_id: Some("2026-03-02".into()),
    description: None,
  })
  .await
  .unwrap();

  assert!(s
    .has_awarded_xp(user, XpSource::DailyCheckin, "2026-03-02")
    .await
    .unwrap());
  assert!(!s
    .has_awarded_xp(user, XpSource::DailyCheckin, "2026-03-03")
    .await
    .unwrap());
  assert!(!s
    .has_awarded_xp(user, XpSource::Achievement, "2026-03-02")
    .await
    .unwrap());
}

#[tokio::test]
async fn missing_profile_reads_as_none() {
  let s = store().await;
  assert!(s.get_profile(Uuid::new_v4()).await.unwrap().is_none());
}

// ─── Achievements ────────────────────────────────────────────────────────────

#[tokio::test]
async fn insert_award_is_idempotent() {
  let s = store().await;
  let user = Uuid::new_v4();

  assert!(s.insert_award(user, Achievement::FirstMoodLog).await.unwrap());
  assert!(!s.insert_award(user, Achievement::FirstMoodLog).await.unwrap());

  let awards = s.list_awards(user).await.unwrap();
  assert_eq!(awards.len(), 1);
  assert_eq!(awards[0].achievement, Achievement::FirstMoodLog);
}

#[tokio::test]
async fn concurrent_award_inserts_create_one_row() {
  let s = store().await;
  let user = Uuid::new_v4();

  let mut handles = Vec::new();
  for _ in 0..8 {
    let s = s.clone();
    handles.push(tokio::spawn(async move {
      s.insert_award(user, Achievement::HabitStreak3).await.unwrap()
    }));
  }

  let mut inserted = 0;
  for handle in handles {
    if handle.await.unwrap() {
      inserted += 1;
    }
  }
  assert_eq!(inserted, 1);
  assert_eq!(s.list_awards(user).await.unwrap().len(), 1);
}

// ─── Engine: activity and achievements ───────────────────────────────────────

#[tokio::test]
async fn first_mood_log_earns_the_achievement() {
  let e = engine().await;
  let user = Uuid::new_v4();

  let (_, newly) = e
    .log_mood(user, Utc::now(), serde_json::json!({ "mood": 7 }))
    .await
    .unwrap();
  assert_eq!(newly, vec![Achievement::FirstMoodLog]);

  // Redundant evaluation awards nothing further.
  assert!(e.evaluate_achievements(user).await.unwrap().is_empty());

  let (_, newly_again) = e
    .log_mood(user, Utc::now(), serde_json::json!({ "mood": 4 }))
    .await
    .unwrap();
  assert!(newly_again.is_empty());
}

#[tokio::test]
async fn achievement_bonus_lands_in_the_ledger_once() {
  let e = engine().await;
  let user = Uuid::new_v4();

  e.log_journal_entry(user, Utc::now(), serde_json::Value::Null)
    .await
    .unwrap();
  e.log_journal_entry(user, Utc::now(), serde_json::Value::Null)
    .await
    .unwrap();

  let transactions = e.xp_transactions(user).await.unwrap();
  let bonuses: Vec<_> = transactions
    .iter()
    .filter(|t| t.source == XpSource::Achievement)
    .collect();
  assert_eq!(bonuses.len(), 1);
  assert_eq!(
    bonuses[0].source_id.as_deref(),
    Some(Achievement::FirstJournalEntry.id())
  );
}

#[tokio::test]
async fn habit_streak_achievement_unlocks_on_third_day() {
  let e = engine().await;
  let user = Uuid::new_v4();
  let habit = Uuid::new_v4();
  let now = Utc::now();

  let (_, day_one) = e
    .toggle_habit(user, habit, now - Duration::days(2), true)
    .await
    .unwrap();
  assert!(day_one.contains(&Achievement::FirstHabitCompletion));
  assert!(!day_one.contains(&Achievement::HabitStreak3));

  e.toggle_habit(user, habit, now - Duration::days(1), true)
    .await
    .unwrap();
  let (_, day_three) = e.toggle_habit(user, habit, now, true).await.unwrap();
  assert!(day_three.contains(&Achievement::HabitStreak3));
}

// ─── Engine: streaks ─────────────────────────────────────────────────────────

#[tokio::test]
async fn habit_streak_counts_consecutive_days() {
  let e = engine().await;
  let user = Uuid::new_v4();
  let habit = Uuid::new_v4();
  let now = Utc::now();

  for days_ago in 0..3 {
    e.toggle_habit(user, habit, now - Duration::days(days_ago), true)
      .await
      .unwrap();
  }

  let streak = e.streak(user, ActivityKind::HabitCompletion).await.unwrap();
  assert_eq!(streak.current, 3);
  assert_eq!(streak.longest, 3);
}

#[tokio::test]
async fn stale_history_zeroes_current_only() {
  let e = engine().await;
  let user = Uuid::new_v4();
  let habit = Uuid::new_v4();
  let now = Utc::now();

  // Three consecutive days ending four days ago.
  for days_ago in 4..7 {
    e.toggle_habit(user, habit, now - Duration::days(days_ago), true)
      .await
      .unwrap();
  }

  let streak = e.streak(user, ActivityKind::HabitCompletion).await.unwrap();
  assert_eq!(streak.current, 0);
  assert_eq!(streak.longest, 3);
}

#[tokio::test]
async fn mood_streak_derives_days_from_event_timestamps() {
  let e = engine().await;
  let user = Uuid::new_v4();
  let now = Utc::now();

  // Two events today and one yesterday: two streak days, not three.
  e.log_mood(user, now, serde_json::Value::Null).await.unwrap();
  e.log_mood(user, now - Duration::hours(1), serde_json::Value::Null)
    .await
    .unwrap();
  e.log_mood(user, now - Duration::days(1), serde_json::Value::Null)
    .await
    .unwrap();

  let streak = e.streak(user, ActivityKind::MoodLog).await.unwrap();
  assert_eq!(streak.current, 2);
  assert_eq!(streak.longest, 2);
}

// ─── Engine: daily metrics ───────────────────────────────────────────────────

#[tokio::test]
async fn daily_checkin_pays_once_per_day() {
  let e = engine().await;
  let user = Uuid::new_v4();
  let now = Utc::now();

  let values = MetricValues {
    mood: Some(6),
    energy: Some(5),
    ..Default::default()
  };

  let first = e.submit_daily_metrics(user, now, values).await.unwrap();
  assert!(first.xp.is_some());
  assert_eq!(first.profile.total_xp, 50);

  // An edited re-submission the same day updates the row but not the XP.
  let edited = MetricValues { mood: Some(8), ..values };
  let second = e.submit_daily_metrics(user, now, edited).await.unwrap();
  assert!(second.xp.is_none());
  assert_eq!(second.profile.total_xp, 50);
  assert_eq!(second.metrics.mood, Some(8));
}

#[tokio::test]
async fn out_of_range_metrics_are_rejected() {
  let e = engine().await;
  let user = Uuid::new_v4();

  let result = e
    .submit_daily_metrics(
      user,
      Utc::now(),
      MetricValues { mood: Some(42), ..Default::default() },
    )
    .await;
  assert!(matches!(
    result,
    Err(CoreError::MetricOutOfRange { field: "mood", .. })
  ));

  // Nothing was persisted.
  let week = week_start_for(Utc::now().date_naive());
  assert!(e
    .store()
    .metrics_in_week(user, week)
    .await
    .unwrap()
    .is_empty());
}

#[tokio::test]
async fn non_positive_awards_are_rejected() {
  let e = engine().await;
  let user = Uuid::new_v4();

  assert!(matches!(
    e.award_xp(award(user, 0)).await,
    Err(CoreError::InvalidXpAmount(0))
  ));
  assert!(matches!(
    e.award_xp(award(user, -5)).await,
    Err(CoreError::InvalidXpAmount(-5))
  ));
}

// ─── Engine: weekly scorecards ───────────────────────────────────────────────

#[tokio::test]
async fn scorecard_averages_only_logged_fields() {
  let e = engine().await;
  let user = Uuid::new_v4();
  let monday = date(2026, 3, 2);
  assert_eq!(week_start_for(monday), monday);

  // Mood logged twice, sleep never.
  for (offset, mood) in [(0, 4), (1, 8)] {
    e.store()
      .upsert_daily_metrics(stride_core::activity::DailyMetrics {
        user_id: user,
        day: monday + Duration::days(offset),
        mood: Some(mood),
        energy: None,
        stress: None,
        sleep_hours: None,
        sleep_quality: None,
      })
      .await
      .unwrap();
  }
  e.store()
    .set_habit_completion(user, Uuid::new_v4(), monday, true)
    .await
    .unwrap();

  let card = e.weekly_scorecard(user, monday).await.unwrap();
  assert_eq!(card.week_start, monday);
  assert_eq!(card.avg_mood, Some(6.0));
  assert_eq!(card.avg_sleep_hours, None);
  assert_eq!(card.total_habits_completed, 1);
}

#[tokio::test]
async fn scorecard_recomputation_is_idempotent_and_persisted() {
  let e = engine().await;
  let user = Uuid::new_v4();
  let monday = date(2026, 3, 2);

  e.store()
    .upsert_daily_metrics(stride_core::activity::DailyMetrics {
      user_id: user,
      day: monday,
      mood: Some(7),
      energy: Some(6),
      stress: Some(3),
      sleep_hours: Some(7.5),
      sleep_quality: Some(8),
    })
    .await
    .unwrap();

  // Any date inside the week resolves to the same Monday anchor.
  let first = e.weekly_scorecard(user, monday + Duration::days(4)).await.unwrap();
  let second = e.weekly_scorecard(user, monday).await.unwrap();
  assert_eq!(first, second);

  let stored = e
    .store()
    .get_scorecard(user, monday)
    .await
    .unwrap()
    .expect("scorecard persisted");
  assert_eq!(stored, first);
}

// ─── Challenges ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn join_is_idempotent_per_user() {
  let e = engine().await;
  let challenge = e.create_challenge("Hydration".into()).await.unwrap();
  let user = Uuid::new_v4();

  let first = e.join_challenge(challenge.challenge_id, user).await.unwrap();
  let again = e.join_challenge(challenge.challenge_id, user).await.unwrap();
  assert_eq!(first.participant_id, again.participant_id);
}

#[tokio::test]
async fn joining_a_missing_challenge_fails() {
  let e = engine().await;
  let result = e.join_challenge(Uuid::new_v4(), Uuid::new_v4()).await;
  assert!(matches!(result, Err(CoreError::ChallengeNotFound(_))));
}

#[tokio::test]
async fn first_completion_moves_all_counters() {
  let e = engine().await;
  let challenge = e.create_challenge("Steps".into()).await.unwrap();
  let p = e
    .join_challenge(challenge.challenge_id, Uuid::new_v4())
    .await
    .unwrap();

  let (checkin, after) = e
    .challenge_checkin(p.participant_id, date(2026, 3, 2), true, None)
    .await
    .unwrap();
  assert!(checkin.completed);
  assert_eq!(after.total_completions, 1);
  assert_eq!(after.current_streak, 1);
  assert_eq!(after.best_streak, 1);
}

#[tokio::test]
async fn resubmitting_a_completed_day_changes_nothing() {
  let e = engine().await;
  let challenge = e.create_challenge("Steps".into()).await.unwrap();
  let p = e
    .join_challenge(challenge.challenge_id, Uuid::new_v4())
    .await
    .unwrap();
  let day = date(2026, 3, 2);

  e.challenge_checkin(p.participant_id, day, true, None).await.unwrap();
  let (checkin, after) = e
    .challenge_checkin(p.participant_id, day, true, Some("again".into()))
    .await
    .unwrap();

  assert_eq!(after.total_completions, 1);
  assert_eq!(after.current_streak, 1);
  assert_eq!(checkin.notes.as_deref(), Some("again"));

  // A later downgrade does not un-complete the day or move counters.
  let (downgraded, after_downgrade) = e
    .challenge_checkin(p.participant_id, day, false, None)
    .await
    .unwrap();
  assert!(downgraded.completed);
  assert_eq!(after_downgrade.total_completions, 1);
}

#[tokio::test]
async fn incomplete_checkin_records_without_counters() {
  let e = engine().await;
  let challenge = e.create_challenge("Steps".into()).await.unwrap();
  let p = e
    .join_challenge(challenge.challenge_id, Uuid::new_v4())
    .await
    .unwrap();
  let day = date(2026, 3, 2);

  let (checkin, after) = e
    .challenge_checkin(p.participant_id, day, false, Some("rest day".into()))
    .await
    .unwrap();
  assert!(!checkin.completed);
  assert_eq!(after.total_completions, 0);
  assert_eq!(after.current_streak, 0);

  // The same day can still be completed later.
  let (_, completed) = e
    .challenge_checkin(p.participant_id, day, true, None)
    .await
    .unwrap();
  assert_eq!(completed.total_completions, 1);
}

#[tokio::test]
async fn checkin_for_unknown_participant_is_not_found() {
  let e = engine().await;
  let result = e
    .challenge_checkin(Uuid::new_v4(), date(2026, 3, 2), true, None)
    .await;
  assert!(matches!(result, Err(CoreError::ParticipantNotFound(_))));

  let s = store().await;
  let direct = s
    .upsert_checkin(Uuid::new_v4(), date(2026, 3, 2), true, None)
    .await;
  assert!(matches!(direct, Err(Error::ParticipantNotFound(_))));
}

#[tokio::test]
async fn leaderboard_breaks_ties_by_join_order() {
  let e = engine().await;
  let challenge = e.create_challenge("Steps".into()).await.unwrap();

  let early = e
    .join_challenge(challenge.challenge_id, Uuid::new_v4())
    .await
    .unwrap();
  let late = e
    .join_challenge(challenge.challenge_id, Uuid::new_v4())
    .await
    .unwrap();

  // Same completion totals for both.
  for day_offset in 0..5 {
    let day = date(2026, 3, 2) + Duration::days(day_offset);
    e.challenge_checkin(late.participant_id, day, true, None).await.unwrap();
    e.challenge_checkin(early.participant_id, day, true, None).await.unwrap();
  }

  let board = e
    .challenge_leaderboard(challenge.challenge_id)
    .await
    .unwrap();
  assert_eq!(board.len(), 2);
  assert_eq!(board[0].participant.participant_id, early.participant_id);
  assert_eq!(board[0].rank, 1);
  assert_eq!(board[1].rank, 2);
}

#[tokio::test]
async fn leaderboard_for_missing_challenge_fails() {
  let e = engine().await;
  let result = e.challenge_leaderboard(Uuid::new_v4()).await;
  assert!(matches!(result, Err(CoreError::ChallengeNotFound(_))));
}

// ─── Day marks ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn mark_day_fires_once_per_scope_and_day() {
  let s = store().await;
  let day = date(2026, 3, 2);

  assert!(s.mark_day("reminder:morning", day).await.unwrap());
  assert!(!s.mark_day("reminder:morning", day).await.unwrap());

  // Different scope or day is an independent mark.
  assert!(s.mark_day("reminder:evening", day).await.unwrap());
  assert!(s
    .mark_day("reminder:morning", day + Duration::days(1))
    .await
    .unwrap());
}

#[tokio::test]
async fn purge_removes_expired_marks() {
  let s = store().await;

  s.mark_day("reminder:morning", date(2026, 3, 1)).await.unwrap();
  s.mark_day("reminder:morning", date(2026, 3, 2)).await.unwrap();
  s.mark_day("reminder:morning", date(2026, 3, 9)).await.unwrap();

  let removed = s.purge_day_marks(date(2026, 3, 8)).await.unwrap();
  assert_eq!(removed, 2);

  // A purged day can fire again.
  assert!(s.mark_day("reminder:morning", date(2026, 3, 2)).await.unwrap());
}
