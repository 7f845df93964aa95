//! [`SqliteStore`] — the SQLite implementation of [`ProgressStore`].

use std::path::Path;

use chrono::{DateTime, NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use stride_core::{
  achievement::{Achievement, AchievementAward},
  activity::{
    ActivityCounts, ActivityEvent, ActivityKind, DailyMetrics, HabitCompletion,
    NewActivityEvent,
  },
  calendar::week_end_for,
  challenge::{
    Challenge, ChallengeCheckin, ChallengeParticipant, ParticipantStatus,
  },
  scorecard::WeeklyScorecard,
  store::ProgressStore,
  xp::{self, GamificationProfile, NewXpAward, XpSource, XpTransaction},
};

use crate::{
  Error, Result,
  encode::{
    RawAward, RawChallenge, RawCheckin, RawMetrics, RawParticipant,
    RawProfile, RawScorecard, RawTransaction, decode_day, decode_dt,
    encode_day, encode_dt, encode_uuid,
  },
  schema::SCHEMA,
};

const PARTICIPANT_COLUMNS: &str = "participant_id, challenge_id, user_id, \
   joined_at, current_streak, best_streak, total_completions, status";

fn read_participant_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<RawParticipant> {
  Ok(RawParticipant {
    participant_id:    row.get(0)?,
    challenge_id:      row.get(1)?,
    user_id:           row.get(2)?,
    joined_at:         row.get(3)?,
    current_streak:    row.get(4)?,
    best_streak:       row.get(5)?,
    total_completions: row.get(6)?,
    status:            row.get(7)?,
  })
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Stride progress store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All writes
/// funnel through the connection's worker thread, so multi-statement
/// transactions (XP awards, check-in counters) serialize naturally.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── ProgressStore impl ──────────────────────────────────────────────────────

impl ProgressStore for SqliteStore {
  type Error = Error;

  // ── Activity events ───────────────────────────────────────────────────────

  async fn record_event(&self, input: NewActivityEvent) -> Result<ActivityEvent> {
    let event = ActivityEvent {
      event_id:    Uuid::new_v4(),
      user_id:     input.user_id,
      kind:        input.kind,
      occurred_at: input.occurred_at,
      payload:     input.payload,
    };

    let event_id_str = encode_uuid(event.event_id);
    let user_id_str  = encode_uuid(event.user_id);
    let kind_str     = event.kind.discriminant().to_owned();
    let at_str       = encode_dt(event.occurred_at);
    let payload_str  = event.payload.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO activity_events (event_id, user_id, kind, occurred_at, payload)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            event_id_str,
            user_id_str,
            kind_str,
            at_str,
            payload_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(event)
  }

  async fn activity_timestamps(
    &self,
    user_id: Uuid,
    kind: ActivityKind,
  ) -> Result<Vec<DateTime<Utc>>> {
    let user_id_str = encode_uuid(user_id);
    let kind_str    = kind.discriminant().to_owned();

    let raw: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT occurred_at FROM activity_events
           WHERE user_id = ?1 AND kind = ?2",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str, kind_str], |row| {
            row.get(0)
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raw
      .iter()
      .map(|s| decode_dt(s))
      .collect()
  }

  async fn activity_counts(&self, user_id: Uuid) -> Result<ActivityCounts> {
    let user_id_str = encode_uuid(user_id);

    let (moods, journals, habits): (u32, u32, u32) = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT
             (SELECT COUNT(*) FROM activity_events
               WHERE user_id = ?1 AND kind = 'mood_log'),
             (SELECT COUNT(*) FROM activity_events
               WHERE user_id = ?1 AND kind = 'journal_entry'),
             (SELECT COUNT(*) FROM habit_completions
               WHERE user_id = ?1 AND completed = 1)",
          rusqlite::params![user_id_str],
          |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?)),
        )?)
      })
      .await?;

    Ok(ActivityCounts {
      mood_checkins:    moods,
      journal_entries:  journals,
      habits_completed: habits,
    })
  }

  // ── Habits ────────────────────────────────────────────────────────────────

  async fn set_habit_completion(
    &self,
    user_id: Uuid,
    habit_id: Uuid,
    day: NaiveDate,
    completed: bool,
  ) -> Result<HabitCompletion> {
    let user_id_str  = encode_uuid(user_id);
    let habit_id_str = encode_uuid(habit_id);
    let day_str      = encode_day(day);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO habit_completions (user_id, habit_id, day, completed)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (user_id, habit_id, day)
           DO UPDATE SET completed = excluded.completed",
          rusqlite::params![user_id_str, habit_id_str, day_str, completed],
        )?;
        Ok(())
      })
      .await?;

    Ok(HabitCompletion { user_id, habit_id, day, completed })
  }

  async fn habit_days(&self, user_id: Uuid) -> Result<Vec<NaiveDate>> {
    let user_id_str = encode_uuid(user_id);

    let raw: Vec<String> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT DISTINCT day FROM habit_completions
           WHERE user_id = ?1 AND completed = 1",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], |row| row.get(0))?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raw.iter().map(|s| decode_day(s)).collect()
  }

  async fn habits_completed_in_week(
    &self,
    user_id: Uuid,
    week_start: NaiveDate,
  ) -> Result<u32> {
    let user_id_str = encode_uuid(user_id);
    let start_str   = encode_day(week_start);
    let end_str     = encode_day(week_end_for(week_start));

    let count: u32 = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          "SELECT COUNT(*) FROM habit_completions
           WHERE user_id = ?1 AND completed = 1
             AND day BETWEEN ?2 AND ?3",
          rusqlite::params![user_id_str, start_str, end_str],
          |row| row.get(0),
        )?)
      })
      .await?;

    Ok(count)
  }

  // ── Daily metrics ─────────────────────────────────────────────────────────

  async fn upsert_daily_metrics(
    &self,
    metrics: DailyMetrics,
  ) -> Result<DailyMetrics> {
    let user_id_str = encode_uuid(metrics.user_id);
    let day_str     = encode_day(metrics.day);
    let row         = metrics.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO daily_metrics
             (user_id, day, mood, energy, stress, sleep_hours, sleep_quality)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (user_id, day) DO UPDATE SET
             mood          = excluded.mood,
             energy        = excluded.energy,
             stress        = excluded.stress,
             sleep_hours   = excluded.sleep_hours,
             sleep_quality = excluded.sleep_quality",
          rusqlite::params![
            user_id_str,
            day_str,
            row.mood,
            row.energy,
            row.stress,
            row.sleep_hours,
            row.sleep_quality,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(metrics)
  }

  async fn metrics_in_week(
    &self,
    user_id: Uuid,
    week_start: NaiveDate,
  ) -> Result<Vec<DailyMetrics>> {
    let user_id_str = encode_uuid(user_id);
    let start_str   = encode_day(week_start);
    let end_str     = encode_day(week_end_for(week_start));

    let raws: Vec<RawMetrics> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, day, mood, energy, stress, sleep_hours, sleep_quality
           FROM daily_metrics
           WHERE user_id = ?1 AND day BETWEEN ?2 AND ?3
           ORDER BY day",
        )?;
        let rows = stmt
          .query_map(
            rusqlite::params![user_id_str, start_str, end_str],
            |row| {
              Ok(RawMetrics {
                user_id:       row.get(0)?,
                day:           row.get(1)?,
                mood:          row.get(2)?,
                energy:        row.get(3)?,
                stress:        row.get(4)?,
                sleep_hours:   row.get(5)?,
                sleep_quality: row.get(6)?,
              })
            },
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMetrics::into_metrics).collect()
  }

  // ── XP ledger ─────────────────────────────────────────────────────────────

  async fn apply_xp(
    &self,
    input: NewXpAward,
  ) -> Result<(XpTransaction, GamificationProfile)> {
    let tx_id       = Uuid::new_v4();
    let created_at  = Utc::now();

    let user_id_str = encode_uuid(input.user_id);
    let tx_id_str   = encode_uuid(tx_id);
    let at_str      = encode_dt(created_at);
    let amount      = input.amount;
    let source_str  = input.source.discriminant().to_owned();
    let source_id   = input.source_id.clone();
    let description = input.description.clone();

    // The increment is a single relative UPDATE, so two concurrent awards
    // for one user both land; the level cache and the ledger row commit in
    // the same transaction or not at all.
    let total_xp: i64 = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        tx.execute(
          "INSERT INTO profiles (user_id, total_xp, current_level, xp_to_next_level, updated_at)
           VALUES (?1, ?2, 1, 100, ?3)
           ON CONFLICT (user_id) DO UPDATE SET
             total_xp   = total_xp + excluded.total_xp,
             updated_at = excluded.updated_at",
          rusqlite::params![user_id_str, amount, at_str],
        )?;

        let total: i64 = tx.query_row(
          "SELECT total_xp FROM profiles WHERE user_id = ?1",
          rusqlite::params![user_id_str],
          |row| row.get(0),
        )?;

        let (level, to_next) = xp::level_for(total);
        tx.execute(
          "UPDATE profiles SET current_level = ?2, xp_to_next_level = ?3
           WHERE user_id = ?1",
          rusqlite::params![user_id_str, level, to_next],
        )?;

        tx.execute(
          "INSERT INTO xp_transactions
             (tx_id, user_id, amount, source, source_id, description, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
          rusqlite::params![
            tx_id_str,
            user_id_str,
            amount,
            source_str,
            source_id,
            description,
            at_str,
          ],
        )?;

        tx.commit()?;
        Ok(total)
      })
      .await?;

    let (current_level, xp_to_next_level) = xp::level_for(total_xp);

    let transaction = XpTransaction {
      tx_id,
      user_id: input.user_id,
      amount: input.amount,
      source: input.source,
      source_id: input.source_id,
      description: input.description,
      created_at,
    };
    let profile = GamificationProfile {
      user_id: input.user_id,
      total_xp,
      current_level,
      xp_to_next_level,
      updated_at: created_at,
    };

    Ok((transaction, profile))
  }

  async fn has_awarded_xp(
    &self,
    user_id: Uuid,
    source: XpSource,
    source_id: &str,
  ) -> Result<bool> {
    let user_id_str   = encode_uuid(user_id);
    let source_str    = source.discriminant().to_owned();
    let source_id_str = source_id.to_owned();

    let found: bool = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT 1 FROM xp_transactions
               WHERE user_id = ?1 AND source = ?2 AND source_id = ?3
               LIMIT 1",
              rusqlite::params![user_id_str, source_str, source_id_str],
              |_| Ok(true),
            )
            .optional()?
            .unwrap_or(false),
        )
      })
      .await?;

    Ok(found)
  }

  async fn get_profile(
    &self,
    user_id: Uuid,
  ) -> Result<Option<GamificationProfile>> {
    let user_id_str = encode_uuid(user_id);

    let raw: Option<RawProfile> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, total_xp, current_level, xp_to_next_level, updated_at
               FROM profiles WHERE user_id = ?1",
              rusqlite::params![user_id_str],
              |row| {
                Ok(RawProfile {
                  user_id:          row.get(0)?,
                  total_xp:         row.get(1)?,
                  current_level:    row.get(2)?,
                  xp_to_next_level: row.get(3)?,
                  updated_at:       row.get(4)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawProfile::into_profile).transpose()
  }

  async fn xp_transactions(&self, user_id: Uuid) -> Result<Vec<XpTransaction>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<RawTransaction> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT tx_id, user_id, amount, source, source_id, description, created_at
           FROM xp_transactions
           WHERE user_id = ?1
           ORDER BY created_at, tx_id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], |row| {
            Ok(RawTransaction {
              tx_id:       row.get(0)?,
              user_id:     row.get(1)?,
              amount:      row.get(2)?,
              source:      row.get(3)?,
              source_id:   row.get(4)?,
              description: row.get(5)?,
              created_at:  row.get(6)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawTransaction::into_transaction).collect()
  }

  // ── Achievements ──────────────────────────────────────────────────────────

  async fn insert_award(
    &self,
    user_id: Uuid,
    achievement: Achievement,
  ) -> Result<bool> {
    let user_id_str = encode_uuid(user_id);
    let id_str      = achievement.id().to_owned();
    let at_str      = encode_dt(Utc::now());

    // INSERT OR IGNORE against the (user_id, achievement) primary key is
    // the whole concurrency story: a duplicate concurrent award attempt
    // changes zero rows instead of creating a second one.
    let inserted: bool = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO achievement_awards (user_id, achievement, earned_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![user_id_str, id_str, at_str],
        )?;
        Ok(changed > 0)
      })
      .await?;

    Ok(inserted)
  }

  async fn list_awards(&self, user_id: Uuid) -> Result<Vec<AchievementAward>> {
    let user_id_str = encode_uuid(user_id);

    let raws: Vec<RawAward> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT user_id, achievement, earned_at FROM achievement_awards
           WHERE user_id = ?1
           ORDER BY earned_at, achievement",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id_str], |row| {
            Ok(RawAward {
              user_id:     row.get(0)?,
              achievement: row.get(1)?,
              earned_at:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAward::into_award).collect()
  }

  // ── Weekly scorecards ─────────────────────────────────────────────────────

  async fn upsert_scorecard(&self, scorecard: WeeklyScorecard) -> Result<()> {
    let user_id_str = encode_uuid(scorecard.user_id);
    let week_str    = encode_day(scorecard.week_start);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO weekly_scorecards
             (user_id, week_start, avg_mood, avg_energy, avg_stress,
              avg_sleep_hours, avg_sleep_quality, total_habits_completed)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
           ON CONFLICT (user_id, week_start) DO UPDATE SET
             avg_mood               = excluded.avg_mood,
             avg_energy             = excluded.avg_energy,
             avg_stress             = excluded.avg_stress,
             avg_sleep_hours        = excluded.avg_sleep_hours,
             avg_sleep_quality      = excluded.avg_sleep_quality,
             total_habits_completed = excluded.total_habits_completed",
          rusqlite::params![
            user_id_str,
            week_str,
            scorecard.avg_mood,
            scorecard.avg_energy,
            scorecard.avg_stress,
            scorecard.avg_sleep_hours,
            scorecard.avg_sleep_quality,
            scorecard.total_habits_completed,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(())
  }

  async fn get_scorecard(
    &self,
    user_id: Uuid,
    week_start: NaiveDate,
  ) -> Result<Option<WeeklyScorecard>> {
    let user_id_str = encode_uuid(user_id);
    let week_str    = encode_day(week_start);

    let raw: Option<RawScorecard> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT user_id, week_start, avg_mood, avg_energy, avg_stress,
                      avg_sleep_hours, avg_sleep_quality, total_habits_completed
               FROM weekly_scorecards
               WHERE user_id = ?1 AND week_start = ?2",
              rusqlite::params![user_id_str, week_str],
              |row| {
                Ok(RawScorecard {
                  user_id:                row.get(0)?,
                  week_start:             row.get(1)?,
                  avg_mood:               row.get(2)?,
                  avg_energy:             row.get(3)?,
                  avg_stress:             row.get(4)?,
                  avg_sleep_hours:        row.get(5)?,
                  avg_sleep_quality:      row.get(6)?,
                  total_habits_completed: row.get(7)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawScorecard::into_scorecard).transpose()
  }

  // ── Challenges ────────────────────────────────────────────────────────────

  async fn create_challenge(&self, name: String) -> Result<Challenge> {
    let challenge = Challenge {
      challenge_id: Uuid::new_v4(),
      name,
      created_at: Utc::now(),
    };

    let id_str   = encode_uuid(challenge.challenge_id);
    let name_str = challenge.name.clone();
    let at_str   = encode_dt(challenge.created_at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO challenges (challenge_id, name, created_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![id_str, name_str, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(challenge)
  }

  async fn get_challenge(&self, challenge_id: Uuid) -> Result<Option<Challenge>> {
    let id_str = encode_uuid(challenge_id);

    let raw: Option<RawChallenge> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              "SELECT challenge_id, name, created_at FROM challenges
               WHERE challenge_id = ?1",
              rusqlite::params![id_str],
              |row| {
                Ok(RawChallenge {
                  challenge_id: row.get(0)?,
                  name:         row.get(1)?,
                  created_at:   row.get(2)?,
                })
              },
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawChallenge::into_challenge).transpose()
  }

  async fn join_challenge(
    &self,
    challenge_id: Uuid,
    user_id: Uuid,
  ) -> Result<ChallengeParticipant> {
    let challenge_id_str = encode_uuid(challenge_id);
    let user_id_str      = encode_uuid(user_id);
    let new_id_str       = encode_uuid(Uuid::new_v4());
    let at_str           = encode_dt(Utc::now());
    let status_str       = ParticipantStatus::Active.discriminant().to_owned();

    let raw: RawParticipant = self
      .conn
      .call(move |conn| {
        // The UNIQUE (challenge_id, user_id) constraint makes re-joining a
        // no-op; the SELECT then returns whichever row won.
        conn.execute(
          "INSERT OR IGNORE INTO challenge_participants
             (participant_id, challenge_id, user_id, joined_at,
              current_streak, best_streak, total_completions, status)
           VALUES (?1, ?2, ?3, ?4, 0, 0, 0, ?5)",
          rusqlite::params![
            new_id_str,
            challenge_id_str,
            user_id_str,
            at_str,
            status_str,
          ],
        )?;

        Ok(conn.query_row(
          &format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM challenge_participants
             WHERE challenge_id = ?1 AND user_id = ?2"
          ),
          rusqlite::params![challenge_id_str, user_id_str],
          read_participant_row,
        )?)
      })
      .await?;

    raw.into_participant()
  }

  async fn get_participant(
    &self,
    participant_id: Uuid,
  ) -> Result<Option<ChallengeParticipant>> {
    let id_str = encode_uuid(participant_id);

    let raw: Option<RawParticipant> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {PARTICIPANT_COLUMNS} FROM challenge_participants
                 WHERE participant_id = ?1"
              ),
              rusqlite::params![id_str],
              read_participant_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawParticipant::into_participant).transpose()
  }

  async fn list_participants(
    &self,
    challenge_id: Uuid,
  ) -> Result<Vec<ChallengeParticipant>> {
    let id_str = encode_uuid(challenge_id);

    let raws: Vec<RawParticipant> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PARTICIPANT_COLUMNS} FROM challenge_participants
           WHERE challenge_id = ?1"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![id_str], read_participant_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawParticipant::into_participant).collect()
  }

  async fn upsert_checkin(
    &self,
    participant_id: Uuid,
    day: NaiveDate,
    completed: bool,
    notes: Option<String>,
  ) -> Result<(ChallengeCheckin, ChallengeParticipant)> {
    let id_str  = encode_uuid(participant_id);
    let day_str = encode_day(day);

    let result: Option<(RawCheckin, RawParticipant)> = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        let exists: bool = tx
          .query_row(
            "SELECT 1 FROM challenge_participants WHERE participant_id = ?1",
            rusqlite::params![id_str],
            |_| Ok(true),
          )
          .optional()?
          .unwrap_or(false);
        if !exists {
          return Ok(None);
        }

        let prior_completed: Option<bool> = tx
          .query_row(
            "SELECT completed FROM challenge_checkins
             WHERE participant_id = ?1 AND day = ?2",
            rusqlite::params![id_str, day_str],
            |row| row.get(0),
          )
          .optional()?;

        // A completed day never reverts; only a first-time completion
        // moves the counters.
        let was_completed   = prior_completed.unwrap_or(false);
        let newly_completed = completed && !was_completed;
        let stored_completed = completed || was_completed;

        tx.execute(
          "INSERT INTO challenge_checkins (participant_id, day, completed, notes)
           VALUES (?1, ?2, ?3, ?4)
           ON CONFLICT (participant_id, day) DO UPDATE SET
             completed = excluded.completed,
             notes     = excluded.notes",
          rusqlite::params![id_str, day_str, stored_completed, notes],
        )?;

        if newly_completed {
          // current_streak on the right-hand side is the pre-update value,
          // so best_streak sees the incremented streak.
          tx.execute(
            "UPDATE challenge_participants SET
               total_completions = total_completions + 1,
               current_streak    = current_streak + 1,
               best_streak       = MAX(best_streak, current_streak + 1)
             WHERE participant_id = ?1",
            rusqlite::params![id_str],
          )?;
        }

        let raw_checkin = tx.query_row(
          "SELECT participant_id, day, completed, notes FROM challenge_checkins
           WHERE participant_id = ?1 AND day = ?2",
          rusqlite::params![id_str, day_str],
          |row| {
            Ok(RawCheckin {
              participant_id: row.get(0)?,
              day:            row.get(1)?,
              completed:      row.get(2)?,
              notes:          row.get(3)?,
            })
          },
        )?;

        let raw_participant = tx.query_row(
          &format!(
            "SELECT {PARTICIPANT_COLUMNS} FROM challenge_participants
             WHERE participant_id = ?1"
          ),
          rusqlite::params![id_str],
          read_participant_row,
        )?;

        tx.commit()?;
        Ok(Some((raw_checkin, raw_participant)))
      })
      .await?;

    let (raw_checkin, raw_participant) =
      result.ok_or(Error::ParticipantNotFound(participant_id))?;
    Ok((raw_checkin.into_checkin()?, raw_participant.into_participant()?))
  }

  // ── Day marks ─────────────────────────────────────────────────────────────

  async fn mark_day(&self, scope: &str, day: NaiveDate) -> Result<bool> {
    let scope_str = scope.to_owned();
    let day_str   = encode_day(day);
    let at_str    = encode_dt(Utc::now());

    let inserted: bool = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "INSERT OR IGNORE INTO day_marks (scope, day, recorded_at)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![scope_str, day_str, at_str],
        )?;
        Ok(changed > 0)
      })
      .await?;

    Ok(inserted)
  }

  async fn purge_day_marks(&self, before: NaiveDate) -> Result<u64> {
    let before_str = encode_day(before);

    let removed: u64 = self
      .conn
      .call(move |conn| {
        let changed = conn.execute(
          "DELETE FROM day_marks WHERE day < ?1",
          rusqlite::params![before_str],
        )?;
        Ok(changed as u64)
      })
      .await?;

    Ok(removed)
  }
}
