//! Handlers for `/users/:id/*` read endpoints. All pure reads; the only
//! write is the scorecard upsert, which is an idempotent recomputation.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stride_core::{
  Engine,
  achievement::AchievementAward,
  activity::ActivityKind,
  scorecard::WeeklyScorecard,
  store::ProgressStore,
  streak::StreakState,
  xp::GamificationProfile,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Streaks ─────────────────────────────────────────────────────────────────

/// `GET /users/:id/streaks/:kind` — kind is a snake_case
/// [`ActivityKind`] discriminant, e.g. `habit_completion`.
pub async fn streak<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path((user_id, kind)): Path<(Uuid, String)>,
) -> Result<Json<StreakState>, ApiError>
where
  S: ProgressStore,
{
  let kind = ActivityKind::from_discriminant(&kind)?;
  let state = engine.streak(user_id, kind).await?;
  Ok(Json(state))
}

// ─── Profile ─────────────────────────────────────────────────────────────────

/// `GET /users/:id/profile` — users with no XP yet get the level-1 default.
pub async fn profile<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<GamificationProfile>, ApiError>
where
  S: ProgressStore,
{
  let profile = engine.profile(user_id).await?;
  Ok(Json(profile))
}

// ─── Achievements ────────────────────────────────────────────────────────────

/// An award enriched with its display title.
#[derive(Debug, Serialize)]
pub struct AwardView {
  #[serde(flatten)]
  pub award: AchievementAward,
  pub title: &'static str,
}

/// `GET /users/:id/achievements`
pub async fn achievements<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user_id): Path<Uuid>,
) -> Result<Json<Vec<AwardView>>, ApiError>
where
  S: ProgressStore,
{
  let awards = engine.achievements(user_id).await?;
  let views = awards
    .into_iter()
    .map(|award| AwardView { title: award.achievement.title(), award })
    .collect();
  Ok(Json(views))
}

// ─── Scorecard ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScorecardParams {
  /// Any date inside the wanted week; normalized to its Monday.
  pub week_start: NaiveDate,
}

/// `GET /users/:id/scorecard?week_start=YYYY-MM-DD`
pub async fn scorecard<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(user_id): Path<Uuid>,
  Query(params): Query<ScorecardParams>,
) -> Result<Json<WeeklyScorecard>, ApiError>
where
  S: ProgressStore,
{
  let card = engine.weekly_scorecard(user_id, params.week_start).await?;
  Ok(Json(card))
}
