//! Handler for `POST /metrics/daily` — the daily check-in.

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stride_core::{
  Engine,
  achievement::Achievement,
  activity::{DailyMetrics, MetricValues},
  store::ProgressStore,
  xp::{GamificationProfile, XpTransaction},
};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct SubmitBody {
  pub user_id:     Uuid,
  pub occurred_at: Option<DateTime<Utc>>,
  #[serde(flatten)]
  pub values:      MetricValues,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
  pub metrics:      DailyMetrics,
  /// Absent when the day's check-in XP was already paid out.
  pub xp:           Option<XpTransaction>,
  pub profile:      GamificationProfile,
  pub newly_earned: Vec<Achievement>,
}

/// `POST /metrics/daily` — upserts the day's row, pays the check-in XP at
/// most once per day, and reports any newly unlocked achievements.
pub async fn submit<S>(
  State(engine): State<Arc<Engine<S>>>,
  Json(body): Json<SubmitBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let occurred_at = body.occurred_at.unwrap_or_else(Utc::now);
  let outcome = engine
    .submit_daily_metrics(body.user_id, occurred_at, body.values)
    .await?;
  Ok((
    StatusCode::CREATED,
    Json(SubmitResponse {
      metrics:      outcome.metrics,
      xp:           outcome.xp,
      profile:      outcome.profile,
      newly_earned: outcome.newly_earned,
    }),
  ))
}
