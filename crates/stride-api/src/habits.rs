//! Handler for `PUT /habits/:habit_id/completion`.
//!
//! The toggle is an upsert on `(user, habit, day)`; submitting
//! `completed = false` clears the day without deleting the row.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stride_core::{
  Engine,
  achievement::Achievement,
  activity::HabitCompletion,
  store::ProgressStore,
};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ToggleBody {
  pub user_id:     Uuid,
  pub completed:   bool,
  /// Defaults to the arrival time; the engine's day policy picks the day.
  pub occurred_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ToggleResponse {
  pub completion:   HabitCompletion,
  pub newly_earned: Vec<Achievement>,
}

/// `PUT /habits/:habit_id/completion`
pub async fn set_completion<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(habit_id): Path<Uuid>,
  Json(body): Json<ToggleBody>,
) -> Result<Json<ToggleResponse>, ApiError>
where
  S: ProgressStore,
{
  let occurred_at = body.occurred_at.unwrap_or_else(Utc::now);
  let (completion, newly_earned) = engine
    .toggle_habit(body.user_id, habit_id, occurred_at, body.completed)
    .await?;
  Ok(Json(ToggleResponse { completion, newly_earned }))
}
