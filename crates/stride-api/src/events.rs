//! Handlers for `/events` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/events/mood` | Body: [`EventBody`]; returns 201 + [`EventResponse`] |
//! | `POST` | `/events/journal` | Same shape |
//! | `POST` | `/events/micro-session` | Same shape, payload ignored |

use std::sync::Arc;

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use stride_core::{
  Engine,
  achievement::Achievement,
  activity::ActivityEvent,
  store::ProgressStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// JSON body accepted by the event endpoints. `occurred_at` defaults to the
/// arrival time when omitted.
#[derive(Debug, Deserialize)]
pub struct EventBody {
  pub user_id:     Uuid,
  pub occurred_at: Option<DateTime<Utc>>,
  #[serde(default)]
  pub payload:     serde_json::Value,
}

/// The stored event plus any achievements it unlocked.
#[derive(Debug, Serialize)]
pub struct EventResponse {
  pub event:        ActivityEvent,
  pub newly_earned: Vec<Achievement>,
}

/// `POST /events/mood`
pub async fn log_mood<S>(
  State(engine): State<Arc<Engine<S>>>,
  Json(body): Json<EventBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let occurred_at = body.occurred_at.unwrap_or_else(Utc::now);
  let (event, newly_earned) = engine
    .log_mood(body.user_id, occurred_at, body.payload)
    .await?;
  Ok((StatusCode::CREATED, Json(EventResponse { event, newly_earned })))
}

/// `POST /events/journal`
pub async fn log_journal<S>(
  State(engine): State<Arc<Engine<S>>>,
  Json(body): Json<EventBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let occurred_at = body.occurred_at.unwrap_or_else(Utc::now);
  let (event, newly_earned) = engine
    .log_journal_entry(body.user_id, occurred_at, body.payload)
    .await?;
  Ok((StatusCode::CREATED, Json(EventResponse { event, newly_earned })))
}

/// `POST /events/micro-session`
pub async fn micro_session<S>(
  State(engine): State<Arc<Engine<S>>>,
  Json(body): Json<EventBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let occurred_at = body.occurred_at.unwrap_or_else(Utc::now);
  let (event, newly_earned) = engine
    .complete_micro_session(body.user_id, occurred_at)
    .await?;
  Ok((StatusCode::CREATED, Json(EventResponse { event, newly_earned })))
}
