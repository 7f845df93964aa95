//! Handlers for `/challenges` and `/participants` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/challenges` | Body: `{"name":"..."}`; returns 201 |
//! | `POST` | `/challenges/:id/participants` | Body: `{"user_id":"..."}`; idempotent |
//! | `GET`  | `/challenges/:id/leaderboard` | Ranked on read |
//! | `POST` | `/participants/:id/checkins` | Body: [`CheckinBody`] |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stride_core::{
  Engine,
  challenge::{
    Challenge, ChallengeCheckin, ChallengeParticipant, LeaderboardEntry,
  },
  store::ProgressStore,
};
use uuid::Uuid;

use crate::error::ApiError;

// ─── Create ──────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub name: String,
}

/// `POST /challenges`
pub async fn create<S>(
  State(engine): State<Arc<Engine<S>>>,
  Json(body): Json<CreateBody>,
) -> Result<impl IntoResponse, ApiError>
where
  S: ProgressStore,
{
  let challenge: Challenge = engine.create_challenge(body.name).await?;
  Ok((StatusCode::CREATED, Json(challenge)))
}

// ─── Join ────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct JoinBody {
  pub user_id: Uuid,
}

/// `POST /challenges/:id/participants` — idempotent per `(challenge, user)`.
pub async fn join<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(challenge_id): Path<Uuid>,
  Json(body): Json<JoinBody>,
) -> Result<Json<ChallengeParticipant>, ApiError>
where
  S: ProgressStore,
{
  let participant = engine.join_challenge(challenge_id, body.user_id).await?;
  Ok(Json(participant))
}

// ─── Check-in ────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct CheckinBody {
  pub date:      NaiveDate,
  pub completed: bool,
  pub notes:     Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckinResponse {
  pub checkin:     ChallengeCheckin,
  pub participant: ChallengeParticipant,
}

/// `POST /participants/:id/checkins` — upsert by `(participant, date)`.
pub async fn checkin<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(participant_id): Path<Uuid>,
  Json(body): Json<CheckinBody>,
) -> Result<Json<CheckinResponse>, ApiError>
where
  S: ProgressStore,
{
  let (checkin, participant) = engine
    .challenge_checkin(participant_id, body.date, body.completed, body.notes)
    .await?;
  Ok(Json(CheckinResponse { checkin, participant }))
}

// ─── Leaderboard ─────────────────────────────────────────────────────────────

/// `GET /challenges/:id/leaderboard`
pub async fn leaderboard<S>(
  State(engine): State<Arc<Engine<S>>>,
  Path(challenge_id): Path<Uuid>,
) -> Result<Json<Vec<LeaderboardEntry>>, ApiError>
where
  S: ProgressStore,
{
  let entries = engine.challenge_leaderboard(challenge_id).await?;
  Ok(Json(entries))
}
