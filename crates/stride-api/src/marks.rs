//! Handlers for `/marks` — the durable once-per-day gate used by
//! collaborator jobs (e.g. the reminder scheduler) in place of a
//! process-lifetime "already sent" set.

use std::sync::Arc;

use axum::{Json, extract::State};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use stride_core::{Engine, store::ProgressStore};

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct MarkBody {
  pub scope: String,
  pub day:   NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct MarkResponse {
  /// `true` only for the first mark of `(scope, day)`; callers skip their
  /// side effect when `false`.
  pub newly_marked: bool,
}

/// `POST /marks`
pub async fn mark<S>(
  State(engine): State<Arc<Engine<S>>>,
  Json(body): Json<MarkBody>,
) -> Result<Json<MarkResponse>, ApiError>
where
  S: ProgressStore,
{
  let newly_marked = engine.mark_day(&body.scope, body.day).await?;
  Ok(Json(MarkResponse { newly_marked }))
}

#[derive(Debug, Deserialize)]
pub struct PurgeBody {
  /// Marks strictly older than this day are deleted.
  pub before: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct PurgeResponse {
  pub removed: u64,
}

/// `POST /marks/purge`
pub async fn purge<S>(
  State(engine): State<Arc<Engine<S>>>,
  Json(body): Json<PurgeBody>,
) -> Result<Json<PurgeResponse>, ApiError>
where
  S: ProgressStore,
{
  let removed = engine.purge_day_marks(body.before).await?;
  Ok(Json(PurgeResponse { removed }))
}
