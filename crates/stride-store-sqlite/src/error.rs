//! Error type for `stride-store-sqlite`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] stride_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  /// A stored string failed to decode back into its domain type.
  #[error("decode error: {0}")]
  Decode(String),

  #[error("challenge not found: {0}")]
  ChallengeNotFound(Uuid),

  #[error("participant not found: {0}")]
  ParticipantNotFound(Uuid),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
