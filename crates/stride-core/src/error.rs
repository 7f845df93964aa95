//! Error types for `stride-core`.

use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum Error {
  #[error("xp amount must be positive, got {0}")]
  InvalidXpAmount(i64),

  #[error("metric {field} out of range: {value}")]
  MetricOutOfRange { field: &'static str, value: f64 },

  #[error("challenge not found: {0}")]
  ChallengeNotFound(Uuid),

  #[error("participant not found: {0}")]
  ParticipantNotFound(Uuid),

  #[error("unknown achievement id: {0:?}")]
  UnknownAchievement(String),

  #[error("unknown activity kind: {0:?}")]
  UnknownActivityKind(String),

  #[error("unknown xp source: {0:?}")]
  UnknownXpSource(String),

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Wrap a backend error so engine callers see one error type.
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }

  /// True for errors the caller caused (maps to 400 at the HTTP layer).
  pub fn is_invalid(&self) -> bool {
    matches!(
      self,
      Self::InvalidXpAmount(_)
        | Self::MetricOutOfRange { .. }
        | Self::UnknownAchievement(_)
        | Self::UnknownActivityKind(_)
        | Self::UnknownXpSource(_)
    )
  }

  /// True for missing-resource errors (maps to 404 at the HTTP layer).
  pub fn is_not_found(&self) -> bool {
    matches!(self, Self::ChallengeNotFound(_) | Self::ParticipantNotFound(_))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
