//! JSON REST API for the Stride engine.
//!
//! Exposes an axum [`Router`] backed by an [`Engine`] over any
//! [`stride_core::store::ProgressStore`]. Auth, TLS, and transport concerns
//! are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", stride_api::api_router(engine.clone()))
//! ```

pub mod challenges;
pub mod error;
pub mod events;
pub mod habits;
pub mod marks;
pub mod metrics;
pub mod users;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post, put},
};
use stride_core::{Engine, store::ProgressStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Arc<Engine<S>>) -> Router<()>
where
  S: ProgressStore + 'static,
{
  Router::new()
    // Inbound activity events
    .route("/events/mood", post(events::log_mood::<S>))
    .route("/events/journal", post(events::log_journal::<S>))
    .route("/events/micro-session", post(events::micro_session::<S>))
    .route("/habits/{habit_id}/completion", put(habits::set_completion::<S>))
    .route("/metrics/daily", post(metrics::submit::<S>))
    // Challenges
    .route("/challenges", post(challenges::create::<S>))
    .route("/challenges/{id}/participants", post(challenges::join::<S>))
    .route("/challenges/{id}/leaderboard", get(challenges::leaderboard::<S>))
    .route("/participants/{id}/checkins", post(challenges::checkin::<S>))
    // Outbound queries
    .route("/users/{id}/streaks/{kind}", get(users::streak::<S>))
    .route("/users/{id}/profile", get(users::profile::<S>))
    .route("/users/{id}/achievements", get(users::achievements::<S>))
    .route("/users/{id}/scorecard", get(users::scorecard::<S>))
    // Collaborator-side once-per-day marks
    .route("/marks", post(marks::mark::<S>))
    .route("/marks/purge", post(marks::purge::<S>))
    .with_state(engine)
}
