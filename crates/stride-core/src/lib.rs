//! Core types and logic for the Stride progress & gamification engine.
//!
//! This crate is deliberately free of HTTP and database dependencies.
//! All other crates depend on it; it depends on nothing proprietary.
//!
//! The engine turns raw, independently-timestamped activity events into
//! derived progress signals: consecutive-day streaks, an XP ledger with a
//! leveling curve, idempotent achievement awards, Monday-anchored weekly
//! scorecards, and challenge leaderboards.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod achievement;
pub mod activity;
pub mod calendar;
pub mod challenge;
pub mod engine;
pub mod error;
pub mod scorecard;
pub mod store;
pub mod streak;
pub mod xp;

pub use engine::Engine;
pub use error::{Error, Result};
