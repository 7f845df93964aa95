//! SQLite backend for the Stride progress store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! pool without blocking the async runtime. Writes that touch more than one
//! row (XP awards, challenge check-ins) run inside a single SQLite
//! transaction on that thread, which also serializes read-modify-write
//! counter updates per connection.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;

#[cfg(test)]
mod tests;
