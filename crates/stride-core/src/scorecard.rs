//! Weekly scorecard aggregation.
//!
//! A scorecard is a Monday-anchored rollup of one user's daily metrics.
//! It is a recomputable projection: safe to rebuild and overwrite at any
//! time, because every field is derived by aggregation over the
//! authoritative daily rows.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::activity::DailyMetrics;

/// One row per `(user, week_start)`, where `week_start` is always a Monday.
///
/// Averages are over the days that actually logged the field; a week with
/// zero logged values for a field yields `None`, not zero.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeeklyScorecard {
  pub user_id:                Uuid,
  pub week_start:             NaiveDate,
  pub avg_mood:               Option<f64>,
  pub avg_energy:             Option<f64>,
  pub avg_stress:             Option<f64>,
  pub avg_sleep_hours:        Option<f64>,
  pub avg_sleep_quality:      Option<f64>,
  pub total_habits_completed: u32,
}

/// Mean over the present values, or `None` if nothing was logged.
fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
  let values: Vec<f64> = values.collect();
  if values.is_empty() {
    None
  } else {
    Some(values.iter().sum::<f64>() / values.len() as f64)
  }
}

/// Aggregate the metric rows of one week into a scorecard.
///
/// `rows` must already be restricted to `[week_start, week_start + 6]`;
/// `habits_completed` is the completion count over the same window.
/// Deterministic, so recomputation is idempotent.
pub fn aggregate_rows(
  user_id: Uuid,
  week_start: NaiveDate,
  rows: &[DailyMetrics],
  habits_completed: u32,
) -> WeeklyScorecard {
  WeeklyScorecard {
    user_id,
    week_start,
    avg_mood: mean(rows.iter().filter_map(|r| r.mood).map(f64::from)),
    avg_energy: mean(rows.iter().filter_map(|r| r.energy).map(f64::from)),
    avg_stress: mean(rows.iter().filter_map(|r| r.stress).map(f64::from)),
    avg_sleep_hours: mean(rows.iter().filter_map(|r| r.sleep_hours)),
    avg_sleep_quality: mean(
      rows.iter().filter_map(|r| r.sleep_quality).map(f64::from),
    ),
    total_habits_completed: habits_completed,
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  fn row(day: NaiveDate, mood: Option<i32>, sleep: Option<f64>) -> DailyMetrics {
    DailyMetrics {
      user_id: Uuid::nil(),
      day,
      mood,
      energy: None,
      stress: None,
      sleep_hours: sleep,
      sleep_quality: None,
    }
  }

  #[test]
  fn unlogged_fields_stay_null() {
    let monday = date(2026, 8, 3);
    let rows = vec![
      row(monday, Some(6), None),
      row(date(2026, 8, 4), Some(8), None),
    ];

    let card = aggregate_rows(Uuid::nil(), monday, &rows, 3);
    assert_eq!(card.avg_mood, Some(7.0));
    assert_eq!(card.avg_sleep_hours, None);
    assert_eq!(card.avg_energy, None);
    assert_eq!(card.total_habits_completed, 3);
  }

  #[test]
  fn averages_skip_missing_days_not_zero_them() {
    let monday = date(2026, 8, 3);
    // Sleep logged on only one of three days; the average is over that day.
    let rows = vec![
      row(monday, Some(4), Some(8.0)),
      row(date(2026, 8, 4), Some(6), None),
      row(date(2026, 8, 5), None, None),
    ];

    let card = aggregate_rows(Uuid::nil(), monday, &rows, 0);
    assert_eq!(card.avg_mood, Some(5.0));
    assert_eq!(card.avg_sleep_hours, Some(8.0));
  }

  #[test]
  fn empty_week_is_all_null() {
    let card = aggregate_rows(Uuid::nil(), date(2026, 8, 3), &[], 0);
    assert_eq!(card.avg_mood, None);
    assert_eq!(card.avg_energy, None);
    assert_eq!(card.avg_stress, None);
    assert_eq!(card.avg_sleep_hours, None);
    assert_eq!(card.avg_sleep_quality, None);
    assert_eq!(card.total_habits_completed, 0);
  }

  #[test]
  fn recomputation_is_idempotent() {
    let monday = date(2026, 8, 3);
    let rows = vec![row(monday, Some(6), Some(7.5))];
    let first = aggregate_rows(Uuid::nil(), monday, &rows, 2);
    let second = aggregate_rows(Uuid::nil(), monday, &rows, 2);
    assert_eq!(first, second);
  }
}
