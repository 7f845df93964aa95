//! Consecutive-day streak computation.
//!
//! Streaks are always recomputed in full from the authoritative set of
//! activity days — never incremented in place — so they cannot drift from
//! the facts they are derived from.

use std::collections::BTreeSet;

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Current and longest consecutive-day streak for one activity type.
/// Computed on read, never persisted.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct StreakState {
  pub current: u32,
  pub longest: u32,
}

/// Compute the streak state over an unordered set of activity days.
///
/// `current` counts backwards from `today`. A streak survives only if the
/// most recent activity day is `today` or yesterday; anything older means
/// `current == 0` no matter how long the history is. `longest` is the
/// longest run of consecutive days anywhere in the history, so
/// `longest >= current` always holds.
pub fn compute(days: &[NaiveDate], today: NaiveDate) -> StreakState {
  let days: BTreeSet<NaiveDate> = days.iter().copied().collect();
  if days.is_empty() {
    return StreakState::default();
  }

  // The streak anchor is today if active today, otherwise yesterday.
  let yesterday = today - Duration::days(1);
  let anchor = if days.contains(&today) {
    Some(today)
  } else if days.contains(&yesterday) {
    Some(yesterday)
  } else {
    None
  };

  let mut current = 0u32;
  if let Some(mut cursor) = anchor {
    while days.contains(&cursor) {
      current += 1;
      cursor = cursor - Duration::days(1);
    }
  }

  // Longest run anywhere in the (sorted, deduplicated) history.
  let mut longest = 0u32;
  let mut run = 0u32;
  let mut prev: Option<NaiveDate> = None;
  for &day in &days {
    run = match prev {
      Some(p) if day == p + Duration::days(1) => run + 1,
      _ => 1,
    };
    longest = longest.max(run);
    prev = Some(day);
  }

  StreakState { current, longest }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn empty_history_is_zero() {
    let today = date(2026, 8, 5);
    assert_eq!(compute(&[], today), StreakState::default());
  }

  #[test]
  fn mon_tue_wed_with_today_wed() {
    // 2026-08-03 is a Monday.
    let days = [date(2026, 8, 3), date(2026, 8, 4), date(2026, 8, 5)];
    let state = compute(&days, date(2026, 8, 5));
    assert_eq!(state, StreakState { current: 3, longest: 3 });
  }

  #[test]
  fn missed_day_zeroes_current_but_keeps_longest() {
    // Same history, but Thursday has passed with no activity.
    let days = [date(2026, 8, 3), date(2026, 8, 4), date(2026, 8, 5)];
    let state = compute(&days, date(2026, 8, 7));
    assert_eq!(state, StreakState { current: 0, longest: 3 });
  }

  #[test]
  fn yesterday_still_counts() {
    // No activity yet today; the streak ending yesterday is still alive.
    let days = [date(2026, 8, 3), date(2026, 8, 4)];
    let state = compute(&days, date(2026, 8, 5));
    assert_eq!(state, StreakState { current: 2, longest: 2 });
  }

  #[test]
  fn duplicates_do_not_inflate() {
    let days = [date(2026, 8, 4), date(2026, 8, 4), date(2026, 8, 5)];
    let state = compute(&days, date(2026, 8, 5));
    assert_eq!(state, StreakState { current: 2, longest: 2 });
  }

  #[test]
  fn longest_run_can_be_in_the_past() {
    let days = [
      date(2026, 7, 1),
      date(2026, 7, 2),
      date(2026, 7, 3),
      date(2026, 7, 4),
      date(2026, 8, 5),
    ];
    let state = compute(&days, date(2026, 8, 5));
    assert_eq!(state, StreakState { current: 1, longest: 4 });
  }

  #[test]
  fn longest_is_never_below_current() {
    // Exhaustive-ish sweep over small day sets around a fixed today.
    let today = date(2026, 8, 5);
    let pool: Vec<NaiveDate> =
      (0..10).map(|n| today - Duration::days(n)).collect();
    for mask in 0u32..(1 << pool.len()) {
      let days: Vec<NaiveDate> = pool
        .iter()
        .enumerate()
        .filter(|(i, _)| mask & (1 << i) != 0)
        .map(|(_, d)| *d)
        .collect();
      let state = compute(&days, today);
      assert!(state.longest >= state.current, "mask {mask:#b}");
    }
  }
}
