//! Calendar normalization — the leaf dependency of all streak and scorecard
//! math.
//!
//! Every event timestamp is collapsed to a calendar day under a single
//! [`DayPolicy`] chosen once at engine construction. Two events in the same
//! logical day must normalize to the same day key; call sites never pick
//! their own timezone handling.

use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Utc};

// ─── Day policy ──────────────────────────────────────────────────────────────

/// The global rule for where a calendar day begins and ends.
///
/// [`DayPolicy::Utc`] is the canonical default. [`DayPolicy::Fixed`] exists
/// for single-market deployments that want day boundaries in local time.
/// There is deliberately no per-user variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DayPolicy {
  #[default]
  Utc,
  Fixed(FixedOffset),
}

impl DayPolicy {
  /// Normalize a timestamp to its calendar day under this policy.
  /// Total and deterministic for any valid timestamp.
  pub fn day_of(&self, ts: DateTime<Utc>) -> NaiveDate {
    match self {
      Self::Utc => ts.date_naive(),
      Self::Fixed(offset) => ts.with_timezone(offset).date_naive(),
    }
  }

  /// The current calendar day under this policy.
  pub fn today(&self) -> NaiveDate { self.day_of(Utc::now()) }
}

// ─── Week anchoring ──────────────────────────────────────────────────────────

/// The Monday that starts the ISO week containing `day`.
/// Independent of locale week-start conventions.
pub fn week_start_for(day: NaiveDate) -> NaiveDate {
  day - Duration::days(i64::from(day.weekday().num_days_from_monday()))
}

/// The Sunday that ends the ISO week starting at `week_start`.
pub fn week_end_for(week_start: NaiveDate) -> NaiveDate {
  week_start + Duration::days(6)
}

#[cfg(test)]
mod tests {
  use chrono::TimeZone;

  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn utc_policy_truncates_to_utc_day() {
    let ts = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap();
    assert_eq!(DayPolicy::Utc.day_of(ts), date(2026, 3, 14));
  }

  #[test]
  fn fixed_offset_can_shift_the_day() {
    // 23:30 UTC is already the next day at UTC+5.
    let ts = Utc.with_ymd_and_hms(2026, 3, 14, 23, 30, 0).unwrap();
    let plus_five = DayPolicy::Fixed(FixedOffset::east_opt(5 * 3600).unwrap());
    assert_eq!(plus_five.day_of(ts), date(2026, 3, 15));

    // ...and still the previous day at UTC-2.
    let minus_two = DayPolicy::Fixed(FixedOffset::west_opt(2 * 3600).unwrap());
    let early = Utc.with_ymd_and_hms(2026, 3, 14, 1, 0, 0).unwrap();
    assert_eq!(minus_two.day_of(early), date(2026, 3, 13));
  }

  #[test]
  fn same_logical_day_normalizes_identically() {
    let morning = Utc.with_ymd_and_hms(2026, 3, 14, 0, 0, 1).unwrap();
    let night = Utc.with_ymd_and_hms(2026, 3, 14, 23, 59, 59).unwrap();
    assert_eq!(DayPolicy::Utc.day_of(morning), DayPolicy::Utc.day_of(night));
  }

  #[test]
  fn week_start_is_monday() {
    // 2026-08-05 is a Wednesday.
    assert_eq!(week_start_for(date(2026, 8, 5)), date(2026, 8, 3));
    // A Monday is its own week start.
    assert_eq!(week_start_for(date(2026, 8, 3)), date(2026, 8, 3));
    // A Sunday belongs to the week that started six days earlier.
    assert_eq!(week_start_for(date(2026, 8, 9)), date(2026, 8, 3));
  }

  #[test]
  fn week_end_is_six_days_after_start() {
    assert_eq!(week_end_for(date(2026, 8, 3)), date(2026, 8, 9));
  }
}
