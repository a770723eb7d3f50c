//! One-month renewal with calendar-edge handling.

use chrono::{Months, NaiveDate};

use crate::status::parse_expiry;

/// Compute the expiry date after a one-month renewal.
///
/// Adds one calendar month to the stored date, clamping to the last valid
/// day when the target month is shorter (Jan 31 → Feb 28/29). If the stored
/// date does not parse, the renewal heals it to one month from `today`
/// instead; callers that want to surface the repair should check
/// [`parse_expiry`] first.
///
/// `today` is injected so the fallback branch stays reproducible in tests.
pub fn renew_one_month(expiry_date: &str, today: NaiveDate) -> NaiveDate {
  let base = parse_expiry(expiry_date).unwrap_or(today);
  // checked_add_months clamps end-of-month overflow; one month past any
  // representable date stays in range, so the None branch is unreachable.
  base.checked_add_months(Months::new(1)).unwrap_or(base)
}

#[cfg(test)]
mod tests {
  use super::*;

  fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
  }

  #[test]
  fn plain_month_advance() {
    assert_eq!(
      renew_one_month("2024-03-15", date(2024, 3, 1)),
      date(2024, 4, 15)
    );
  }

  #[test]
  fn clamps_into_leap_february() {
    assert_eq!(
      renew_one_month("2024-01-31", date(2024, 1, 1)),
      date(2024, 2, 29)
    );
  }

  #[test]
  fn clamps_into_short_february() {
    assert_eq!(
      renew_one_month("2023-01-31", date(2023, 1, 1)),
      date(2023, 2, 28)
    );
  }

  #[test]
  fn clamps_thirty_one_to_thirty() {
    assert_eq!(
      renew_one_month("2026-05-31", date(2026, 5, 1)),
      date(2026, 6, 30)
    );
  }

  #[test]
  fn december_rolls_into_next_year() {
    assert_eq!(
      renew_one_month("2025-12-31", date(2025, 12, 1)),
      date(2026, 1, 31)
    );
  }

  #[test]
  fn unparseable_date_falls_back_to_today_plus_one_month() {
    assert_eq!(
      renew_one_month("garbage", date(2026, 1, 31)),
      date(2026, 2, 28)
    );
  }
}
