//! Expiry classification — the derived status of a line.
//!
//! Status is computed from the stored expiry string and an injected
//! reference date, never persisted. Classification is day-granular and
//! total: malformed input maps to [`LineStatus::Unknown`], it never fails.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of days out at which a line counts as expiring soon (inclusive).
pub const EXPIRING_SOON_WINDOW_DAYS: i64 = 7;

/// The expiry state of a line relative to a reference date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LineStatus {
  Active,
  ExpiringSoon,
  Expired,
  Unknown,
}

/// Classify an expiry date against `today`.
///
/// - absent or blank date → `Unknown`
/// - unparseable date → `Unknown`
/// - strictly in the past → `Expired`
/// - within [`EXPIRING_SOON_WINDOW_DAYS`] days, inclusive → `ExpiringSoon`
///   (today itself counts)
/// - otherwise → `Active`
pub fn classify(expiry_date: Option<&str>, today: NaiveDate) -> LineStatus {
  let Some(raw) = expiry_date.map(str::trim).filter(|s| !s.is_empty()) else {
    return LineStatus::Unknown;
  };

  let Some(expiry) = parse_expiry(raw) else {
    return LineStatus::Unknown;
  };

  let diff_days = (expiry - today).num_days();
  if diff_days < 0 {
    LineStatus::Expired
  } else if diff_days <= EXPIRING_SOON_WINDOW_DAYS {
    LineStatus::ExpiringSoon
  } else {
    LineStatus::Active
  }
}

/// Parse a stored expiry string as a calendar date (`YYYY-MM-DD`).
pub fn parse_expiry(raw: &str) -> Option<NaiveDate> {
  NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

#[cfg(test)]
mod tests {
  use chrono::Days;

  use super::*;

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
  }

  fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
  }

  #[test]
  fn absent_date_is_unknown() {
    assert_eq!(classify(None, today()), LineStatus::Unknown);
    assert_eq!(classify(Some(""), today()), LineStatus::Unknown);
    assert_eq!(classify(Some("   "), today()), LineStatus::Unknown);
  }

  #[test]
  fn unparseable_date_is_unknown() {
    assert_eq!(classify(Some("not-a-date"), today()), LineStatus::Unknown);
    assert_eq!(classify(Some("2026-13-40"), today()), LineStatus::Unknown);
    assert_eq!(classify(Some("15/03/2026"), today()), LineStatus::Unknown);
  }

  #[test]
  fn past_date_is_expired() {
    let yesterday = today() - Days::new(1);
    assert_eq!(classify(Some(&ymd(yesterday)), today()), LineStatus::Expired);
  }

  #[test]
  fn today_counts_as_expiring_soon() {
    assert_eq!(classify(Some(&ymd(today())), today()), LineStatus::ExpiringSoon);
  }

  #[test]
  fn window_boundary_is_inclusive() {
    let seven_out = today() + Days::new(7);
    let eight_out = today() + Days::new(8);
    assert_eq!(classify(Some(&ymd(seven_out)), today()), LineStatus::ExpiringSoon);
    assert_eq!(classify(Some(&ymd(eight_out)), today()), LineStatus::Active);
  }

  #[test]
  fn far_future_is_active() {
    assert_eq!(classify(Some("2030-01-01"), today()), LineStatus::Active);
  }

  #[test]
  fn classification_is_pure() {
    let date = Some("2026-03-12");
    let first = classify(date, today());
    let second = classify(date, today());
    assert_eq!(first, second);
  }

  #[test]
  fn wire_form_is_screaming_snake_case() {
    let json = serde_json::to_string(&LineStatus::ExpiringSoon).unwrap();
    assert_eq!(json, "\"EXPIRING_SOON\"");
  }
}
