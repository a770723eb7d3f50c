//! Line — a tracked prepaid phone subscription.
//!
//! A line stores the expiry date as the raw string it arrived with. The
//! expiry *status* is derived at read time (see [`crate::status`]) and is
//! never persisted, so it cannot go stale in storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// A tracked subscription line.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Line {
  pub line_id:        Uuid,
  pub person_name:    String,
  pub phone_number:   String,
  pub job_title:      Option<String>,
  pub workplace:      Option<String>,
  /// Package price in whole currency units.
  pub package_amount: Option<u32>,
  /// Raw expiry date string, `YYYY-MM-DD` expected but not enforced here.
  /// An unparseable value classifies as [`LineStatus::Unknown`], never an
  /// error.
  ///
  /// [`LineStatus::Unknown`]: crate::status::LineStatus::Unknown
  pub expiry_date:    String,
  /// Server-assigned timestamp; never changes after creation.
  pub created_at:     DateTime<Utc>,
}

/// Input to [`LineStore::create_line`] and [`LineStore::update_line`].
/// `line_id` and `created_at` are always assigned by the store.
///
/// [`LineStore::create_line`]: crate::store::LineStore::create_line
/// [`LineStore::update_line`]: crate::store::LineStore::update_line
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewLine {
  pub person_name:    String,
  pub phone_number:   String,
  #[serde(default)]
  pub job_title:      Option<String>,
  #[serde(default)]
  pub workplace:      Option<String>,
  #[serde(default)]
  pub package_amount: Option<u32>,
  pub expiry_date:    String,
}

impl NewLine {
  /// Validate the required-field contract and return a trimmed copy.
  ///
  /// Person name, phone number, and expiry date must be non-blank. Optional
  /// fields are trimmed; blank optionals collapse to `None`.
  pub fn validated(self) -> Result<Self> {
    let person_name = self.person_name.trim().to_owned();
    if person_name.is_empty() {
      return Err(Error::MissingField("person_name"));
    }

    let phone_number = self.phone_number.trim().to_owned();
    if phone_number.is_empty() {
      return Err(Error::MissingField("phone_number"));
    }

    let expiry_date = self.expiry_date.trim().to_owned();
    if expiry_date.is_empty() {
      return Err(Error::MissingField("expiry_date"));
    }

    Ok(Self {
      person_name,
      phone_number,
      job_title: trim_optional(self.job_title),
      workplace: trim_optional(self.workplace),
      package_amount: self.package_amount,
      expiry_date,
    })
  }
}

fn trim_optional(field: Option<String>) -> Option<String> {
  field
    .map(|s| s.trim().to_owned())
    .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
  use super::*;

  fn draft() -> NewLine {
    NewLine {
      person_name:    "Ahmed Salim".into(),
      phone_number:   "07701234567".into(),
      job_title:      Some("Teacher".into()),
      workplace:      None,
      package_amount: Some(15000),
      expiry_date:    "2026-09-15".into(),
    }
  }

  #[test]
  fn validated_accepts_complete_draft() {
    let line = draft().validated().unwrap();
    assert_eq!(line.person_name, "Ahmed Salim");
    assert_eq!(line.expiry_date, "2026-09-15");
  }

  #[test]
  fn validated_trims_whitespace() {
    let line = NewLine {
      person_name: "  Ahmed  ".into(),
      job_title: Some("   ".into()),
      ..draft()
    }
    .validated()
    .unwrap();
    assert_eq!(line.person_name, "Ahmed");
    assert_eq!(line.job_title, None);
  }

  #[test]
  fn validated_rejects_blank_required_fields() {
    let err = NewLine { person_name: " ".into(), ..draft() }
      .validated()
      .unwrap_err();
    assert!(matches!(err, Error::MissingField("person_name")));

    let err = NewLine { phone_number: String::new(), ..draft() }
      .validated()
      .unwrap_err();
    assert!(matches!(err, Error::MissingField("phone_number")));

    let err = NewLine { expiry_date: String::new(), ..draft() }
      .validated()
      .unwrap_err();
    assert!(matches!(err, Error::MissingField("expiry_date")));
  }
}
