//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings, UUIDs as hyphenated lowercase
//! strings. The expiry date column is passed through untouched in both
//! directions — the domain treats it as an opaque string.

use chrono::{DateTime, Utc};
use khatt_core::{line::Line, subscription::Subscription};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw strings read directly from a `lines` row.
pub struct RawLine {
  pub line_id:        String,
  pub person_name:    String,
  pub phone_number:   String,
  pub job_title:      Option<String>,
  pub workplace:      Option<String>,
  pub package_amount: Option<u32>,
  pub expiry_date:    String,
  pub created_at:     String,
}

impl RawLine {
  /// Column list matching the field order expected by [`RawLine::from_row`].
  pub const COLUMNS: &'static str = "line_id, person_name, phone_number, \
     job_title, workplace, package_amount, expiry_date, created_at";

  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      line_id:        row.get(0)?,
      person_name:    row.get(1)?,
      phone_number:   row.get(2)?,
      job_title:      row.get(3)?,
      workplace:      row.get(4)?,
      package_amount: row.get(5)?,
      expiry_date:    row.get(6)?,
      created_at:     row.get(7)?,
    })
  }

  pub fn into_line(self) -> Result<Line> {
    Ok(Line {
      line_id:        decode_uuid(&self.line_id)?,
      person_name:    self.person_name,
      phone_number:   self.phone_number,
      job_title:      self.job_title,
      workplace:      self.workplace,
      package_amount: self.package_amount,
      expiry_date:    self.expiry_date,
      created_at:     decode_dt(&self.created_at)?,
    })
  }
}

/// Raw strings read directly from a `push_subscriptions` row.
pub struct RawSubscription {
  pub endpoint: String,
  pub auth:     String,
  pub p256dh:   String,
}

impl RawSubscription {
  pub fn into_subscription(self) -> Subscription {
    Subscription {
      endpoint: self.endpoint,
      auth:     self.auth,
      p256dh:   self.p256dh,
    }
  }
}
