//! [`SqliteStore`] — the SQLite implementation of [`LineStore`] and
//! [`SubscriptionStore`].

use std::path::Path;

use chrono::{NaiveDate, Utc};
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use khatt_core::{
  line::{Line, NewLine},
  store::{LineStore, SubscriptionStore},
  subscription::{NewSubscription, Subscription},
};

use crate::{
  Error, Result,
  encode::{RawLine, RawSubscription, encode_dt, encode_uuid},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A khatt store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. All
/// statements run one at a time on the connection's worker thread, so
/// concurrent readers and writers never observe a torn row.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Fetch one line row by its encoded id.
  async fn fetch_line(&self, id_str: String) -> Result<Option<Line>> {
    let sql = format!(
      "SELECT {} FROM lines WHERE line_id = ?1",
      RawLine::COLUMNS
    );

    let raw: Option<RawLine> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(&sql, rusqlite::params![id_str], RawLine::from_row)
            .optional()?,
        )
      })
      .await?;

    raw.map(RawLine::into_line).transpose()
  }
}

// ─── LineStore impl ──────────────────────────────────────────────────────────

impl LineStore for SqliteStore {
  type Error = Error;

  async fn list_lines(&self) -> Result<Vec<Line>> {
    // date() of a non-date is NULL, which sorts first; rowid preserves
    // insertion order for equal dates.
    let sql = format!(
      "SELECT {} FROM lines ORDER BY date(expiry_date) ASC, rowid ASC",
      RawLine::COLUMNS
    );

    let raws: Vec<RawLine> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
          .query_map([], RawLine::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawLine::into_line).collect()
  }

  async fn get_line(&self, id: Uuid) -> Result<Option<Line>> {
    self.fetch_line(encode_uuid(id)).await
  }

  async fn create_line(&self, input: NewLine) -> Result<Line> {
    let input = input.validated()?;

    let line = Line {
      line_id:        Uuid::new_v4(),
      person_name:    input.person_name,
      phone_number:   input.phone_number,
      job_title:      input.job_title,
      workplace:      input.workplace,
      package_amount: input.package_amount,
      expiry_date:    input.expiry_date,
      created_at:     Utc::now(),
    };

    let id_str = encode_uuid(line.line_id);
    let at_str = encode_dt(line.created_at);
    let row    = line.clone();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO lines (
             line_id, person_name, phone_number, job_title, workplace,
             package_amount, expiry_date, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            row.person_name,
            row.phone_number,
            row.job_title,
            row.workplace,
            row.package_amount,
            row.expiry_date,
            at_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    Ok(line)
  }

  async fn update_line(&self, id: Uuid, input: NewLine) -> Result<Line> {
    let input  = input.validated()?;
    let id_str = encode_uuid(id);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE lines
           SET person_name = ?1, phone_number = ?2, job_title = ?3,
               workplace = ?4, package_amount = ?5, expiry_date = ?6
           WHERE line_id = ?7",
          rusqlite::params![
            input.person_name,
            input.phone_number,
            input.job_title,
            input.workplace,
            input.package_amount,
            input.expiry_date,
            id_str,
          ],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::LineNotFound(id));
    }

    self
      .fetch_line(encode_uuid(id))
      .await?
      .ok_or(Error::LineNotFound(id))
  }

  async fn set_expiry(&self, id: Uuid, new_date: NaiveDate) -> Result<Line> {
    let id_str   = encode_uuid(id);
    let date_str = new_date.format("%Y-%m-%d").to_string();

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE lines SET expiry_date = ?1 WHERE line_id = ?2",
          rusqlite::params![date_str, id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::LineNotFound(id));
    }

    self
      .fetch_line(encode_uuid(id))
      .await?
      .ok_or(Error::LineNotFound(id))
  }

  async fn delete_line(&self, id: Uuid) -> Result<()> {
    let id_str = encode_uuid(id);

    let changed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM lines WHERE line_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(Error::LineNotFound(id));
    }
    Ok(())
  }
}

// ─── SubscriptionStore impl ──────────────────────────────────────────────────

impl SubscriptionStore for SqliteStore {
  type Error = Error;

  async fn add_subscription(&self, input: NewSubscription) -> Result<bool> {
    // INSERT OR IGNORE makes registration idempotent in a single statement;
    // changes() distinguishes a fresh insert from the duplicate no-op.
    let added: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "INSERT OR IGNORE INTO push_subscriptions (endpoint, auth, p256dh)
           VALUES (?1, ?2, ?3)",
          rusqlite::params![input.endpoint, input.auth, input.p256dh],
        )?)
      })
      .await?;

    Ok(added > 0)
  }

  async fn list_subscriptions(&self) -> Result<Vec<Subscription>> {
    let raws: Vec<RawSubscription> = self
      .conn
      .call(|conn| {
        let mut stmt =
          conn.prepare("SELECT endpoint, auth, p256dh FROM push_subscriptions")?;
        let rows = stmt
          .query_map([], |row| {
            Ok(RawSubscription {
              endpoint: row.get(0)?,
              auth:     row.get(1)?,
              p256dh:   row.get(2)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    Ok(
      raws
        .into_iter()
        .map(RawSubscription::into_subscription)
        .collect(),
    )
  }

  async fn remove_subscription(&self, endpoint: &str) -> Result<bool> {
    let endpoint = endpoint.to_owned();

    let removed: usize = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM push_subscriptions WHERE endpoint = ?1",
          rusqlite::params![endpoint],
        )?)
      })
      .await?;

    Ok(removed > 0)
  }
}
