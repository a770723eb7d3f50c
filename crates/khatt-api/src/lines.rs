//! Handlers for `/lines` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/lines` | Lines with derived status + aggregate stats |
//! | `POST`   | `/lines` | 201; 400 on missing required fields |
//! | `GET`    | `/lines/:id` | 404 if not found |
//! | `PUT`    | `/lines/:id` | Full field replace |
//! | `POST`   | `/lines/:id/renew` | One-month renewal with clamping |
//! | `DELETE` | `/lines/:id` | 204 |
//! | `POST`   | `/lines/import` | Bulk create; invalid rows are skipped |

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use chrono::Utc;
use serde::Serialize;
use tracing::warn;
use uuid::Uuid;

use khatt_core::{
  line::{Line, NewLine},
  renewal::renew_one_month,
  status::{LineStatus, classify, parse_expiry},
  store::LineStore,
};

use crate::{AppState, Storage, error::ApiError};

// ─── Read models ─────────────────────────────────────────────────────────────

/// A line with its status derived at read time.
#[derive(Debug, Serialize)]
pub struct LineWithStatus {
  #[serde(flatten)]
  pub line:   Line,
  pub status: LineStatus,
}

impl LineWithStatus {
  fn derive(line: Line) -> Self {
    let status = classify(Some(&line.expiry_date), Utc::now().date_naive());
    Self { line, status }
  }
}

/// Dashboard counters over the full line list.
#[derive(Debug, Default, Serialize)]
pub struct LineStats {
  pub total:   usize,
  pub active:  usize,
  pub soon:    usize,
  pub expired: usize,
  pub unknown: usize,
}

#[derive(Debug, Serialize)]
pub struct ListResponse {
  pub lines: Vec<LineWithStatus>,
  pub stats: LineStats,
}

// ─── List ────────────────────────────────────────────────────────────────────

/// `GET /lines`
pub async fn list<S: Storage>(
  State(state): State<AppState<S>>,
) -> Result<Json<ListResponse>, ApiError> {
  let lines = state
    .store
    .list_lines()
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  let lines: Vec<LineWithStatus> =
    lines.into_iter().map(LineWithStatus::derive).collect();

  let mut stats = LineStats { total: lines.len(), ..LineStats::default() };
  for entry in &lines {
    match entry.status {
      LineStatus::Active => stats.active += 1,
      LineStatus::ExpiringSoon => stats.soon += 1,
      LineStatus::Expired => stats.expired += 1,
      LineStatus::Unknown => stats.unknown += 1,
    }
  }

  Ok(Json(ListResponse { lines, stats }))
}

// ─── Create ──────────────────────────────────────────────────────────────────

/// `POST /lines`
pub async fn create<S: Storage>(
  State(state): State<AppState<S>>,
  Json(body): Json<NewLine>,
) -> Result<impl IntoResponse, ApiError> {
  let input = body
    .validated()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  let line = state
    .store
    .create_line(input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok((StatusCode::CREATED, Json(LineWithStatus::derive(line))))
}

// ─── Get one ─────────────────────────────────────────────────────────────────

/// `GET /lines/:id`
pub async fn get_one<S: Storage>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LineWithStatus>, ApiError> {
  let line = fetch_line(&state, id).await?;
  Ok(Json(LineWithStatus::derive(line)))
}

// ─── Update ──────────────────────────────────────────────────────────────────

/// `PUT /lines/:id`
pub async fn update<S: Storage>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<NewLine>,
) -> Result<Json<LineWithStatus>, ApiError> {
  let input = body
    .validated()
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

  // Existence check up front so a missing id is a 404, not a store error.
  fetch_line(&state, id).await?;

  let line = state
    .store
    .update_line(id, input)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(LineWithStatus::derive(line)))
}

// ─── Renew ───────────────────────────────────────────────────────────────────

/// `POST /lines/:id/renew` — advance the expiry date by one month.
pub async fn renew<S: Storage>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<LineWithStatus>, ApiError> {
  let line  = fetch_line(&state, id).await?;
  let today = Utc::now().date_naive();

  if parse_expiry(&line.expiry_date).is_none() {
    // The stored date heals to today + 1 month; make the repair visible.
    warn!(
      line_id = %id,
      expiry_date = %line.expiry_date,
      "stored expiry date is unparseable, renewing from today"
    );
  }
  let new_date = renew_one_month(&line.expiry_date, today);

  let line = state
    .store
    .set_expiry(id, new_date)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(Json(LineWithStatus::derive(line)))
}

// ─── Delete ──────────────────────────────────────────────────────────────────

/// `DELETE /lines/:id`
pub async fn delete<S: Storage>(
  State(state): State<AppState<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  fetch_line(&state, id).await?;

  state
    .store
    .delete_line(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  Ok(StatusCode::NO_CONTENT)
}

// ─── Bulk import ─────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct ImportSummary {
  pub imported: usize,
  pub skipped:  usize,
}

/// `POST /lines/import` — bulk create from a JSON array.
///
/// Rows failing the required-field contract are skipped, not fatal, so one
/// bad row never aborts the batch.
pub async fn import<S: Storage>(
  State(state): State<AppState<S>>,
  Json(rows): Json<Vec<NewLine>>,
) -> Result<Json<ImportSummary>, ApiError> {
  let mut summary = ImportSummary { imported: 0, skipped: 0 };

  for row in rows {
    let input = match row.validated() {
      Ok(input) => input,
      Err(err) => {
        warn!(error = %err, "skipping invalid import row");
        summary.skipped += 1;
        continue;
      }
    };

    state
      .store
      .create_line(input)
      .await
      .map_err(|e| ApiError::Store(Box::new(e)))?;
    summary.imported += 1;
  }

  Ok(Json(summary))
}

// ─── Helpers ─────────────────────────────────────────────────────────────────

async fn fetch_line<S: Storage>(
  state: &AppState<S>,
  id: Uuid,
) -> Result<Line, ApiError> {
  state
    .store
    .get_line(id)
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?
    .ok_or_else(|| ApiError::NotFound(format!("line {id} not found")))
}
