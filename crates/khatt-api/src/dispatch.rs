//! Handler for the external dispatch trigger.

use axum::{Json, extract::State};

use khatt_notify::DispatchOutcome;

use crate::{AppState, Storage, error::ApiError};

/// `POST /notify/dispatch`
///
/// Runs one expiry-alert dispatch. Per-endpoint failures are absorbed into
/// the `pruned` count; only a fault reading lines or subscriptions surfaces
/// as an error (502).
pub async fn trigger<S: Storage>(
  State(state): State<AppState<S>>,
) -> Result<Json<DispatchOutcome>, ApiError> {
  let outcome = state.dispatcher.dispatch_expiry_alerts().await?;
  Ok(Json(outcome))
}
