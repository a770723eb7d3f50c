//! Handlers for the push-subscription endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/push/public-key` | VAPID public key for the browser |
//! | `POST` | `/push/subscribe`  | Idempotent; duplicate endpoint is a no-op |

use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use khatt_core::{store::SubscriptionStore, subscription::NewSubscription};

use crate::{AppState, Storage, error::ApiError};

/// `GET /push/public-key`
pub async fn public_key<S: Storage>(
  State(state): State<AppState<S>>,
) -> Json<serde_json::Value> {
  Json(json!({ "publicKey": &*state.vapid_public_key }))
}

/// The browser `PushSubscription` JSON shape.
#[derive(Debug, Deserialize)]
pub struct SubscribeBody {
  pub endpoint: String,
  pub keys:     SubscriptionKeys,
}

#[derive(Debug, Deserialize)]
pub struct SubscriptionKeys {
  pub auth:   String,
  pub p256dh: String,
}

/// `POST /push/subscribe`
///
/// Registering twice with the same endpoint succeeds both times and leaves
/// exactly one record.
pub async fn subscribe<S: Storage>(
  State(state): State<AppState<S>>,
  Json(body): Json<SubscribeBody>,
) -> Result<impl IntoResponse, ApiError> {
  let added = state
    .store
    .add_subscription(NewSubscription {
      endpoint: body.endpoint,
      auth:     body.keys.auth,
      p256dh:   body.keys.p256dh,
    })
    .await
    .map_err(|e| ApiError::Store(Box::new(e)))?;

  if !added {
    debug!("endpoint already subscribed");
  }

  Ok((StatusCode::CREATED, Json(json!({ "success": true }))))
}
