//! JSON REST API for khatt.
//!
//! Exposes an axum [`Router`] backed by any storage implementing both
//! [`LineStore`] and [`SubscriptionStore`]. Auth, TLS, and transport
//! concerns are the caller's responsibility.

pub mod dispatch;
pub mod error;
pub mod lines;
pub mod push;

use std::{path::PathBuf, sync::Arc};

use axum::{
  Router,
  routing::{get, post},
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use khatt_core::store::{LineStore, SubscriptionStore};
use khatt_notify::Dispatcher;

pub use error::ApiError;

// ─── Storage bound ───────────────────────────────────────────────────────────

/// Blanket bound for a backend that owns both lines and subscriptions.
pub trait Storage:
  LineStore + SubscriptionStore + Clone + Send + Sync + 'static
{
}

impl<S> Storage for S where
  S: LineStore + SubscriptionStore + Clone + Send + Sync + 'static
{
}

// ─── Configuration ───────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` with
/// `KHATT_`-prefixed environment overrides.
#[derive(Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// VAPID public key handed to browsers at `/push/public-key`.
  pub vapid_public_key: String,
  /// Click-through target embedded in every alert payload.
  #[serde(default = "default_alert_url")]
  pub alert_url:        String,
}

fn default_alert_url() -> String { "/".to_owned() }

// ─── Application state ───────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub store:            Arc<S>,
  pub dispatcher:       Arc<Dispatcher<S>>,
  pub vapid_public_key: Arc<str>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      store:            Arc::clone(&self.store),
      dispatcher:       Arc::clone(&self.dispatcher),
      vapid_public_key: Arc::clone(&self.vapid_public_key),
    }
  }
}

// ─── Router ──────────────────────────────────────────────────────────────────

/// Build a fully-materialised API router for `state`.
pub fn router<S: Storage>(state: AppState<S>) -> Router {
  Router::new()
    // Lines
    .route("/lines", get(lines::list::<S>).post(lines::create::<S>))
    .route("/lines/import", post(lines::import::<S>))
    .route(
      "/lines/{id}",
      get(lines::get_one::<S>)
        .put(lines::update::<S>)
        .delete(lines::delete::<S>),
    )
    .route("/lines/{id}/renew", post(lines::renew::<S>))
    // Push subscriptions
    .route("/push/public-key", get(push::public_key::<S>))
    .route("/push/subscribe", post(push::subscribe::<S>))
    // Dispatch trigger
    .route("/notify/dispatch", post(dispatch::trigger::<S>))
    .layer(TraceLayer::new_for_http())
    .with_state(state)
}

// ─── Integration tests ───────────────────────────────────────────────────────
