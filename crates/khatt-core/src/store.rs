//! The `LineStore` and `SubscriptionStore` traits.
//!
//! The traits are implemented by storage backends (e.g.
//! `khatt-store-sqlite`). Higher layers (`khatt-notify`, `khatt-api`) depend
//! on these abstractions, not on any concrete backend.
//!
//! Mutations must be visible to subsequent reads within the same process;
//! readers interleaved with a mutation see either the pre- or post-mutation
//! state, never a torn record.

use std::future::Future;

use chrono::NaiveDate;
use uuid::Uuid;

use crate::{
  line::{Line, NewLine},
  subscription::{NewSubscription, Subscription},
};

// ─── LineStore ───────────────────────────────────────────────────────────────

/// Abstraction over the owner of line records.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait LineStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// List every line, ascending by calendar expiry date. Lines whose stored
  /// expiry does not parse sort first; ties keep insertion order.
  fn list_lines(
    &self,
  ) -> impl Future<Output = Result<Vec<Line>, Self::Error>> + Send + '_;

  /// Retrieve a line by id. Returns `None` if not found.
  fn get_line(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<Line>, Self::Error>> + Send + '_;

  /// Validate and persist a new line. The store assigns `line_id` and
  /// `created_at`.
  fn create_line(
    &self,
    input: NewLine,
  ) -> impl Future<Output = Result<Line, Self::Error>> + Send + '_;

  /// Replace every editable field of an existing line. `created_at` is
  /// preserved. Fails if the line does not exist.
  fn update_line(
    &self,
    id: Uuid,
    input: NewLine,
  ) -> impl Future<Output = Result<Line, Self::Error>> + Send + '_;

  /// Overwrite only the expiry date — the renewal write path.
  fn set_expiry(
    &self,
    id: Uuid,
    new_date: NaiveDate,
  ) -> impl Future<Output = Result<Line, Self::Error>> + Send + '_;

  /// Hard-delete a line. Fails if the line does not exist.
  fn delete_line(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + '_;
}

// ─── SubscriptionStore ───────────────────────────────────────────────────────

/// Abstraction over the registry of push endpoints.
///
/// `remove_subscription` must tolerate concurrent invocation: the
/// dispatcher prunes failed endpoints from simultaneous delivery tasks.
pub trait SubscriptionStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Register an endpoint. Returns `true` if newly added, `false` if the
  /// endpoint was already registered (idempotent no-op, not an error).
  fn add_subscription(
    &self,
    input: NewSubscription,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All currently registered endpoints; order is irrelevant.
  fn list_subscriptions(
    &self,
  ) -> impl Future<Output = Result<Vec<Subscription>, Self::Error>> + Send + '_;

  /// Remove an endpoint. Returns `true` if a record was removed; removing
  /// an absent endpoint is a no-op that returns `false`.
  fn remove_subscription<'a>(
    &'a self,
    endpoint: &'a str,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + 'a;
}
