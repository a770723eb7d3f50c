//! Subscription — a registered push-delivery endpoint.
//!
//! The endpoint URL is the identity: registering the same endpoint twice is
//! a no-op, and pruning after a failed delivery removes by endpoint.

use serde::{Deserialize, Serialize};

/// A push-delivery destination, as handed to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
  /// Push-service endpoint URL; unique per subscription.
  pub endpoint: String,
  /// Client auth secret.
  pub auth:     String,
  /// Client P-256 ECDH public key.
  pub p256dh:   String,
}

/// Input to [`SubscriptionStore::add_subscription`].
///
/// [`SubscriptionStore::add_subscription`]: crate::store::SubscriptionStore::add_subscription
#[derive(Debug, Clone, Deserialize)]
pub struct NewSubscription {
  pub endpoint: String,
  pub auth:     String,
  pub p256dh:   String,
}
