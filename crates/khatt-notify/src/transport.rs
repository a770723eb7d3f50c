//! The delivery transport seam.
//!
//! The dispatcher only depends on the success/failure contract of
//! [`PushTransport`]; the wire protocol behind it belongs to the push
//! service. Tests substitute a mock, production wires [`WebPushClient`].

use khatt_core::subscription::Subscription;

/// Errors that can occur delivering one payload to one endpoint.
///
/// The dispatcher treats every variant as a permanent failure and prunes
/// the endpoint; no transient/permanent distinction is made.
#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
  #[error("http request failed: {0}")]
  Http(#[from] reqwest::Error),

  #[error("push service rejected the message: {status}")]
  Rejected { status: reqwest::StatusCode },
}

/// A capability that can deliver an opaque payload to one push endpoint.
#[async_trait::async_trait]
pub trait PushTransport: Send + Sync {
  async fn send(
    &self,
    subscription: &Subscription,
    payload: &[u8],
  ) -> Result<(), DeliveryError>;
}

/// Production transport: POSTs the payload to the subscription endpoint.
///
/// VAPID signing and payload encryption are the push gateway's concern;
/// the subscription's `auth` and `p256dh` keys travel as headers so the
/// gateway can encrypt for the recipient.
pub struct WebPushClient {
  client: reqwest::Client,
  /// Push-service message lifetime, seconds (RFC 8030 `TTL` header).
  ttl:    u32,
}

impl WebPushClient {
  /// Four weeks — the conventional ceiling most push services accept.
  pub const DEFAULT_TTL_SECS: u32 = 2_419_200;

  pub fn new() -> Self {
    Self {
      client: reqwest::Client::new(),
      ttl:    Self::DEFAULT_TTL_SECS,
    }
  }

  pub fn with_ttl(ttl: u32) -> Self {
    Self { client: reqwest::Client::new(), ttl }
  }
}

impl Default for WebPushClient {
  fn default() -> Self { Self::new() }
}

#[async_trait::async_trait]
impl PushTransport for WebPushClient {
  async fn send(
    &self,
    subscription: &Subscription,
    payload: &[u8],
  ) -> Result<(), DeliveryError> {
    let response = self
      .client
      .post(&subscription.endpoint)
      .header(reqwest::header::CONTENT_TYPE, "application/json")
      .header("TTL", self.ttl)
      .header("X-Push-Auth", &subscription.auth)
      .header("X-Push-P256dh", &subscription.p256dh)
      .body(payload.to_vec())
      .send()
      .await?;

    let status = response.status();
    if !status.is_success() {
      tracing::debug!(
        endpoint = %subscription.endpoint,
        %status,
        "push endpoint returned non-2xx status"
      );
      return Err(DeliveryError::Rejected { status });
    }

    Ok(())
  }
}
