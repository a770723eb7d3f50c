//! The expiry-alert dispatch algorithm.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use futures::future::join_all;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use khatt_core::{
  status::{EXPIRING_SOON_WINDOW_DAYS, LineStatus, classify},
  store::{LineStore, SubscriptionStore},
};

use crate::transport::PushTransport;

// ─── Payload ─────────────────────────────────────────────────────────────────

/// The notification payload delivered to every endpoint of one dispatch.
#[derive(Debug, Clone, Serialize)]
pub struct AlertPayload {
  pub title: String,
  pub body:  String,
  /// Click-through target for the notification.
  pub url:   String,
}

impl AlertPayload {
  fn expiry_alert(soon_count: usize, expired_count: usize, url: &str) -> Self {
    Self {
      title: "Package expiry alert".to_owned(),
      body:  format!(
        "{soon_count} line(s) expire within {EXPIRING_SOON_WINDOW_DAYS} days \
         and {expired_count} line(s) have already expired."
      ),
      url:   url.to_owned(),
    }
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Aggregate result of one dispatch run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchOutcome {
  /// Deliveries that succeeded.
  pub sent:            usize,
  /// Endpoints removed after a failed delivery.
  pub pruned:          usize,
  /// Whether any endpoint was registered when the alert went out. `false`
  /// on the nothing-to-announce short circuit, where the subscriber list is
  /// never even fetched.
  pub had_subscribers: bool,
}

/// A fault that aborts the whole dispatch. Per-endpoint delivery failures
/// are absorbed into pruning and never surface here.
#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
  #[error("failed to read lines: {0}")]
  Lines(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("failed to read subscriptions: {0}")]
  Subscriptions(#[source] Box<dyn std::error::Error + Send + Sync>),

  #[error("failed to serialize alert payload: {0}")]
  Payload(#[from] serde_json::Error),
}

enum Delivery {
  Sent,
  Pruned,
}

// ─── Dispatcher ──────────────────────────────────────────────────────────────

/// Fans one expiry alert out to all registered push endpoints.
///
/// Owns neither lines nor subscriptions: it borrows read access to both
/// through the store handle injected at construction, plus delete access to
/// subscriptions for pruning.
pub struct Dispatcher<S> {
  store:     Arc<S>,
  transport: Arc<dyn PushTransport>,
  alert_url: String,
}

impl<S> Dispatcher<S>
where
  S: LineStore + SubscriptionStore + 'static,
{
  pub fn new(
    store: Arc<S>,
    transport: Arc<dyn PushTransport>,
    alert_url: impl Into<String>,
  ) -> Self {
    Self { store, transport, alert_url: alert_url.into() }
  }

  /// Run one dispatch against the current wall-clock date.
  pub async fn dispatch_expiry_alerts(&self) -> Result<DispatchOutcome, DispatchError> {
    self.dispatch_expiry_alerts_at(Utc::now().date_naive()).await
  }

  /// Run one dispatch classifying against an explicit reference date.
  ///
  /// Every endpoint gets an independent delivery attempt; one endpoint's
  /// latency or failure never blocks another. A failed delivery prunes that
  /// endpoint. The call only fails outright when lines or subscriptions
  /// cannot be read at all.
  pub async fn dispatch_expiry_alerts_at(
    &self,
    today: NaiveDate,
  ) -> Result<DispatchOutcome, DispatchError> {
    let lines = LineStore::list_lines(self.store.as_ref())
      .await
      .map_err(|e| DispatchError::Lines(Box::new(e)))?;

    let mut soon_count    = 0usize;
    let mut expired_count = 0usize;
    for line in &lines {
      match classify(Some(&line.expiry_date), today) {
        LineStatus::ExpiringSoon => soon_count += 1,
        LineStatus::Expired => expired_count += 1,
        LineStatus::Active | LineStatus::Unknown => {}
      }
    }

    // Nothing to announce: skip the network entirely rather than spam an
    // empty alert.
    if soon_count == 0 && expired_count == 0 {
      debug!("no expiring or expired lines, skipping dispatch");
      return Ok(DispatchOutcome { sent: 0, pruned: 0, had_subscribers: false });
    }

    let payload = AlertPayload::expiry_alert(soon_count, expired_count, &self.alert_url);
    let bytes   = serde_json::to_vec(&payload)?;

    let subscriptions = SubscriptionStore::list_subscriptions(self.store.as_ref())
      .await
      .map_err(|e| DispatchError::Subscriptions(Box::new(e)))?;
    let had_subscribers = !subscriptions.is_empty();

    let deliveries = subscriptions.into_iter().map(|sub| {
      let transport = Arc::clone(&self.transport);
      let store     = Arc::clone(&self.store);
      let payload   = bytes.clone();
      async move {
        match transport.send(&sub, &payload).await {
          Ok(()) => Delivery::Sent,
          Err(err) => {
            warn!(
              endpoint = %sub.endpoint,
              error = %err,
              "push delivery failed, pruning subscription"
            );
            // A failed removal leaves the row for the next cycle; it is
            // still counted pruned for this dispatch.
            if let Err(store_err) =
              store.remove_subscription(&sub.endpoint).await
            {
              error!(
                endpoint = %sub.endpoint,
                error = %store_err,
                "failed to prune dead subscription"
              );
            }
            Delivery::Pruned
          }
        }
      }
    });

    // Join barrier: every delivery resolves (success or prune) before the
    // aggregate returns.
    let results = join_all(deliveries).await;
    let sent    = results.iter().filter(|d| matches!(d, Delivery::Sent)).count();
    let pruned  = results.len() - sent;

    info!(sent, pruned, soon_count, expired_count, "expiry alert dispatch complete");
    Ok(DispatchOutcome { sent, pruned, had_subscribers })
  }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::HashSet,
    sync::{
      Mutex,
      atomic::{AtomicUsize, Ordering},
    },
  };

  use chrono::Days;
  use khatt_core::{line::NewLine, subscription::NewSubscription};
  use khatt_store_sqlite::SqliteStore;

  use super::*;
  use crate::transport::{DeliveryError, PushTransport};

  struct MockTransport {
    send_count:     AtomicUsize,
    fail_endpoints: HashSet<String>,
    payloads:       Mutex<Vec<Vec<u8>>>,
  }

  impl MockTransport {
    fn reliable() -> Self {
      Self::failing_for([])
    }

    fn failing_for(endpoints: impl IntoIterator<Item = &'static str>) -> Self {
      Self {
        send_count:     AtomicUsize::new(0),
        fail_endpoints: endpoints.into_iter().map(str::to_owned).collect(),
        payloads:       Mutex::new(Vec::new()),
      }
    }
  }

  #[async_trait::async_trait]
  impl PushTransport for MockTransport {
    async fn send(
      &self,
      subscription: &khatt_core::subscription::Subscription,
      payload: &[u8],
    ) -> Result<(), DeliveryError> {
      self.send_count.fetch_add(1, Ordering::SeqCst);
      self.payloads.lock().unwrap().push(payload.to_vec());
      if self.fail_endpoints.contains(&subscription.endpoint) {
        Err(DeliveryError::Rejected { status: reqwest::StatusCode::GONE })
      } else {
        Ok(())
      }
    }
  }

  fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 3, 10).unwrap()
  }

  async fn store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  async fn add_line(store: &SqliteStore, name: &str, expiry: &str) {
    LineStore::create_line(
      store,
      NewLine {
        person_name:    name.into(),
        phone_number:   "07701234567".into(),
        job_title:      None,
        workplace:      None,
        package_amount: None,
        expiry_date:    expiry.into(),
      },
    )
    .await
    .unwrap();
  }

  async fn add_endpoint(store: &SqliteStore, endpoint: &str) {
    SubscriptionStore::add_subscription(
      store,
      NewSubscription {
        endpoint: endpoint.into(),
        auth:     "auth".into(),
        p256dh:   "p256dh".into(),
      },
    )
    .await
    .unwrap();
  }

  fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
  }

  #[tokio::test]
  async fn short_circuits_when_nothing_to_announce() {
    let store = store().await;
    add_line(&store, "healthy", &ymd(today() + Days::new(60))).await;
    add_line(&store, "garbage-date", "not-a-date").await;
    add_endpoint(&store, "https://push/a").await;

    let transport  = Arc::new(MockTransport::reliable());
    let dispatcher = Dispatcher::new(store.clone(), transport.clone(), "/");

    let outcome = dispatcher.dispatch_expiry_alerts_at(today()).await.unwrap();

    assert_eq!(
      outcome,
      DispatchOutcome { sent: 0, pruned: 0, had_subscribers: false }
    );
    // Zero network activity on the short circuit.
    assert_eq!(transport.send_count.load(Ordering::SeqCst), 0);
    assert_eq!(store.list_subscriptions().await.unwrap().len(), 1);
  }

  #[tokio::test]
  async fn delivers_one_payload_to_every_endpoint() {
    let store = store().await;
    add_line(&store, "soon-1", &ymd(today() + Days::new(3))).await;
    add_line(&store, "soon-2", &ymd(today() + Days::new(7))).await;
    add_line(&store, "expired", &ymd(today() - Days::new(1))).await;
    add_line(&store, "healthy", &ymd(today() + Days::new(30))).await;
    add_endpoint(&store, "https://push/a").await;
    add_endpoint(&store, "https://push/b").await;

    let transport  = Arc::new(MockTransport::reliable());
    let dispatcher = Dispatcher::new(store.clone(), transport.clone(), "/lines");

    let outcome = dispatcher.dispatch_expiry_alerts_at(today()).await.unwrap();

    assert_eq!(
      outcome,
      DispatchOutcome { sent: 2, pruned: 0, had_subscribers: true }
    );

    let payloads = transport.payloads.lock().unwrap();
    assert_eq!(payloads.len(), 2);
    let parsed: serde_json::Value = serde_json::from_slice(&payloads[0]).unwrap();
    assert_eq!(parsed["url"], "/lines");
    let body = parsed["body"].as_str().unwrap();
    assert!(body.contains('2'), "soon count missing from body: {body}");
    assert!(body.contains('1'), "expired count missing from body: {body}");
    // Both endpoints received the identical payload.
    assert_eq!(payloads[0], payloads[1]);
  }

  #[tokio::test]
  async fn failed_delivery_prunes_only_that_endpoint() {
    let store = store().await;
    add_line(&store, "expired", &ymd(today() - Days::new(10))).await;
    add_endpoint(&store, "https://push/a").await;
    add_endpoint(&store, "https://push/b").await;
    add_endpoint(&store, "https://push/c").await;

    let transport  = Arc::new(MockTransport::failing_for(["https://push/b"]));
    let dispatcher = Dispatcher::new(store.clone(), transport, "/");

    let outcome = dispatcher.dispatch_expiry_alerts_at(today()).await.unwrap();

    assert_eq!(
      outcome,
      DispatchOutcome { sent: 2, pruned: 1, had_subscribers: true }
    );

    let mut endpoints: Vec<String> = store
      .list_subscriptions()
      .await
      .unwrap()
      .into_iter()
      .map(|s| s.endpoint)
      .collect();
    endpoints.sort();
    assert_eq!(endpoints, ["https://push/a", "https://push/c"]);
  }

  #[tokio::test]
  async fn all_failing_endpoints_are_pruned_exactly_once() {
    let store = store().await;
    add_line(&store, "expired", &ymd(today() - Days::new(1))).await;

    let n = 12;
    let endpoints: Vec<String> =
      (0..n).map(|i| format!("https://push/{i}")).collect();
    for endpoint in &endpoints {
      add_endpoint(&store, endpoint).await;
    }

    let transport = Arc::new(MockTransport {
      send_count:     AtomicUsize::new(0),
      fail_endpoints: endpoints.into_iter().collect(),
      payloads:       Mutex::new(Vec::new()),
    });
    let dispatcher = Dispatcher::new(store.clone(), transport.clone(), "/");

    let outcome = dispatcher.dispatch_expiry_alerts_at(today()).await.unwrap();

    assert_eq!(
      outcome,
      DispatchOutcome { sent: 0, pruned: n, had_subscribers: true }
    );
    assert_eq!(transport.send_count.load(Ordering::SeqCst), n);
    assert!(store.list_subscriptions().await.unwrap().is_empty());
  }

  #[tokio::test]
  async fn no_subscribers_is_not_an_error() {
    let store = store().await;
    add_line(&store, "expired", &ymd(today() - Days::new(1))).await;

    let transport  = Arc::new(MockTransport::reliable());
    let dispatcher = Dispatcher::new(store, transport.clone(), "/");

    let outcome = dispatcher.dispatch_expiry_alerts_at(today()).await.unwrap();

    assert_eq!(
      outcome,
      DispatchOutcome { sent: 0, pruned: 0, had_subscribers: false }
    );
    assert_eq!(transport.send_count.load(Ordering::SeqCst), 0);
  }
}
