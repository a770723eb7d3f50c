//! Expiry-alert notification dispatch for khatt.
//!
//! The [`Dispatcher`] reads the current lines, classifies them, and fans a
//! single alert payload out to every registered push endpoint. Delivery
//! failures prune the failed endpoint from the store, so dead subscriptions
//! never accumulate.

mod dispatcher;
pub mod transport;

pub use dispatcher::{AlertPayload, DispatchError, DispatchOutcome, Dispatcher};
pub use transport::{DeliveryError, PushTransport, WebPushClient};
