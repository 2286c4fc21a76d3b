//! Fan-out of serialised events to a tenant's subscribers.

use std::sync::Arc;

use serde::Serialize;
use tally_core::{engine::EventSink, event::LiveEvent, tenant::TenantId};
use tracing::{debug, warn};

use crate::registry::{ConnectionRegistry, Subscriber};

#[derive(Debug, Clone)]
pub struct Dispatcher {
  registry: Arc<ConnectionRegistry>,
}

impl Dispatcher {
  pub fn new(registry: Arc<ConnectionRegistry>) -> Self { Self { registry } }

  pub fn registry(&self) -> &Arc<ConnectionRegistry> { &self.registry }

  /// Serialise `message` once and deliver it to every handle of `tenant`.
  ///
  /// Handles that fail are unregistered; the rest still receive the
  /// message. Returns how many handles it reached.
  pub fn fan_out<T: Serialize>(&self, tenant: TenantId, message: &T) -> usize {
    let subscribers = self.registry.subscribers(tenant);
    if subscribers.is_empty() {
      return 0;
    }

    let payload = match serde_json::to_string(message) {
      Ok(p) => p,
      Err(e) => {
        warn!(%tenant, error = %e, "could not serialise broadcast message");
        return 0;
      }
    };

    let mut delivered = 0;
    for subscriber in subscribers {
      match subscriber.try_deliver(payload.clone()) {
        Ok(()) => delivered += 1,
        Err(e) => {
          debug!(%tenant, subscriber = %subscriber.id(), error = %e, "dropping subscriber");
          self.registry.unregister(tenant, subscriber.id());
        }
      }
    }
    debug!(%tenant, delivered, "broadcast sent");
    delivered
  }

  /// Deliver `message` to one handle. Failures are logged, and the handle
  /// stays registered; its transport notices the disconnect on its own.
  pub fn send_direct<T: Serialize>(&self, subscriber: &Subscriber, message: &T) {
    let result = serde_json::to_string(message)
      .map_err(|e| e.to_string())
      .and_then(|payload| subscriber.try_deliver(payload).map_err(|e| e.to_string()));
    if let Err(error) = result {
      warn!(subscriber = %subscriber.id(), %error, "direct send failed");
    }
  }
}

impl EventSink for Dispatcher {
  fn broadcast(&self, tenant: TenantId, event: &LiveEvent) {
    self.fan_out(tenant, event);
  }
}
