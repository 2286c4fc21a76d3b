//! Per-tenant registry of live subscriber handles.

use std::{
  collections::HashMap,
  sync::{Mutex, MutexGuard, PoisonError},
};

use tally_core::tenant::TenantId;
use thiserror::Error;
use tokio::sync::mpsc;
use uuid::Uuid;

/// Why a message could not be handed to a subscriber.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DeliveryError {
  #[error("subscriber has disconnected")]
  Closed,
  #[error("subscriber is not keeping up")]
  Full,
}

/// The sending half of one live connection.
///
/// Identity is the `id`; two clones of the same subscriber compare equal.
#[derive(Debug, Clone)]
pub struct Subscriber {
  id: Uuid,
  tx: mpsc::Sender<String>,
}

impl Subscriber {
  /// Create a handle and the receiver its transport drains.
  pub fn channel(buffer: usize) -> (Self, mpsc::Receiver<String>) {
    let (tx, rx) = mpsc::channel(buffer.max(1));
    (Self { id: Uuid::new_v4(), tx }, rx)
  }

  pub fn id(&self) -> Uuid { self.id }

  /// Queue one serialised message without waiting.
  pub fn try_deliver(&self, message: String) -> Result<(), DeliveryError> {
    self.tx.try_send(message).map_err(|e| match e {
      mpsc::error::TrySendError::Closed(_) => DeliveryError::Closed,
      mpsc::error::TrySendError::Full(_) => DeliveryError::Full,
    })
  }
}

impl PartialEq for Subscriber {
  fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for Subscriber {}

// ─── Registry ────────────────────────────────────────────────────────────────

/// Live handles grouped by tenant.
///
/// A tenant's bucket exists only while it holds at least one handle. All
/// operations take one short lock and never await while holding it.
#[derive(Debug, Default)]
pub struct ConnectionRegistry {
  tenants: Mutex<HashMap<TenantId, HashMap<Uuid, Subscriber>>>,
}

impl ConnectionRegistry {
  pub fn new() -> Self { Self::default() }

  fn lock(&self) -> MutexGuard<'_, HashMap<TenantId, HashMap<Uuid, Subscriber>>> {
    // A panic elsewhere cannot leave the map half-written.
    self.tenants.lock().unwrap_or_else(PoisonError::into_inner)
  }

  /// Add `subscriber` under `tenant`. Registering the same handle twice is a
  /// no-op.
  pub fn register(&self, tenant: TenantId, subscriber: Subscriber) {
    let mut tenants = self.lock();
    let bucket = tenants.entry(tenant).or_default();
    bucket.entry(subscriber.id).or_insert(subscriber);
    tracing::debug!(%tenant, connections = bucket.len(), "subscriber registered");
  }

  /// Remove the handle with `id`. Unknown tenants and handles are ignored.
  /// Returns whether anything was removed.
  pub fn unregister(&self, tenant: TenantId, id: Uuid) -> bool {
    let mut tenants = self.lock();
    let Some(bucket) = tenants.get_mut(&tenant) else {
      return false;
    };
    let removed = bucket.remove(&id).is_some();
    if bucket.is_empty() {
      tenants.remove(&tenant);
    }
    if removed {
      tracing::debug!(%tenant, subscriber = %id, "subscriber unregistered");
    }
    removed
  }

  /// A snapshot of `tenant`'s handles; empty for unknown tenants.
  pub fn subscribers(&self, tenant: TenantId) -> Vec<Subscriber> {
    self
      .lock()
      .get(&tenant)
      .map(|bucket| bucket.values().cloned().collect())
      .unwrap_or_default()
  }

  pub fn connection_count(&self, tenant: TenantId) -> usize {
    self.lock().get(&tenant).map_or(0, HashMap::len)
  }

  /// Number of tenants with at least one live handle.
  pub fn tenant_count(&self) -> usize { self.lock().len() }
}
