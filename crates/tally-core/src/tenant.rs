//! Tenants: the stores that own every other record.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifies the owning store. Every storage query takes one, so data from
/// one tenant can never be addressed through another.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TenantId(pub Uuid);

impl TenantId {
  pub fn new() -> Self { Self(Uuid::new_v4()) }
}

impl Default for TenantId {
  fn default() -> Self { Self::new() }
}

impl fmt::Display for TenantId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    self.0.fmt(f)
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tenant {
  pub tenant_id:  TenantId,
  pub name:       String,
  pub location:   Option<String>,
  /// Login identifier; unique across all tenants.
  pub phone:      String,
  pub created_at: DateTime<Utc>,
}

/// A tenant together with its argon2 PHC password hash. Never serialised.
#[derive(Debug, Clone)]
pub struct TenantCredentials {
  pub tenant:        Tenant,
  pub password_hash: String,
}

/// Input to [`crate::store::InventoryStore::create_tenant`].
#[derive(Debug, Clone)]
pub struct NewTenant {
  pub name:          String,
  pub location:      Option<String>,
  pub phone:         String,
  pub password_hash: String,
}
