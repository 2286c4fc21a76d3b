//! Stock records, movements and the changes that produce them.
//!
//! A [`StockRecord`] holds the only mutable quantity of record. Every change
//! to it is paired with exactly one append-only [`Movement`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{alert::HealthStatus, product::Product, tenant::TenantId};

/// Whether a movement added or removed stock.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
  In,
  Out,
}

/// What a barcode scan asks for.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Action {
  Sale,
  Restock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StockRecord {
  pub product_id:   Uuid,
  pub tenant_id:    TenantId,
  /// Never negative.
  pub quantity:     i64,
  pub last_updated: DateTime<Utc>,
}

/// An immutable audit entry for one stock change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Movement {
  pub movement_id: Uuid,
  pub product_id:  Uuid,
  pub tenant_id:   TenantId,
  /// Magnitude of the change; the sign lives in `direction`.
  pub quantity:    i64,
  pub direction:   Direction,
  pub created_at:  DateTime<Utc>,
}

// ─── Changes ─────────────────────────────────────────────────────────────────

/// A requested mutation of a stock record, applied atomically by
/// [`crate::store::InventoryStore::apply_stock_change`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockChange {
  /// Remove units; refused when more than the current quantity.
  Remove(i64),
  /// Add units; no upper bound.
  Add(i64),
  /// Overwrite the quantity. Trusted manual correction: never refused.
  Set(i64),
}

impl StockChange {
  pub fn for_action(action: Action, quantity: i64) -> Self {
    match action {
      Action::Sale => Self::Remove(quantity),
      Action::Restock => Self::Add(quantity),
    }
  }

  /// The quantity after applying this change to `current`.
  pub fn resolve(self, current: i64) -> Result<i64, Refusal> {
    match self {
      Self::Remove(n) if n > current => Err(Refusal::Insufficient),
      Self::Remove(n) => Ok(current - n),
      Self::Add(n) => current.checked_add(n).ok_or(Refusal::Overflow),
      Self::Set(q) => Ok(q),
    }
  }
}

/// Why a [`StockChange`] cannot be applied to the current quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
  /// A removal exceeds what is available.
  Insufficient,
  /// An addition would leave the representable range.
  Overflow,
}

/// A change that was committed together with its movement.
#[derive(Debug, Clone)]
pub struct AppliedChange {
  pub stock:    StockRecord,
  pub previous: i64,
  /// `None` when the change left the quantity untouched (`Set` to the
  /// current value); no zero-magnitude movement is written.
  pub movement: Option<Movement>,
}

/// Outcome of an atomic stock change. Nothing is written unless `Applied`.
#[derive(Debug, Clone)]
pub enum StockUpdate {
  Applied(AppliedChange),
  Insufficient { available: i64 },
  /// A restock would push the quantity past `i64::MAX`.
  Overflow { available: i64 },
  /// The product has no stock record (or is outside the tenant).
  Missing,
}

// ─── Inventory view ──────────────────────────────────────────────────────────

/// A product joined with its stock record and derived health status.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryItem {
  #[serde(flatten)]
  pub product:      Product,
  pub quantity:     i64,
  pub status:       HealthStatus,
  pub last_updated: DateTime<Utc>,
}

impl InventoryItem {
  pub fn new(product: Product, stock: &StockRecord) -> Self {
    let status = crate::alert::classify(stock.quantity, product.reorder_point);
    Self {
      product,
      quantity: stock.quantity,
      status,
      last_updated: stock.last_updated,
    }
  }
}
