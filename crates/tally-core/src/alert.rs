//! Alert policy and alert records.
//!
//! [`classify`] maps a quantity and reorder point to a [`HealthStatus`].
//! A low-stock [`Alert`] is raised only when the quantity is below the
//! reorder point and the product has no unacknowledged low-stock alert yet;
//! storage enforces the second half atomically in
//! [`crate::store::InventoryStore::raise_alert`].

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{product::Product, tenant::TenantId};

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthStatus {
  Healthy,
  Low,
  Critical,
}

/// `healthy` at or above 1.5x the reorder point, `critical` below it, `low`
/// in between.
pub fn classify(quantity: i64, reorder_point: i64) -> HealthStatus {
  // 2q >= 3r is q >= 1.5r without leaving the integers; widened so neither
  // product can overflow.
  if 2 * i128::from(quantity) >= 3 * i128::from(reorder_point) {
    HealthStatus::Healthy
  } else if quantity < reorder_point {
    HealthStatus::Critical
  } else {
    HealthStatus::Low
  }
}

pub fn below_reorder_point(quantity: i64, reorder_point: i64) -> bool {
  quantity < reorder_point
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AlertKind {
  LowStock,
  Expiry,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Alert {
  pub alert_id:     Uuid,
  pub tenant_id:    TenantId,
  pub product_id:   Uuid,
  #[serde(rename = "alert_type")]
  pub kind:         AlertKind,
  pub message:      String,
  pub acknowledged: bool,
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::store::InventoryStore::raise_alert`].
#[derive(Debug, Clone)]
pub struct NewAlert {
  pub product_id: Uuid,
  pub kind:       AlertKind,
  pub message:    String,
}

impl NewAlert {
  pub fn low_stock(product: &Product, quantity: i64) -> Self {
    Self {
      product_id: product.product_id,
      kind:       AlertKind::LowStock,
      message:    format!(
        "Low stock alert: {} has only {quantity} units left (reorder point: {})",
        product.name, product.reorder_point
      ),
    }
  }
}

/// An alert joined with the product it concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AlertView {
  #[serde(flatten)]
  pub alert:           Alert,
  pub product_name:    String,
  pub product_barcode: String,
}

/// Parameters for [`crate::store::InventoryStore::list_alerts`].
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct AlertFilter {
  pub kind:         Option<AlertKind>,
  pub acknowledged: Option<bool>,
}
