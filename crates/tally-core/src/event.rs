//! Push-channel payloads. The JSON shapes are consumed by existing clients
//! and must not change.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  alert::{Alert, AlertKind, HealthStatus},
  product::Product,
  stock::Action,
  tenant::TenantId,
};

/// What caused an `inventory_update`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpdateAction {
  Sale,
  Restock,
  /// Manual absolute correction.
  Adjust,
}

impl From<Action> for UpdateAction {
  fn from(action: Action) -> Self {
    match action {
      Action::Sale => Self::Sale,
      Action::Restock => Self::Restock,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventoryUpdate {
  pub product_id: Uuid,
  pub barcode:    String,
  pub name:       String,
  pub quantity:   i64,
  pub status:     HealthStatus,
  pub action:     UpdateAction,
  pub timestamp:  DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertCreated {
  pub alert_id:     Uuid,
  pub product_name: String,
  pub message:      String,
  pub alert_type:   AlertKind,
}

/// Events fanned out to every subscriber of a tenant.
///
/// Serialises as `{"type": "inventory_update", "data": {...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum LiveEvent {
  InventoryUpdate(InventoryUpdate),
  AlertCreated(AlertCreated),
}

impl LiveEvent {
  pub fn inventory_update(
    product: &Product,
    quantity: i64,
    status: HealthStatus,
    action: UpdateAction,
  ) -> Self {
    Self::InventoryUpdate(InventoryUpdate {
      product_id: product.product_id,
      barcode: product.barcode.clone(),
      name: product.name.clone(),
      quantity,
      status,
      action,
      timestamp: Utc::now(),
    })
  }

  pub fn alert_created(product: &Product, alert: &Alert) -> Self {
    Self::AlertCreated(AlertCreated {
      alert_id:     alert.alert_id,
      product_name: product.name.clone(),
      message:      alert.message.clone(),
      alert_type:   alert.kind,
    })
  }
}

/// Messages addressed to a single subscriber.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SessionMessage {
  /// Sent once, right after a subscription is registered.
  ConnectionEstablished { message: String, store_id: TenantId },
  /// Reply to any client frame; doubles as a heartbeat.
  Pong { message: String },
}

#[cfg(test)]
mod tests {
  use serde_json::json;

  use super::*;

  #[test]
  fn inventory_update_wire_shape() {
    let ts = DateTime::parse_from_rfc3339("2025-01-02T03:04:05Z")
      .unwrap()
      .with_timezone(&Utc);
    let event = LiveEvent::InventoryUpdate(InventoryUpdate {
      product_id: Uuid::nil(),
      barcode:    "4006381333931".into(),
      name:       "Pencil".into(),
      quantity:   15,
      status:     HealthStatus::Critical,
      action:     UpdateAction::Sale,
      timestamp:  ts,
    });
    let value = serde_json::to_value(&event).unwrap();
    assert_eq!(value["type"], "inventory_update");
    assert_eq!(value["data"]["status"], "critical");
    assert_eq!(value["data"]["action"], "sale");
    assert_eq!(value["data"]["quantity"], 15);
    assert_eq!(value["data"]["barcode"], "4006381333931");
  }

  #[test]
  fn alert_created_wire_shape() {
    let event = LiveEvent::AlertCreated(AlertCreated {
      alert_id:     Uuid::nil(),
      product_name: "Pencil".into(),
      message:      "low".into(),
      alert_type:   AlertKind::LowStock,
    });
    assert_eq!(
      serde_json::to_value(&event).unwrap(),
      json!({
        "type": "alert_created",
        "data": {
          "alert_id": Uuid::nil(),
          "product_name": "Pencil",
          "message": "low",
          "alert_type": "low_stock",
        }
      })
    );
  }

  #[test]
  fn connection_established_is_flat() {
    let msg = SessionMessage::ConnectionEstablished {
      message:  "hi".into(),
      store_id: TenantId(Uuid::nil()),
    };
    let value = serde_json::to_value(&msg).unwrap();
    assert_eq!(value["type"], "connection_established");
    assert_eq!(value["store_id"], Uuid::nil().to_string());
  }
}
