//! Handlers for `/inventory` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/inventory` | Every product with quantity and health status |
//! | `GET`  | `/inventory/low-stock` | Only products below their reorder point |
//! | `POST` | `/inventory/scan` | Body: `{"barcode":"...","action":"sale","quantity":1}` |
//! | `PUT`  | `/inventory/{product_id}` | Body: `{"quantity":40}`; manual correction |

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, State},
};
use serde::Deserialize;
use tally_core::{
  engine::{AdjustmentReceipt, InventoryEngine, ScanReceipt},
  stock::{Action, InventoryItem},
  store::InventoryStore,
  tenant::TenantId,
};
use uuid::Uuid;

use crate::error::{ApiError, Payload};

/// `GET /inventory`
pub async fn list<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
  Ok(Json(engine.list_inventory(tenant).await?))
}

/// `GET /inventory/low-stock`
pub async fn low_stock<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
) -> Result<Json<Vec<InventoryItem>>, ApiError> {
  Ok(Json(engine.list_low_stock(tenant).await?))
}

// ─── Scan ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ScanBody {
  pub barcode:  String,
  pub action:   Action,
  #[serde(default = "one")]
  pub quantity: i64,
}

fn one() -> i64 { 1 }

/// `POST /inventory/scan`
pub async fn scan<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Payload(body): Payload<ScanBody>,
) -> Result<Json<ScanReceipt>, ApiError> {
  let receipt = engine
    .apply_movement(tenant, &body.barcode, body.action, body.quantity)
    .await?;
  Ok(Json(receipt))
}

// ─── Manual set ───────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct SetBody {
  pub quantity: i64,
}

/// `PUT /inventory/{product_id}`
pub async fn set_quantity<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Path(product_id): Path<Uuid>,
  Payload(body): Payload<SetBody>,
) -> Result<Json<AdjustmentReceipt>, ApiError> {
  let receipt = engine
    .set_absolute_quantity(tenant, product_id, body.quantity)
    .await?;
  Ok(Json(receipt))
}
