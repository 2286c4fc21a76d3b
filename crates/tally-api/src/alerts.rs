//! Handlers for `/alerts` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/alerts` | Optional `?kind=low_stock\|expiry&acknowledged=true\|false` |
//! | `POST`   | `/alerts/{id}/acknowledge` | 204; a later low-stock event may raise a new alert |
//! | `DELETE` | `/alerts/{id}` | 204 |

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, Query, State},
  http::StatusCode,
};
use tally_core::{
  alert::{AlertFilter, AlertView},
  engine::InventoryEngine,
  store::InventoryStore,
  tenant::TenantId,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /alerts[?kind=<kind>][&acknowledged=<bool>]`
pub async fn list<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Query(filter): Query<AlertFilter>,
) -> Result<Json<Vec<AlertView>>, ApiError> {
  Ok(Json(engine.list_alerts(tenant, filter).await?))
}

/// `POST /alerts/{id}/acknowledge`
pub async fn acknowledge<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  engine.acknowledge_alert(tenant, id).await?;
  Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /alerts/{id}`
pub async fn delete_one<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  engine.delete_alert(tenant, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
