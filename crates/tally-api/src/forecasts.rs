//! Handlers for `/forecasts` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/forecasts` | Soonest stockout first |
//! | `POST` | `/forecasts/run` | Recalculate every stocked product |
//! | `GET`  | `/forecasts/{product_id}` | Stored forecast, computed on first access |
//! | `POST` | `/forecasts/{product_id}/recalculate` | Recompute and store |

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, State},
};
use serde_json::{Value, json};
use tally_core::{
  engine::InventoryEngine,
  forecast::{Forecast, ForecastView},
  store::InventoryStore,
  tenant::TenantId,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /forecasts`
pub async fn list<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
) -> Result<Json<Vec<ForecastView>>, ApiError> {
  Ok(Json(engine.list_forecasts(tenant).await?))
}

/// `POST /forecasts/run`
pub async fn run_all<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
) -> Result<Json<Value>, ApiError> {
  let count = engine.recalculate_all(tenant).await?;
  Ok(Json(json!({ "recalculated": count })))
}

/// `GET /forecasts/{product_id}`
pub async fn get_one<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Path(product_id): Path<Uuid>,
) -> Result<Json<Forecast>, ApiError> {
  Ok(Json(engine.forecast_for(tenant, product_id).await?))
}

/// `POST /forecasts/{product_id}/recalculate`
pub async fn recalculate<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Path(product_id): Path<Uuid>,
) -> Result<Json<Forecast>, ApiError> {
  Ok(Json(engine.refresh_forecast(tenant, product_id).await?))
}
