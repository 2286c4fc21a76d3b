//! Handlers for `/products` endpoints.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `GET`    | `/products` | `?offset=&limit=`; returns `{total, products}` |
//! | `POST`   | `/products` | Body: [`NewProduct`]; returns 201 |
//! | `GET`    | `/products/{id}` | 404 if not found |
//! | `PUT`    | `/products/{id}` | Body: [`ProductPatch`] |
//! | `DELETE` | `/products/{id}` | Removes stock, movements, alerts and forecast too |

use std::sync::Arc;

use axum::{
  Extension, Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use serde::Deserialize;
use tally_core::{
  engine::InventoryEngine,
  product::{NewProduct, ProductPatch},
  stock::InventoryItem,
  store::{InventoryStore, ProductPage},
  tenant::TenantId,
};
use uuid::Uuid;

use crate::error::{ApiError, Payload};

const DEFAULT_LIMIT: usize = 50;
const MAX_LIMIT: usize = 500;

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub offset: usize,
  pub limit:  Option<usize>,
}

/// `GET /products[?offset=<n>][&limit=<n>]`
pub async fn list<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Query(params): Query<ListParams>,
) -> Result<Json<ProductPage>, ApiError> {
  let limit = params.limit.unwrap_or(DEFAULT_LIMIT);
  if limit == 0 || limit > MAX_LIMIT {
    return Err(ApiError::BadRequest(format!(
      "limit must be between 1 and {MAX_LIMIT}"
    )));
  }
  Ok(Json(engine.list_products(tenant, params.offset, limit).await?))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /products`
pub async fn create<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Payload(body): Payload<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
  let item = engine.register_product(tenant, body).await?;
  Ok((StatusCode::CREATED, Json(item)))
}

// ─── Single product ───────────────────────────────────────────────────────────

/// `GET /products/{id}`
pub async fn get_one<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Path(id): Path<Uuid>,
) -> Result<Json<InventoryItem>, ApiError> {
  Ok(Json(engine.product(tenant, id).await?))
}

/// `PUT /products/{id}`
pub async fn update<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Path(id): Path<Uuid>,
  Payload(patch): Payload<ProductPatch>,
) -> Result<Json<InventoryItem>, ApiError> {
  Ok(Json(engine.update_product(tenant, id, patch).await?))
}

/// `DELETE /products/{id}`
pub async fn delete_one<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError> {
  engine.delete_product(tenant, id).await?;
  Ok(StatusCode::NO_CONTENT)
}
