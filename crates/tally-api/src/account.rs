//! `GET /me`: the profile of the authenticated store.

use std::sync::Arc;

use axum::{Extension, Json, extract::State};
use tally_core::{
  engine::InventoryEngine,
  store::InventoryStore,
  tenant::{Tenant, TenantId},
};

use crate::error::ApiError;

/// `GET /me`
pub async fn me<S: InventoryStore>(
  State(engine): State<Arc<InventoryEngine<S>>>,
  Extension(tenant): Extension<TenantId>,
) -> Result<Json<Tenant>, ApiError> {
  Ok(Json(engine.tenant_profile(tenant).await?))
}
