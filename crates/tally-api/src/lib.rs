//! JSON REST API for Tally.
//!
//! Exposes an axum [`Router`] backed by an [`InventoryEngine`] over any
//! [`tally_core::store::InventoryStore`]. Every handler reads the calling
//! tenant from a [`TenantId`] request extension; authenticating the request
//! and inserting that extension is the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", tally_api::api_router(engine.clone()).layer(auth_layer))
//! ```
//!
//! [`TenantId`]: tally_core::tenant::TenantId

pub mod account;
pub mod alerts;
pub mod error;
pub mod forecasts;
pub mod inventory;
pub mod products;

use std::sync::Arc;

use axum::{
  Router,
  routing::{delete, get, post, put},
};
use tally_core::{engine::InventoryEngine, store::InventoryStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `engine`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(engine: Arc<InventoryEngine<S>>) -> Router<()>
where
  S: InventoryStore + 'static,
{
  Router::new()
    .route("/me", get(account::me::<S>))
    // Inventory
    .route("/inventory", get(inventory::list::<S>))
    .route("/inventory/scan", post(inventory::scan::<S>))
    .route("/inventory/low-stock", get(inventory::low_stock::<S>))
    .route("/inventory/{product_id}", put(inventory::set_quantity::<S>))
    // Products
    .route("/products", get(products::list::<S>).post(products::create::<S>))
    .route(
      "/products/{id}",
      get(products::get_one::<S>)
        .put(products::update::<S>)
        .delete(products::delete_one::<S>),
    )
    // Alerts
    .route("/alerts", get(alerts::list::<S>))
    .route("/alerts/{id}", delete(alerts::delete_one::<S>))
    .route("/alerts/{id}/acknowledge", post(alerts::acknowledge::<S>))
    // Forecasts
    .route("/forecasts", get(forecasts::list::<S>))
    .route("/forecasts/run", post(forecasts::run_all::<S>))
    .route("/forecasts/{product_id}", get(forecasts::get_one::<S>))
    .route("/forecasts/{product_id}/recalculate", post(forecasts::recalculate::<S>))
    .with_state(engine)
}

#[cfg(test)]
mod tests;
