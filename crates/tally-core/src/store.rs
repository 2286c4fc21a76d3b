//! The `InventoryStore` trait.
//!
//! Implemented by storage backends (e.g. `tally-store-sqlite`). Every method
//! that touches tenant data takes a [`TenantId`] and must filter on it; a
//! record owned by another tenant is indistinguishable from a missing one.

use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::{
  alert::{Alert, AlertFilter, AlertView, NewAlert},
  forecast::{Forecast, ForecastResult, ForecastView},
  product::{NewProduct, Product, ProductPatch},
  stock::{Direction, InventoryItem, Movement, StockChange, StockRecord, StockUpdate},
  tenant::{NewTenant, Tenant, TenantCredentials, TenantId},
};

/// One page of [`InventoryStore::list_products`].
#[derive(Debug, Clone, serde::Serialize)]
pub struct ProductPage {
  /// Products owned by the tenant, regardless of paging.
  pub total:    u64,
  pub products: Vec<InventoryItem>,
}

/// Abstraction over a Tally storage backend.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait InventoryStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Tenants ───────────────────────────────────────────────────────────

  /// Persist a new tenant. Returns `None` if the phone is already taken.
  fn create_tenant(
    &self,
    input: NewTenant,
  ) -> impl Future<Output = Result<Option<Tenant>, Self::Error>> + Send + '_;

  fn get_tenant(
    &self,
    tenant: TenantId,
  ) -> impl Future<Output = Result<Option<Tenant>, Self::Error>> + Send + '_;

  /// Look up a tenant and its password hash by login phone.
  fn find_credentials<'a>(
    &'a self,
    phone: &'a str,
  ) -> impl Future<Output = Result<Option<TenantCredentials>, Self::Error>> + Send + 'a;

  /// Remove a tenant and everything it owns. Returns `false` if absent.
  fn delete_tenant(
    &self,
    tenant: TenantId,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Products ──────────────────────────────────────────────────────────

  /// Create a product and its stock record in one unit. A non-zero opening
  /// quantity is recorded as an `in` movement.
  ///
  /// Returns `None` if the barcode is already registered for the tenant.
  fn add_product(
    &self,
    tenant: TenantId,
    input: NewProduct,
  ) -> impl Future<Output = Result<Option<InventoryItem>, Self::Error>> + Send + '_;

  fn get_product(
    &self,
    tenant: TenantId,
    product_id: Uuid,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + '_;

  fn find_product_by_barcode<'a>(
    &'a self,
    tenant: TenantId,
    barcode: &'a str,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + 'a;

  fn list_products(
    &self,
    tenant: TenantId,
    offset: usize,
    limit: usize,
  ) -> impl Future<Output = Result<ProductPage, Self::Error>> + Send + '_;

  /// Returns the updated product, or `None` if it does not exist.
  fn update_product(
    &self,
    tenant: TenantId,
    product_id: Uuid,
    patch: ProductPatch,
  ) -> impl Future<Output = Result<Option<Product>, Self::Error>> + Send + '_;

  /// Delete a product together with its forecast, alerts, movements and
  /// stock record. Returns `false` if absent.
  fn delete_product(
    &self,
    tenant: TenantId,
    product_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Stock ─────────────────────────────────────────────────────────────

  fn get_stock(
    &self,
    tenant: TenantId,
    product_id: Uuid,
  ) -> impl Future<Output = Result<Option<StockRecord>, Self::Error>> + Send + '_;

  /// Products joined with stock. With `below_reorder_point`, only those
  /// whose quantity is strictly below their reorder point.
  fn list_inventory(
    &self,
    tenant: TenantId,
    below_reorder_point: bool,
  ) -> impl Future<Output = Result<Vec<InventoryItem>, Self::Error>> + Send + '_;

  /// Apply `change` to the stock record and append the matching movement.
  ///
  /// The availability check, the quantity write and the movement insert
  /// form one atomic unit: concurrent calls on the same product are
  /// serialised, and either both writes are visible or neither is.
  fn apply_stock_change(
    &self,
    tenant: TenantId,
    product_id: Uuid,
    change: StockChange,
  ) -> impl Future<Output = Result<StockUpdate, Self::Error>> + Send + '_;

  /// Movements in `direction` created at or after `since`, oldest first.
  fn movements_since(
    &self,
    tenant: TenantId,
    product_id: Uuid,
    direction: Direction,
    since: DateTime<Utc>,
  ) -> impl Future<Output = Result<Vec<Movement>, Self::Error>> + Send + '_;

  // ── Alerts ────────────────────────────────────────────────────────────

  /// Insert an alert unless the product already has an unacknowledged
  /// alert of the same kind. The check and insert are atomic. Returns the
  /// new alert, or `None` if suppressed.
  fn raise_alert(
    &self,
    tenant: TenantId,
    input: NewAlert,
  ) -> impl Future<Output = Result<Option<Alert>, Self::Error>> + Send + '_;

  /// Alerts matching `filter`, newest first.
  fn list_alerts(
    &self,
    tenant: TenantId,
    filter: AlertFilter,
  ) -> impl Future<Output = Result<Vec<AlertView>, Self::Error>> + Send + '_;

  /// Returns `false` if the alert does not exist.
  fn acknowledge_alert(
    &self,
    tenant: TenantId,
    alert_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// Returns `false` if the alert does not exist.
  fn delete_alert(
    &self,
    tenant: TenantId,
    alert_id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  // ── Forecasts ─────────────────────────────────────────────────────────

  /// Insert or overwrite the single forecast row of `result.product_id`.
  fn upsert_forecast(
    &self,
    tenant: TenantId,
    result: ForecastResult,
    at: DateTime<Utc>,
  ) -> impl Future<Output = Result<Forecast, Self::Error>> + Send + '_;

  fn get_forecast(
    &self,
    tenant: TenantId,
    product_id: Uuid,
  ) -> impl Future<Output = Result<Option<Forecast>, Self::Error>> + Send + '_;

  /// All forecasts, soonest stockout first; unknown stockouts last.
  fn list_forecasts(
    &self,
    tenant: TenantId,
  ) -> impl Future<Output = Result<Vec<ForecastView>, Self::Error>> + Send + '_;
}
