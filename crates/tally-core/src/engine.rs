//! The inventory engine: stock mutations, alerting, broadcast and
//! forecasting on top of any [`InventoryStore`].

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
  Error, Result,
  alert::{self, Alert, AlertFilter, AlertView, HealthStatus, NewAlert},
  event::{LiveEvent, UpdateAction},
  forecast::{self, Forecast, ForecastResult, ForecastView},
  product::{self, NewProduct, Product, ProductPatch},
  stock::{Action, AppliedChange, Direction, InventoryItem, StockChange, StockUpdate},
  store::{InventoryStore, ProductPage},
  tenant::{Tenant, TenantId},
};

// ─── Broadcast seam ──────────────────────────────────────────────────────────

/// Receives events for fan-out to a tenant's subscribers.
///
/// Implementations must not block and must swallow delivery failures; the
/// engine never learns whether anybody was listening.
pub trait EventSink: Send + Sync {
  fn broadcast(&self, tenant: TenantId, event: &LiveEvent);
}

/// Discards every event. For batch jobs and tests.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
  fn broadcast(&self, _: TenantId, _: &LiveEvent) {}
}

// ─── Receipts ────────────────────────────────────────────────────────────────

/// Result of [`InventoryEngine::apply_movement`].
#[derive(Debug, Clone, Serialize)]
pub struct ScanReceipt {
  pub item:        InventoryItem,
  pub movement_id: Uuid,
  /// Set when this scan raised a new low-stock alert.
  pub alert:       Option<Alert>,
}

/// Result of [`InventoryEngine::set_absolute_quantity`].
#[derive(Debug, Clone, Serialize)]
pub struct AdjustmentReceipt {
  pub item:              InventoryItem,
  pub previous_quantity: i64,
  /// `None` when the quantity did not change.
  pub movement_id:       Option<Uuid>,
  pub alert:             Option<Alert>,
}

// ─── Engine ──────────────────────────────────────────────────────────────────

pub struct InventoryEngine<S> {
  store: Arc<S>,
  sink:  Arc<dyn EventSink>,
}

impl<S> Clone for InventoryEngine<S> {
  fn clone(&self) -> Self {
    Self { store: self.store.clone(), sink: self.sink.clone() }
  }
}

impl<S: InventoryStore> InventoryEngine<S> {
  pub fn new(store: Arc<S>, sink: Arc<dyn EventSink>) -> Self {
    Self { store, sink }
  }

  pub fn store(&self) -> &Arc<S> { &self.store }

  // ── Mutations ─────────────────────────────────────────────────────────

  /// Record a sale or restock identified by barcode.
  ///
  /// Validation happens before anything is written. A sale larger than the
  /// available stock fails with [`Error::InsufficientStock`] and changes
  /// nothing.
  pub async fn apply_movement(
    &self,
    tenant: TenantId,
    barcode: &str,
    action: Action,
    quantity: i64,
  ) -> Result<ScanReceipt> {
    if quantity <= 0 {
      return Err(Error::invalid("quantity", "must be greater than zero"));
    }
    let barcode = product::normalize_barcode(barcode)?;

    let product = self
      .store
      .find_product_by_barcode(tenant, &barcode)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(format!("product with barcode {barcode:?}")))?;

    let applied = match self
      .store
      .apply_stock_change(
        tenant,
        product.product_id,
        StockChange::for_action(action, quantity),
      )
      .await
      .map_err(Error::storage)?
    {
      StockUpdate::Applied(applied) => applied,
      StockUpdate::Insufficient { available } => {
        return Err(Error::InsufficientStock { available, requested: quantity });
      }
      StockUpdate::Overflow { .. } => {
        return Err(Error::invalid("quantity", "would exceed the largest storable stock"));
      }
      StockUpdate::Missing => {
        return Err(Error::not_found(format!(
          "stock record for product {}",
          product.product_id
        )));
      }
    };

    let movement_id = applied
      .movement
      .as_ref()
      .map(|m| m.movement_id)
      .ok_or_else(|| {
        Error::storage(std::io::Error::other("stock change recorded no movement"))
      })?;

    info!(
      %tenant,
      product_id = %product.product_id,
      barcode = %product.barcode,
      %action,
      quantity,
      new_quantity = applied.stock.quantity,
      "stock movement applied"
    );

    let (item, alert) =
      self.settle(tenant, product, &applied, action.into()).await;
    Ok(ScanReceipt { item, movement_id, alert })
  }

  /// Overwrite the stock of a product. Trusted manual correction: any
  /// non-negative value is accepted, including one below what a sale
  /// would have been allowed to leave.
  pub async fn set_absolute_quantity(
    &self,
    tenant: TenantId,
    product_id: Uuid,
    new_quantity: i64,
  ) -> Result<AdjustmentReceipt> {
    if new_quantity < 0 {
      return Err(Error::invalid("quantity", "must not be negative"));
    }

    let product = self.require_product(tenant, product_id).await?;

    let applied = match self
      .store
      .apply_stock_change(tenant, product_id, StockChange::Set(new_quantity))
      .await
      .map_err(Error::storage)?
    {
      StockUpdate::Applied(applied) => applied,
      StockUpdate::Missing
      | StockUpdate::Insufficient { .. }
      | StockUpdate::Overflow { .. } => {
        return Err(Error::not_found(format!(
          "stock record for product {product_id}"
        )));
      }
    };

    info!(
      %tenant,
      %product_id,
      previous = applied.previous,
      new_quantity,
      "stock quantity set"
    );

    let previous_quantity = applied.previous;
    let movement_id = applied.movement.as_ref().map(|m| m.movement_id);
    let (item, alert) =
      self.settle(tenant, product, &applied, UpdateAction::Adjust).await;
    Ok(AdjustmentReceipt { item, previous_quantity, movement_id, alert })
  }

  /// Post-commit work shared by both mutations: alert dedup-and-create and
  /// event fan-out. Nothing here can undo the committed change, so alert
  /// storage failures are logged rather than returned.
  async fn settle(
    &self,
    tenant: TenantId,
    product: Product,
    applied: &AppliedChange,
    action: UpdateAction,
  ) -> (InventoryItem, Option<Alert>) {
    let quantity = applied.stock.quantity;
    let status: HealthStatus = alert::classify(quantity, product.reorder_point);

    let alert = if alert::below_reorder_point(quantity, product.reorder_point) {
      match self
        .store
        .raise_alert(tenant, NewAlert::low_stock(&product, quantity))
        .await
      {
        Ok(alert) => alert,
        Err(e) => {
          warn!(%tenant, product_id = %product.product_id, "failed to raise alert: {e}");
          None
        }
      }
    } else {
      None
    };

    self.sink.broadcast(
      tenant,
      &LiveEvent::inventory_update(&product, quantity, status, action),
    );
    if let Some(alert) = &alert {
      self
        .sink
        .broadcast(tenant, &LiveEvent::alert_created(&product, alert));
    }

    (InventoryItem::new(product, &applied.stock), alert)
  }

  // ── Tenants ───────────────────────────────────────────────────────────

  /// The profile of an authenticated tenant.
  pub async fn tenant_profile(&self, tenant: TenantId) -> Result<Tenant> {
    self
      .store
      .get_tenant(tenant)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(format!("tenant {tenant}")))
  }

  // ── Products ──────────────────────────────────────────────────────────

  pub async fn register_product(
    &self,
    tenant: TenantId,
    input: NewProduct,
  ) -> Result<InventoryItem> {
    let input = input.validated()?;
    let barcode = input.barcode.clone();
    let item = self
      .store
      .add_product(tenant, input)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::DuplicateBarcode(barcode))?;
    info!(%tenant, product_id = %item.product.product_id, "product registered");
    Ok(item)
  }

  pub async fn product(
    &self,
    tenant: TenantId,
    product_id: Uuid,
  ) -> Result<InventoryItem> {
    let product = self.require_product(tenant, product_id).await?;
    let stock = self
      .store
      .get_stock(tenant, product_id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| {
        Error::not_found(format!("stock record for product {product_id}"))
      })?;
    Ok(InventoryItem::new(product, &stock))
  }

  pub async fn list_products(
    &self,
    tenant: TenantId,
    offset: usize,
    limit: usize,
  ) -> Result<ProductPage> {
    self
      .store
      .list_products(tenant, offset, limit)
      .await
      .map_err(Error::storage)
  }

  pub async fn update_product(
    &self,
    tenant: TenantId,
    product_id: Uuid,
    patch: ProductPatch,
  ) -> Result<InventoryItem> {
    let patch = patch.validated()?;
    self
      .store
      .update_product(tenant, product_id, patch)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(format!("product {product_id}")))?;
    self.product(tenant, product_id).await
  }

  pub async fn delete_product(&self, tenant: TenantId, product_id: Uuid) -> Result<()> {
    let deleted = self
      .store
      .delete_product(tenant, product_id)
      .await
      .map_err(Error::storage)?;
    if !deleted {
      return Err(Error::not_found(format!("product {product_id}")));
    }
    info!(%tenant, %product_id, "product deleted");
    Ok(())
  }

  pub async fn list_inventory(&self, tenant: TenantId) -> Result<Vec<InventoryItem>> {
    self
      .store
      .list_inventory(tenant, false)
      .await
      .map_err(Error::storage)
  }

  pub async fn list_low_stock(&self, tenant: TenantId) -> Result<Vec<InventoryItem>> {
    self
      .store
      .list_inventory(tenant, true)
      .await
      .map_err(Error::storage)
  }

  async fn require_product(&self, tenant: TenantId, product_id: Uuid) -> Result<Product> {
    self
      .store
      .get_product(tenant, product_id)
      .await
      .map_err(Error::storage)?
      .ok_or_else(|| Error::not_found(format!("product {product_id}")))
  }

  // ── Alerts ────────────────────────────────────────────────────────────

  pub async fn list_alerts(
    &self,
    tenant: TenantId,
    filter: AlertFilter,
  ) -> Result<Vec<AlertView>> {
    self
      .store
      .list_alerts(tenant, filter)
      .await
      .map_err(Error::storage)
  }

  pub async fn acknowledge_alert(&self, tenant: TenantId, alert_id: Uuid) -> Result<()> {
    let found = self
      .store
      .acknowledge_alert(tenant, alert_id)
      .await
      .map_err(Error::storage)?;
    if !found {
      return Err(Error::not_found(format!("alert {alert_id}")));
    }
    Ok(())
  }

  pub async fn delete_alert(&self, tenant: TenantId, alert_id: Uuid) -> Result<()> {
    let found = self
      .store
      .delete_alert(tenant, alert_id)
      .await
      .map_err(Error::storage)?;
    if !found {
      return Err(Error::not_found(format!("alert {alert_id}")));
    }
    Ok(())
  }

  // ── Forecasts ─────────────────────────────────────────────────────────

  /// Project a stockout for one product without persisting it.
  ///
  /// A product with no sales in the window still yields a result; only a
  /// product without a stock record is [`Error::Insufficient`].
  pub async fn compute_forecast(
    &self,
    tenant: TenantId,
    product_id: Uuid,
  ) -> Result<ForecastResult> {
    let product = self.require_product(tenant, product_id).await?;
    let stock = self
      .store
      .get_stock(tenant, product_id)
      .await
      .map_err(Error::storage)?
      .ok_or(Error::Insufficient(product_id))?;
    self.project(tenant, &product, stock.quantity).await
  }

  /// Recompute and persist the forecast of one product.
  pub async fn refresh_forecast(
    &self,
    tenant: TenantId,
    product_id: Uuid,
  ) -> Result<Forecast> {
    let result = self.compute_forecast(tenant, product_id).await?;
    self
      .store
      .upsert_forecast(tenant, result, Utc::now())
      .await
      .map_err(Error::storage)
  }

  /// The stored forecast, computing and storing one on first access.
  pub async fn forecast_for(
    &self,
    tenant: TenantId,
    product_id: Uuid,
  ) -> Result<Forecast> {
    self.require_product(tenant, product_id).await?;
    match self
      .store
      .get_forecast(tenant, product_id)
      .await
      .map_err(Error::storage)?
    {
      Some(forecast) => Ok(forecast),
      None => self.refresh_forecast(tenant, product_id).await,
    }
  }

  pub async fn list_forecasts(&self, tenant: TenantId) -> Result<Vec<ForecastView>> {
    self
      .store
      .list_forecasts(tenant)
      .await
      .map_err(Error::storage)
  }

  /// Recompute and upsert the forecast of every stocked product of the
  /// tenant. Returns how many were written. Stops at the first storage
  /// error; products already written keep their new forecast and a rerun
  /// simply overwrites them again.
  pub async fn recalculate_all(&self, tenant: TenantId) -> Result<usize> {
    let items = self
      .store
      .list_inventory(tenant, false)
      .await
      .map_err(Error::storage)?;

    let mut count = 0;
    for item in &items {
      let result = self.project(tenant, &item.product, item.quantity).await?;
      self
        .store
        .upsert_forecast(tenant, result, Utc::now())
        .await
        .map_err(Error::storage)?;
      count += 1;
    }

    info!(%tenant, count, "forecasts recalculated");
    Ok(count)
  }

  async fn project(
    &self,
    tenant: TenantId,
    product: &Product,
    current_stock: i64,
  ) -> Result<ForecastResult> {
    let since = forecast::window_start(Utc::now());
    let sales = self
      .store
      .movements_since(tenant, product.product_id, Direction::Out, since)
      .await
      .map_err(Error::storage)?;
    Ok(forecast::project(
      product.product_id,
      &sales,
      current_stock,
      product.reorder_point,
    ))
  }
}
