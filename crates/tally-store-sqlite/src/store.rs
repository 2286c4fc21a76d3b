//! [`SqliteStore`], the SQLite implementation of [`InventoryStore`].

use std::path::Path;

use chrono::{DateTime, Utc};
use rusqlite::{OptionalExtension as _, TransactionBehavior};
use uuid::Uuid;

use tally_core::{
  alert::{Alert, AlertFilter, AlertView, NewAlert},
  forecast::{Forecast, ForecastResult, ForecastView},
  product::{NewProduct, Product, ProductPatch},
  stock::{
    AppliedChange, Direction, InventoryItem, Movement, Refusal, StockChange,
    StockRecord, StockUpdate,
  },
  store::{InventoryStore, ProductPage},
  tenant::{NewTenant, Tenant, TenantCredentials, TenantId},
};

use crate::{
  Error, Result,
  encode::{
    ALERT_COLUMNS, FORECAST_COLUMNS, MOVEMENT_COLUMNS, PRODUCT_COLUMNS, RawAlertView,
    RawForecast, RawForecastView, RawItem, RawMovement, RawProduct, RawStock,
    RawTenant, STOCK_COLUMNS, TENANT_COLUMNS, encode_dt, encode_tenant, encode_uuid,
  },
  schema::SCHEMA,
};

/// What happened inside the stock transaction, before decoding.
enum Outcome {
  Applied { previous: i64, quantity: i64 },
  Refused { available: i64, refusal: Refusal },
  Missing,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Tally inventory store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    let conn = tokio_rusqlite::Connection::open(path).await?;
    tracing::debug!(path = %path.display(), "opened sqlite store");
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── InventoryStore impl ─────────────────────────────────────────────────────

impl InventoryStore for SqliteStore {
  type Error = Error;

  // ── Tenants ───────────────────────────────────────────────────────────────

  async fn create_tenant(&self, input: NewTenant) -> Result<Option<Tenant>> {
    let tenant = Tenant {
      tenant_id:  TenantId::new(),
      name:       input.name,
      location:   input.location,
      phone:      input.phone,
      created_at: Utc::now(),
    };

    let id_str   = encode_tenant(tenant.tenant_id);
    let name     = tenant.name.clone();
    let location = tenant.location.clone();
    let phone    = tenant.phone.clone();
    let at_str   = encode_dt(tenant.created_at);
    let hash     = input.password_hash;

    let created = self
      .conn
      .call(move |conn| {
        let taken = conn
          .query_row(
            "SELECT 1 FROM tenants WHERE phone = ?1",
            rusqlite::params![phone],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO tenants (tenant_id, name, location, phone, password_hash, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
          rusqlite::params![id_str, name, location, phone, hash, at_str],
        )?;
        Ok(true)
      })
      .await?;

    Ok(created.then_some(tenant))
  }

  async fn get_tenant(&self, tenant: TenantId) -> Result<Option<Tenant>> {
    let id_str = encode_tenant(tenant);

    let raw: Option<RawTenant> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {TENANT_COLUMNS} FROM tenants t WHERE t.tenant_id = ?1"),
            rusqlite::params![id_str],
            RawTenant::from_row,
          )
          .optional()?)
      })
      .await?;

    Ok(raw.map(RawTenant::into_credentials).transpose()?.map(|c| c.tenant))
  }

  async fn find_credentials<'a>(&'a self, phone: &'a str) -> Result<Option<TenantCredentials>> {
    let phone = phone.to_owned();

    let raw: Option<RawTenant> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!("SELECT {TENANT_COLUMNS} FROM tenants t WHERE t.phone = ?1"),
            rusqlite::params![phone],
            RawTenant::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawTenant::into_credentials).transpose()
  }

  async fn delete_tenant(&self, tenant: TenantId) -> Result<bool> {
    let id_str = encode_tenant(tenant);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        for table in ["forecasts", "alerts", "movements", "stock", "products"] {
          tx.execute(
            &format!("DELETE FROM {table} WHERE tenant_id = ?1"),
            rusqlite::params![id_str],
          )?;
        }
        let n = tx.execute(
          "DELETE FROM tenants WHERE tenant_id = ?1",
          rusqlite::params![id_str],
        )?;
        tx.commit()?;
        Ok(n > 0)
      })
      .await?;

    Ok(deleted)
  }

  // ── Products ──────────────────────────────────────────────────────────────

  async fn add_product(&self, tenant: TenantId, input: NewProduct) -> Result<Option<InventoryItem>> {
    let now = Utc::now();
    let product = Product {
      product_id:    Uuid::new_v4(),
      tenant_id:     tenant,
      barcode:       input.barcode,
      name:          input.name,
      price:         input.price,
      category:      input.category,
      reorder_point: input.reorder_point,
      created_at:    now,
    };
    let stock = StockRecord {
      product_id:   product.product_id,
      tenant_id:    tenant,
      quantity:     input.initial_quantity,
      last_updated: now,
    };

    let tenant_str    = encode_tenant(tenant);
    let id_str        = encode_uuid(product.product_id);
    let barcode       = product.barcode.clone();
    let name          = product.name.clone();
    let price_str     = product.price.to_string();
    let category      = product.category.clone();
    let reorder_point = product.reorder_point;
    let at_str        = encode_dt(now);
    let quantity      = stock.quantity;
    let movement_str  = encode_uuid(Uuid::new_v4());

    let created = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
        let taken = tx
          .query_row(
            "SELECT 1 FROM products WHERE tenant_id = ?1 AND barcode = ?2",
            rusqlite::params![tenant_str, barcode],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if taken {
          return Ok(false);
        }

        tx.execute(
          "INSERT INTO products (
             product_id, tenant_id, barcode, name, price,
             category, reorder_point, created_at
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            tenant_str,
            barcode,
            name,
            price_str,
            category,
            reorder_point,
            at_str,
          ],
        )?;
        tx.execute(
          "INSERT INTO stock (product_id, tenant_id, quantity, last_updated)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![id_str, tenant_str, quantity, at_str],
        )?;
        if quantity > 0 {
          tx.execute(
            "INSERT INTO movements (movement_id, product_id, tenant_id, quantity, direction, created_at)
             VALUES (?1, ?2, ?3, ?4, 'in', ?5)",
            rusqlite::params![movement_str, id_str, tenant_str, quantity, at_str],
          )?;
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(created.then(|| InventoryItem::new(product, &stock)))
  }

  async fn get_product(&self, tenant: TenantId, product_id: Uuid) -> Result<Option<Product>> {
    let tenant_str = encode_tenant(tenant);
    let id_str = encode_uuid(product_id);

    let raw: Option<RawProduct> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {PRODUCT_COLUMNS} FROM products p
               WHERE p.tenant_id = ?1 AND p.product_id = ?2"
            ),
            rusqlite::params![tenant_str, id_str],
            |row| RawProduct::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProduct::into_product).transpose()
  }

  async fn find_product_by_barcode<'a>(
    &'a self,
    tenant: TenantId,
    barcode: &'a str,
  ) -> Result<Option<Product>> {
    let tenant_str = encode_tenant(tenant);
    let barcode = barcode.to_owned();

    let raw: Option<RawProduct> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {PRODUCT_COLUMNS} FROM products p
               WHERE p.tenant_id = ?1 AND p.barcode = ?2"
            ),
            rusqlite::params![tenant_str, barcode],
            |row| RawProduct::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawProduct::into_product).transpose()
  }

  async fn list_products(&self, tenant: TenantId, offset: usize, limit: usize) -> Result<ProductPage> {
    let tenant_str = encode_tenant(tenant);
    let offset_val = i64::try_from(offset).unwrap_or(i64::MAX);
    let limit_val  = i64::try_from(limit).unwrap_or(i64::MAX);

    let (total, raws): (i64, Vec<RawItem>) = self
      .conn
      .call(move |conn| {
        let total: i64 = conn.query_row(
          "SELECT COUNT(*) FROM products WHERE tenant_id = ?1",
          rusqlite::params![tenant_str],
          |row| row.get(0),
        )?;

        let mut stmt = conn.prepare(&format!(
          "SELECT {PRODUCT_COLUMNS}, {STOCK_COLUMNS}
           FROM products p
           JOIN stock s ON s.product_id = p.product_id
           WHERE p.tenant_id = ?1
           ORDER BY p.created_at, p.product_id
           LIMIT ?2 OFFSET ?3"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![tenant_str, limit_val, offset_val],
            RawItem::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;

        Ok((total, rows))
      })
      .await?;

    Ok(ProductPage {
      total:    u64::try_from(total).unwrap_or_default(),
      products: raws.into_iter().map(RawItem::into_item).collect::<Result<_>>()?,
    })
  }

  async fn update_product(
    &self,
    tenant: TenantId,
    product_id: Uuid,
    patch: ProductPatch,
  ) -> Result<Option<Product>> {
    let Some(mut product) = self.get_product(tenant, product_id).await? else {
      return Ok(None);
    };
    patch.apply(&mut product);

    let tenant_str    = encode_tenant(tenant);
    let id_str        = encode_uuid(product_id);
    let name          = product.name.clone();
    let price_str     = product.price.to_string();
    let category      = product.category.clone();
    let reorder_point = product.reorder_point;

    let updated = self
      .conn
      .call(move |conn| {
        let n = conn.execute(
          "UPDATE products
           SET name = ?3, price = ?4, category = ?5, reorder_point = ?6
           WHERE tenant_id = ?1 AND product_id = ?2",
          rusqlite::params![tenant_str, id_str, name, price_str, category, reorder_point],
        )?;
        Ok(n > 0)
      })
      .await?;

    Ok(updated.then_some(product))
  }

  async fn delete_product(&self, tenant: TenantId, product_id: Uuid) -> Result<bool> {
    let tenant_str = encode_tenant(tenant);
    let id_str = encode_uuid(product_id);

    let deleted = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;
        let owned = tx
          .query_row(
            "SELECT 1 FROM products WHERE tenant_id = ?1 AND product_id = ?2",
            rusqlite::params![tenant_str, id_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if !owned {
          return Ok(false);
        }

        // Dependents first; the foreign keys refuse anything else.
        for table in ["forecasts", "alerts", "movements", "stock", "products"] {
          tx.execute(
            &format!("DELETE FROM {table} WHERE product_id = ?1"),
            rusqlite::params![id_str],
          )?;
        }
        tx.commit()?;
        Ok(true)
      })
      .await?;

    Ok(deleted)
  }

  // ── Stock ─────────────────────────────────────────────────────────────────

  async fn get_stock(&self, tenant: TenantId, product_id: Uuid) -> Result<Option<StockRecord>> {
    let tenant_str = encode_tenant(tenant);
    let id_str = encode_uuid(product_id);

    let raw: Option<RawStock> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {STOCK_COLUMNS} FROM stock s
               WHERE s.tenant_id = ?1 AND s.product_id = ?2"
            ),
            rusqlite::params![tenant_str, id_str],
            |row| RawStock::from_row(row, 0),
          )
          .optional()?)
      })
      .await?;

    raw.map(RawStock::into_stock).transpose()
  }

  async fn list_inventory(&self, tenant: TenantId, below_reorder_point: bool) -> Result<Vec<InventoryItem>> {
    let tenant_str = encode_tenant(tenant);

    let raws: Vec<RawItem> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {PRODUCT_COLUMNS}, {STOCK_COLUMNS}
           FROM products p
           JOIN stock s ON s.product_id = p.product_id
           WHERE p.tenant_id = ?1
             AND (?2 = 0 OR s.quantity < p.reorder_point)
           ORDER BY p.name, p.product_id"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![tenant_str, below_reorder_point],
            RawItem::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawItem::into_item).collect()
  }

  async fn apply_stock_change(
    &self,
    tenant: TenantId,
    product_id: Uuid,
    change: StockChange,
  ) -> Result<StockUpdate> {
    let now          = Utc::now();
    let movement_id  = Uuid::new_v4();
    let tenant_str   = encode_tenant(tenant);
    let id_str       = encode_uuid(product_id);
    let movement_str = encode_uuid(movement_id);
    let at_str       = encode_dt(now);

    let outcome = self
      .conn
      .call(move |conn| {
        // IMMEDIATE takes the write lock before the read, so the
        // availability check cannot go stale before the update.
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let current: Option<i64> = tx
          .query_row(
            "SELECT quantity FROM stock WHERE tenant_id = ?1 AND product_id = ?2",
            rusqlite::params![tenant_str, id_str],
            |row| row.get(0),
          )
          .optional()?;
        let Some(previous) = current else {
          return Ok(Outcome::Missing);
        };
        let quantity = match change.resolve(previous) {
          Ok(quantity) => quantity,
          Err(refusal) => return Ok(Outcome::Refused { available: previous, refusal }),
        };

        tx.execute(
          "UPDATE stock SET quantity = ?3, last_updated = ?4
           WHERE tenant_id = ?1 AND product_id = ?2",
          rusqlite::params![tenant_str, id_str, quantity, at_str],
        )?;

        let delta = quantity - previous;
        if delta != 0 {
          let direction = if delta > 0 { Direction::In } else { Direction::Out };
          tx.execute(
            "INSERT INTO movements (movement_id, product_id, tenant_id, quantity, direction, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
              movement_str,
              id_str,
              tenant_str,
              delta.abs(),
              direction.to_string(),
              at_str,
            ],
          )?;
        }

        tx.commit()?;
        Ok(Outcome::Applied { previous, quantity })
      })
      .await?;

    Ok(match outcome {
      Outcome::Missing => StockUpdate::Missing,
      Outcome::Refused { available, refusal: Refusal::Insufficient } => {
        StockUpdate::Insufficient { available }
      }
      Outcome::Refused { available, refusal: Refusal::Overflow } => {
        StockUpdate::Overflow { available }
      }
      Outcome::Applied { previous, quantity } => {
        let delta = quantity - previous;
        let movement = (delta != 0).then(|| Movement {
          movement_id,
          product_id,
          tenant_id: tenant,
          quantity: delta.abs(),
          direction: if delta > 0 { Direction::In } else { Direction::Out },
          created_at: now,
        });
        StockUpdate::Applied(AppliedChange {
          stock: StockRecord {
            product_id,
            tenant_id: tenant,
            quantity,
            last_updated: now,
          },
          previous,
          movement,
        })
      }
    })
  }

  async fn movements_since(
    &self,
    tenant: TenantId,
    product_id: Uuid,
    direction: Direction,
    since: DateTime<Utc>,
  ) -> Result<Vec<Movement>> {
    let tenant_str    = encode_tenant(tenant);
    let id_str        = encode_uuid(product_id);
    let direction_str = direction.to_string();
    let since_str     = encode_dt(since);

    let raws: Vec<RawMovement> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {MOVEMENT_COLUMNS} FROM movements
           WHERE tenant_id = ?1 AND product_id = ?2
             AND direction = ?3 AND created_at >= ?4
           ORDER BY created_at, movement_id"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![tenant_str, id_str, direction_str, since_str],
            RawMovement::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawMovement::into_movement).collect()
  }

  // ── Alerts ────────────────────────────────────────────────────────────────

  async fn raise_alert(&self, tenant: TenantId, input: NewAlert) -> Result<Option<Alert>> {
    let alert = Alert {
      alert_id:     Uuid::new_v4(),
      tenant_id:    tenant,
      product_id:   input.product_id,
      kind:         input.kind,
      message:      input.message,
      acknowledged: false,
      created_at:   Utc::now(),
    };

    let id_str         = encode_uuid(alert.alert_id);
    let tenant_str     = encode_tenant(tenant);
    let product_id_str = encode_uuid(alert.product_id);
    let kind_str       = alert.kind.to_string();
    let message        = alert.message.clone();
    let at_str         = encode_dt(alert.created_at);

    let raised = self
      .conn
      .call(move |conn| {
        let open = conn
          .query_row(
            "SELECT 1 FROM alerts
             WHERE tenant_id = ?1 AND product_id = ?2
               AND alert_type = ?3 AND acknowledged = 0",
            rusqlite::params![tenant_str, product_id_str, kind_str],
            |_| Ok(()),
          )
          .optional()?
          .is_some();
        if open {
          return Ok(false);
        }
        conn.execute(
          "INSERT INTO alerts (alert_id, tenant_id, product_id, alert_type, message, acknowledged, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, 0, ?6)",
          rusqlite::params![id_str, tenant_str, product_id_str, kind_str, message, at_str],
        )?;
        Ok(true)
      })
      .await?;

    Ok(raised.then_some(alert))
  }

  async fn list_alerts(&self, tenant: TenantId, filter: AlertFilter) -> Result<Vec<AlertView>> {
    let tenant_str   = encode_tenant(tenant);
    let kind_str     = filter.kind.map(|k| k.to_string());
    let acknowledged = filter.acknowledged;

    let raws: Vec<RawAlertView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {ALERT_COLUMNS}, p.name, p.barcode
           FROM alerts a
           JOIN products p ON p.product_id = a.product_id
           WHERE a.tenant_id = ?1
             AND (?2 IS NULL OR a.alert_type = ?2)
             AND (?3 IS NULL OR a.acknowledged = ?3)
           ORDER BY a.created_at DESC, a.alert_id"
        ))?;
        let rows = stmt
          .query_map(
            rusqlite::params![tenant_str, kind_str, acknowledged],
            RawAlertView::from_row,
          )?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawAlertView::into_view).collect()
  }

  async fn acknowledge_alert(&self, tenant: TenantId, alert_id: Uuid) -> Result<bool> {
    let tenant_str = encode_tenant(tenant);
    let id_str = encode_uuid(alert_id);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE alerts SET acknowledged = 1 WHERE tenant_id = ?1 AND alert_id = ?2",
          rusqlite::params![tenant_str, id_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  async fn delete_alert(&self, tenant: TenantId, alert_id: Uuid) -> Result<bool> {
    let tenant_str = encode_tenant(tenant);
    let id_str = encode_uuid(alert_id);

    let n = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM alerts WHERE tenant_id = ?1 AND alert_id = ?2",
          rusqlite::params![tenant_str, id_str],
        )?)
      })
      .await?;

    Ok(n > 0)
  }

  // ── Forecasts ─────────────────────────────────────────────────────────────

  async fn upsert_forecast(
    &self,
    tenant: TenantId,
    result: ForecastResult,
    at: DateTime<Utc>,
  ) -> Result<Forecast> {
    let forecast = Forecast {
      product_id:          result.product_id,
      tenant_id:           tenant,
      days_until_stockout: result.days_until_stockout,
      confidence:          result.confidence,
      avg_daily_sales:     result.avg_daily_sales,
      recommendation:      result.recommendation,
      last_recalculated:   at,
    };

    let id_str         = encode_uuid(forecast.product_id);
    let tenant_str     = encode_tenant(tenant);
    let days           = forecast.days_until_stockout;
    let confidence     = forecast.confidence;
    let avg            = forecast.avg_daily_sales;
    let recommendation = forecast.recommendation.clone();
    let at_str         = encode_dt(at);

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO forecasts (
             product_id, tenant_id, days_until_stockout, confidence,
             avg_daily_sales, recommendation, last_recalculated
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
           ON CONFLICT (product_id) DO UPDATE SET
             days_until_stockout = excluded.days_until_stockout,
             confidence          = excluded.confidence,
             avg_daily_sales     = excluded.avg_daily_sales,
             recommendation      = excluded.recommendation,
             last_recalculated   = excluded.last_recalculated",
          rusqlite::params![id_str, tenant_str, days, confidence, avg, recommendation, at_str],
        )?;
        Ok(())
      })
      .await?;

    Ok(forecast)
  }

  async fn get_forecast(&self, tenant: TenantId, product_id: Uuid) -> Result<Option<Forecast>> {
    let tenant_str = encode_tenant(tenant);
    let id_str = encode_uuid(product_id);

    let raw: Option<RawForecast> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            &format!(
              "SELECT {FORECAST_COLUMNS} FROM forecasts f
               WHERE f.tenant_id = ?1 AND f.product_id = ?2"
            ),
            rusqlite::params![tenant_str, id_str],
            RawForecast::from_row,
          )
          .optional()?)
      })
      .await?;

    raw.map(RawForecast::into_forecast).transpose()
  }

  async fn list_forecasts(&self, tenant: TenantId) -> Result<Vec<ForecastView>> {
    let tenant_str = encode_tenant(tenant);

    let raws: Vec<RawForecastView> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {FORECAST_COLUMNS}, p.name, p.barcode
           FROM forecasts f
           JOIN products p ON p.product_id = f.product_id
           WHERE f.tenant_id = ?1
           ORDER BY f.days_until_stockout IS NULL, f.days_until_stockout, p.name"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![tenant_str], RawForecastView::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawForecastView::into_view).collect()
  }
}
