//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as fixed-width RFC 3339 strings (microseconds, `Z`)
//! so that string comparison in SQL orders them chronologically. UUIDs are
//! stored as hyphenated lowercase strings, prices as decimal strings.

use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use rust_decimal::Decimal;
use tally_core::{
  alert::{Alert, AlertKind, AlertView},
  forecast::{Forecast, ForecastView},
  product::Product,
  stock::{Direction, InventoryItem, Movement, StockRecord},
  tenant::{Tenant, TenantCredentials, TenantId},
};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Scalars ─────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

pub fn encode_tenant(id: TenantId) -> String { encode_uuid(id.0) }

pub fn decode_tenant(s: &str) -> Result<TenantId> { Ok(TenantId(decode_uuid(s)?)) }

pub fn encode_dt(dt: DateTime<Utc>) -> String {
  dt.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

pub fn decode_price(s: &str) -> Result<Decimal> { Ok(Decimal::from_str(s)?) }

/// Parse a strum-backed enum column.
fn decode_enum<T: FromStr>(column: &'static str, s: String) -> Result<T> {
  s.parse().map_err(|_| Error::Decode { column, value: s })
}

// ─── Row types ───────────────────────────────────────────────────────────────
//
// Raw strings read directly from rows. Column order for each type is fixed by
// the matching `*_COLUMNS` constant; `from_row` reads starting at `offset` so
// joined selects can place several raw types side by side.

pub const TENANT_COLUMNS: &str =
  "t.tenant_id, t.name, t.location, t.phone, t.created_at, t.password_hash";

pub struct RawTenant {
  pub tenant_id:     String,
  pub name:          String,
  pub location:      Option<String>,
  pub phone:         String,
  pub created_at:    String,
  pub password_hash: String,
}

impl RawTenant {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      tenant_id:     row.get(0)?,
      name:          row.get(1)?,
      location:      row.get(2)?,
      phone:         row.get(3)?,
      created_at:    row.get(4)?,
      password_hash: row.get(5)?,
    })
  }

  pub fn into_credentials(self) -> Result<TenantCredentials> {
    Ok(TenantCredentials {
      tenant:        Tenant {
        tenant_id:  decode_tenant(&self.tenant_id)?,
        name:       self.name,
        location:   self.location,
        phone:      self.phone,
        created_at: decode_dt(&self.created_at)?,
      },
      password_hash: self.password_hash,
    })
  }
}

pub const PRODUCT_COLUMNS: &str = "p.product_id, p.tenant_id, p.barcode, p.name, \
   p.price, p.category, p.reorder_point, p.created_at";

const PRODUCT_WIDTH: usize = 8;

pub struct RawProduct {
  pub product_id:    String,
  pub tenant_id:     String,
  pub barcode:       String,
  pub name:          String,
  pub price:         String,
  pub category:      Option<String>,
  pub reorder_point: i64,
  pub created_at:    String,
}

impl RawProduct {
  pub fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:    row.get(offset)?,
      tenant_id:     row.get(offset + 1)?,
      barcode:       row.get(offset + 2)?,
      name:          row.get(offset + 3)?,
      price:         row.get(offset + 4)?,
      category:      row.get(offset + 5)?,
      reorder_point: row.get(offset + 6)?,
      created_at:    row.get(offset + 7)?,
    })
  }

  pub fn into_product(self) -> Result<Product> {
    Ok(Product {
      product_id:    decode_uuid(&self.product_id)?,
      tenant_id:     decode_tenant(&self.tenant_id)?,
      barcode:       self.barcode,
      name:          self.name,
      price:         decode_price(&self.price)?,
      category:      self.category,
      reorder_point: self.reorder_point,
      created_at:    decode_dt(&self.created_at)?,
    })
  }
}

pub const STOCK_COLUMNS: &str = "s.product_id, s.tenant_id, s.quantity, s.last_updated";

pub struct RawStock {
  pub product_id:   String,
  pub tenant_id:    String,
  pub quantity:     i64,
  pub last_updated: String,
}

impl RawStock {
  pub fn from_row(row: &rusqlite::Row<'_>, offset: usize) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:   row.get(offset)?,
      tenant_id:    row.get(offset + 1)?,
      quantity:     row.get(offset + 2)?,
      last_updated: row.get(offset + 3)?,
    })
  }

  pub fn into_stock(self) -> Result<StockRecord> {
    Ok(StockRecord {
      product_id:   decode_uuid(&self.product_id)?,
      tenant_id:    decode_tenant(&self.tenant_id)?,
      quantity:     self.quantity,
      last_updated: decode_dt(&self.last_updated)?,
    })
  }
}

/// A `products` row joined with its `stock` row, selected as
/// `PRODUCT_COLUMNS, STOCK_COLUMNS`.
pub struct RawItem {
  pub product: RawProduct,
  pub stock:   RawStock,
}

impl RawItem {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      product: RawProduct::from_row(row, 0)?,
      stock:   RawStock::from_row(row, PRODUCT_WIDTH)?,
    })
  }

  pub fn into_item(self) -> Result<InventoryItem> {
    let product = self.product.into_product()?;
    let stock = self.stock.into_stock()?;
    Ok(InventoryItem::new(product, &stock))
  }
}

pub const MOVEMENT_COLUMNS: &str =
  "movement_id, product_id, tenant_id, quantity, direction, created_at";

pub struct RawMovement {
  pub movement_id: String,
  pub product_id:  String,
  pub tenant_id:   String,
  pub quantity:    i64,
  pub direction:   String,
  pub created_at:  String,
}

impl RawMovement {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      movement_id: row.get(0)?,
      product_id:  row.get(1)?,
      tenant_id:   row.get(2)?,
      quantity:    row.get(3)?,
      direction:   row.get(4)?,
      created_at:  row.get(5)?,
    })
  }

  pub fn into_movement(self) -> Result<Movement> {
    Ok(Movement {
      movement_id: decode_uuid(&self.movement_id)?,
      product_id:  decode_uuid(&self.product_id)?,
      tenant_id:   decode_tenant(&self.tenant_id)?,
      quantity:    self.quantity,
      direction:   decode_enum::<Direction>("direction", self.direction)?,
      created_at:  decode_dt(&self.created_at)?,
    })
  }
}

/// Selected as `ALERT_COLUMNS, p.name, p.barcode`.
pub const ALERT_COLUMNS: &str = "a.alert_id, a.tenant_id, a.product_id, a.alert_type, \
   a.message, a.acknowledged, a.created_at";

pub struct RawAlert {
  pub alert_id:     String,
  pub tenant_id:    String,
  pub product_id:   String,
  pub alert_type:   String,
  pub message:      String,
  pub acknowledged: bool,
  pub created_at:   String,
}

impl RawAlert {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      alert_id:     row.get(0)?,
      tenant_id:    row.get(1)?,
      product_id:   row.get(2)?,
      alert_type:   row.get(3)?,
      message:      row.get(4)?,
      acknowledged: row.get(5)?,
      created_at:   row.get(6)?,
    })
  }

  pub fn into_alert(self) -> Result<Alert> {
    Ok(Alert {
      alert_id:     decode_uuid(&self.alert_id)?,
      tenant_id:    decode_tenant(&self.tenant_id)?,
      product_id:   decode_uuid(&self.product_id)?,
      kind:         decode_enum::<AlertKind>("alert_type", self.alert_type)?,
      message:      self.message,
      acknowledged: self.acknowledged,
      created_at:   decode_dt(&self.created_at)?,
    })
  }
}

pub struct RawAlertView {
  pub alert:           RawAlert,
  pub product_name:    String,
  pub product_barcode: String,
}

impl RawAlertView {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      alert:           RawAlert::from_row(row)?,
      product_name:    row.get(7)?,
      product_barcode: row.get(8)?,
    })
  }

  pub fn into_view(self) -> Result<AlertView> {
    Ok(AlertView {
      alert:           self.alert.into_alert()?,
      product_name:    self.product_name,
      product_barcode: self.product_barcode,
    })
  }
}

/// Selected as `FORECAST_COLUMNS[, p.name, p.barcode]`.
pub const FORECAST_COLUMNS: &str = "f.product_id, f.tenant_id, f.days_until_stockout, \
   f.confidence, f.avg_daily_sales, f.recommendation, f.last_recalculated";

pub struct RawForecast {
  pub product_id:          String,
  pub tenant_id:           String,
  pub days_until_stockout: Option<i64>,
  pub confidence:          f64,
  pub avg_daily_sales:     f64,
  pub recommendation:      String,
  pub last_recalculated:   String,
}

impl RawForecast {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      product_id:          row.get(0)?,
      tenant_id:           row.get(1)?,
      days_until_stockout: row.get(2)?,
      confidence:          row.get(3)?,
      avg_daily_sales:     row.get(4)?,
      recommendation:      row.get(5)?,
      last_recalculated:   row.get(6)?,
    })
  }

  pub fn into_forecast(self) -> Result<Forecast> {
    Ok(Forecast {
      product_id:          decode_uuid(&self.product_id)?,
      tenant_id:           decode_tenant(&self.tenant_id)?,
      days_until_stockout: self.days_until_stockout,
      confidence:          self.confidence,
      avg_daily_sales:     self.avg_daily_sales,
      recommendation:      self.recommendation,
      last_recalculated:   decode_dt(&self.last_recalculated)?,
    })
  }
}

pub struct RawForecastView {
  pub forecast:        RawForecast,
  pub product_name:    String,
  pub product_barcode: String,
}

impl RawForecastView {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      forecast:        RawForecast::from_row(row)?,
      product_name:    row.get(7)?,
      product_barcode: row.get(8)?,
    })
  }

  pub fn into_view(self) -> Result<ForecastView> {
    Ok(ForecastView {
      forecast:        self.forecast.into_forecast()?,
      product_name:    self.product_name,
      product_barcode: self.product_barcode,
    })
  }
}
