//! Products and the validation applied before they reach storage.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, tenant::TenantId};

pub const DEFAULT_REORDER_POINT: i64 = 20;

const BARCODE_LEN: std::ops::RangeInclusive<usize> = 4..=50;
const NAME_MAX_LEN: usize = 255;

/// A registered product. Stock lives in its own record, see
/// [`crate::stock::StockRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
  pub product_id:    Uuid,
  pub tenant_id:     TenantId,
  /// Unique within the tenant.
  pub barcode:       String,
  pub name:          String,
  pub price:         Decimal,
  pub category:      Option<String>,
  /// Stock strictly below this value is critical.
  pub reorder_point: i64,
  pub created_at:    DateTime<Utc>,
}

/// Trim a scanned barcode and check its length.
pub fn normalize_barcode(raw: &str) -> Result<String> {
  let barcode = raw.trim();
  if !BARCODE_LEN.contains(&barcode.chars().count()) {
    return Err(Error::invalid(
      "barcode",
      format!(
        "must be between {} and {} characters",
        BARCODE_LEN.start(),
        BARCODE_LEN.end()
      ),
    ));
  }
  Ok(barcode.to_owned())
}

fn normalize_name(raw: &str) -> Result<String> {
  let name = raw.trim();
  if name.is_empty() || name.chars().count() > NAME_MAX_LEN {
    return Err(Error::invalid(
      "name",
      format!("must be between 1 and {NAME_MAX_LEN} characters"),
    ));
  }
  Ok(name.to_owned())
}

fn check_price(price: Decimal) -> Result<Decimal> {
  if price <= Decimal::ZERO {
    return Err(Error::invalid("price", "must be greater than zero"));
  }
  Ok(price)
}

fn check_reorder_point(reorder_point: i64) -> Result<i64> {
  if reorder_point <= 0 {
    return Err(Error::invalid("reorder_point", "must be greater than zero"));
  }
  Ok(reorder_point)
}

fn normalize_category(raw: Option<String>) -> Option<String> {
  raw
    .map(|c| c.trim().to_owned())
    .filter(|c| !c.is_empty())
}

// ─── NewProduct ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::InventoryStore::add_product`].
#[derive(Debug, Clone, Deserialize)]
pub struct NewProduct {
  pub barcode:          String,
  pub name:             String,
  pub price:            Decimal,
  #[serde(default)]
  pub category:         Option<String>,
  #[serde(default = "default_reorder_point")]
  pub reorder_point:    i64,
  /// Opening stock; recorded as an `in` movement when non-zero.
  #[serde(default)]
  pub initial_quantity: i64,
}

fn default_reorder_point() -> i64 { DEFAULT_REORDER_POINT }

impl NewProduct {
  /// Convenience constructor with defaults for every optional field.
  pub fn new(
    barcode: impl Into<String>,
    name: impl Into<String>,
    price: Decimal,
  ) -> Self {
    Self {
      barcode: barcode.into(),
      name: name.into(),
      price,
      category: None,
      reorder_point: DEFAULT_REORDER_POINT,
      initial_quantity: 0,
    }
  }

  pub fn with_stock(mut self, quantity: i64) -> Self {
    self.initial_quantity = quantity;
    self
  }

  pub fn with_reorder_point(mut self, reorder_point: i64) -> Self {
    self.reorder_point = reorder_point;
    self
  }

  /// Trim text fields and reject values storage must never see.
  pub fn validated(self) -> Result<Self> {
    if self.initial_quantity < 0 {
      return Err(Error::invalid("initial_quantity", "must not be negative"));
    }
    Ok(Self {
      barcode:          normalize_barcode(&self.barcode)?,
      name:             normalize_name(&self.name)?,
      price:            check_price(self.price)?,
      category:         normalize_category(self.category),
      reorder_point:    check_reorder_point(self.reorder_point)?,
      initial_quantity: self.initial_quantity,
    })
  }
}

// ─── ProductPatch ────────────────────────────────────────────────────────────

/// Partial update for a product. `None` leaves the field untouched.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductPatch {
  pub name:          Option<String>,
  pub price:         Option<Decimal>,
  pub category:      Option<String>,
  pub reorder_point: Option<i64>,
}

impl ProductPatch {
  pub fn validated(self) -> Result<Self> {
    Ok(Self {
      name:          self.name.as_deref().map(normalize_name).transpose()?,
      price:         self.price.map(check_price).transpose()?,
      category:      normalize_category(self.category),
      reorder_point: self.reorder_point.map(check_reorder_point).transpose()?,
    })
  }

  pub fn apply(self, product: &mut Product) {
    if let Some(name) = self.name {
      product.name = name;
    }
    if let Some(price) = self.price {
      product.price = price;
    }
    if let Some(category) = self.category {
      product.category = Some(category);
    }
    if let Some(reorder_point) = self.reorder_point {
      product.reorder_point = reorder_point;
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn barcode_is_trimmed() {
    assert_eq!(normalize_barcode("  12345 \n").unwrap(), "12345");
  }

  #[test]
  fn short_barcode_is_rejected() {
    let err = normalize_barcode("123").unwrap_err();
    assert!(matches!(err, Error::InvalidInput { field: "barcode", .. }));
  }

  #[test]
  fn new_product_requires_positive_price() {
    let err = NewProduct::new("12345", "Milk", Decimal::ZERO)
      .validated()
      .unwrap_err();
    assert!(matches!(err, Error::InvalidInput { field: "price", .. }));
  }

  #[test]
  fn new_product_rejects_negative_opening_stock() {
    let err = NewProduct::new("12345", "Milk", Decimal::ONE)
      .with_stock(-1)
      .validated()
      .unwrap_err();
    assert!(matches!(err, Error::InvalidInput { field: "initial_quantity", .. }));
  }

  #[test]
  fn blank_category_becomes_none() {
    let mut input = NewProduct::new("12345", " Milk ", Decimal::ONE);
    input.category = Some("   ".into());
    let p = input.validated().unwrap();
    assert_eq!(p.name, "Milk");
    assert_eq!(p.category, None);
  }

  #[test]
  fn patch_rejects_zero_reorder_point() {
    let patch = ProductPatch { reorder_point: Some(0), ..Default::default() };
    assert!(patch.validated().is_err());
  }
}
