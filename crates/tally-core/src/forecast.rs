//! Stockout projection from the trailing sales window.
//!
//! The heuristic is fixed: average the per-day sales totals of the last
//! [`WINDOW_DAYS`] days, divide current stock by that average, and grade the
//! result. Confidence falls with day-to-day variability. A single day of
//! data gets a flat [`SINGLE_DAY_CONFIDENCE`]; that number is a convention,
//! not a statistical estimate.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use strum::Display;
use uuid::Uuid;

use crate::{
  stock::{Direction, Movement},
  tenant::TenantId,
};

pub const WINDOW_DAYS: i64 = 30;
pub const SINGLE_DAY_CONFIDENCE: f64 = 0.5;

const URGENT_DAYS: i64 = 3;
const THIS_WEEK_DAYS: i64 = 7;
const TWO_WEEKS_DAYS: i64 = 14;

/// Deterministic reorder advice derived from a projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum Recommendation {
  #[strum(to_string = "No sales history available")]
  NoHistory,
  #[strum(to_string = "Already below reorder point, reorder now")]
  BelowReorderPoint,
  #[strum(to_string = "Insufficient data, monitor sales")]
  Monitor,
  #[strum(to_string = "Urgent reorder: stockout expected within 3 days")]
  Urgent,
  #[strum(to_string = "Schedule reorder this week")]
  ThisWeek,
  #[strum(to_string = "Reorder within the next two weeks")]
  WithinTwoWeeks,
  #[strum(to_string = "Stock healthy")]
  Healthy,
}

impl Recommendation {
  pub fn grade(
    days_until_stockout: Option<i64>,
    current_stock: i64,
    reorder_point: i64,
  ) -> Self {
    if current_stock < reorder_point {
      return Self::BelowReorderPoint;
    }
    match days_until_stockout {
      None => Self::Monitor,
      Some(d) if d <= URGENT_DAYS => Self::Urgent,
      Some(d) if d <= THIS_WEEK_DAYS => Self::ThisWeek,
      Some(d) if d <= TWO_WEEKS_DAYS => Self::WithinTwoWeeks,
      Some(_) => Self::Healthy,
    }
  }
}

/// A freshly computed projection, not yet persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastResult {
  pub product_id:          Uuid,
  pub days_until_stockout: Option<i64>,
  /// In `[0, 1]`, rounded to two decimals.
  pub confidence:          f64,
  /// Rounded to two decimals.
  pub avg_daily_sales:     f64,
  pub recommendation:      String,
}

/// The persisted forecast; one per product, overwritten on recalculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
  pub product_id:          Uuid,
  pub tenant_id:           TenantId,
  pub days_until_stockout: Option<i64>,
  pub confidence:          f64,
  pub avg_daily_sales:     f64,
  pub recommendation:      String,
  pub last_recalculated:   DateTime<Utc>,
}

/// A forecast joined with the product it concerns.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastView {
  #[serde(flatten)]
  pub forecast:        Forecast,
  pub product_name:    String,
  pub product_barcode: String,
}

/// Start of the sales window for an evaluation at `now`.
pub fn window_start(now: DateTime<Utc>) -> DateTime<Utc> {
  now - Duration::days(WINDOW_DAYS)
}

/// Project a stockout from `sales`, which the caller has already limited to
/// the window. Movements in the `in` direction are ignored.
pub fn project(
  product_id: Uuid,
  sales: &[Movement],
  current_stock: i64,
  reorder_point: i64,
) -> ForecastResult {
  let totals = daily_totals(sales);

  if totals.is_empty() {
    return ForecastResult {
      product_id,
      days_until_stockout: None,
      confidence: 0.0,
      avg_daily_sales: 0.0,
      recommendation: Recommendation::NoHistory.to_string(),
    };
  }

  let avg = totals.iter().sum::<f64>() / totals.len() as f64;

  let confidence = if totals.len() > 1 {
    (1.0 - sample_std_dev(&totals, avg) / (avg + 1.0)).clamp(0.0, 1.0)
  } else {
    SINGLE_DAY_CONFIDENCE
  };

  let days_until_stockout =
    (avg > 0.0).then(|| (current_stock as f64 / avg).floor() as i64);

  let recommendation =
    Recommendation::grade(days_until_stockout, current_stock, reorder_point);

  ForecastResult {
    product_id,
    days_until_stockout,
    confidence: round2(confidence),
    avg_daily_sales: round2(avg),
    recommendation: recommendation.to_string(),
  }
}

/// Sum outgoing quantities per calendar day (UTC), one entry per day with at
/// least one sale.
fn daily_totals(sales: &[Movement]) -> Vec<f64> {
  let mut by_day: BTreeMap<NaiveDate, f64> = BTreeMap::new();
  for m in sales.iter().filter(|m| m.direction == Direction::Out) {
    *by_day.entry(m.created_at.date_naive()).or_default() += m.quantity as f64;
  }
  by_day.into_values().collect()
}

fn sample_std_dev(values: &[f64], mean: f64) -> f64 {
  let n = values.len();
  if n < 2 {
    return 0.0;
  }
  let sum_sq: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
  (sum_sq / (n - 1) as f64).sqrt()
}

fn round2(x: f64) -> f64 { (x * 100.0).round() / 100.0 }
