//! Engine and router tests against an in-memory SQLite store.

use std::sync::{Arc, Mutex};

use axum::{
  Extension, Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use rust_decimal::Decimal;
use serde_json::{Value, json};
use tally_core::{
  Error,
  alert::{AlertFilter, HealthStatus},
  engine::{EventSink, InventoryEngine, NullSink},
  event::{LiveEvent, UpdateAction},
  product::NewProduct,
  stock::{Action, Direction},
  store::InventoryStore,
  tenant::{NewTenant, TenantId},
};
use tally_live::{ConnectionRegistry, Dispatcher, Subscriber};
use tally_store_sqlite::SqliteStore;
use tower::ServiceExt as _;
use uuid::Uuid;

use crate::api_router;

// ─── Fixtures ────────────────────────────────────────────────────────────────

#[derive(Default)]
struct RecordingSink {
  events: Mutex<Vec<(TenantId, LiveEvent)>>,
}

impl RecordingSink {
  fn take(&self) -> Vec<LiveEvent> {
    self.events.lock().unwrap().drain(..).map(|(_, e)| e).collect()
  }
}

impl EventSink for RecordingSink {
  fn broadcast(&self, tenant: TenantId, event: &LiveEvent) {
    self.events.lock().unwrap().push((tenant, event.clone()));
  }
}

struct Fixture {
  engine: Arc<InventoryEngine<SqliteStore>>,
  sink:   Arc<RecordingSink>,
  tenant: TenantId,
}

async fn add_tenant(store: &SqliteStore, phone: &str) -> TenantId {
  store
    .create_tenant(NewTenant {
      name:          "Duka".into(),
      location:      None,
      phone:         phone.into(),
      password_hash: "unused".into(),
    })
    .await
    .unwrap()
    .unwrap()
    .tenant_id
}

async fn fixture() -> Fixture {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let tenant = add_tenant(&store, "0711000000").await;
  let sink = Arc::new(RecordingSink::default());
  let engine = Arc::new(InventoryEngine::new(Arc::new(store), sink.clone()));
  Fixture { engine, sink, tenant }
}

fn sugar(stock: i64) -> NewProduct {
  NewProduct::new("5012345678900", "Sugar 1kg", Decimal::new(15000, 2))
    .with_reorder_point(20)
    .with_stock(stock)
}

// ─── Mutation engine ─────────────────────────────────────────────────────────

#[tokio::test]
async fn sale_below_reorder_point_alerts_and_broadcasts_twice() {
  let f = fixture().await;
  f.engine.register_product(f.tenant, sugar(25)).await.unwrap();

  let receipt = f
    .engine
    .apply_movement(f.tenant, "5012345678900", Action::Sale, 10)
    .await
    .unwrap();

  assert_eq!(receipt.item.quantity, 15);
  assert_eq!(receipt.item.status, HealthStatus::Critical);
  let alert = receipt.alert.expect("low-stock alert raised");
  assert!(alert.message.contains("only 15 units left"));

  let events = f.sink.take();
  assert_eq!(events.len(), 2);
  match &events[0] {
    LiveEvent::InventoryUpdate(u) => {
      assert_eq!(u.quantity, 15);
      assert_eq!(u.action, UpdateAction::Sale);
      assert_eq!(u.status, HealthStatus::Critical);
    }
    other => panic!("expected inventory_update first, got {other:?}"),
  }
  match &events[1] {
    LiveEvent::AlertCreated(a) => assert_eq!(a.alert_id, alert.alert_id),
    other => panic!("expected alert_created second, got {other:?}"),
  }
}

#[tokio::test]
async fn open_alert_suppresses_a_second_one() {
  let f = fixture().await;
  f.engine.register_product(f.tenant, sugar(25)).await.unwrap();

  f.engine.apply_movement(f.tenant, "5012345678900", Action::Sale, 10).await.unwrap();
  let second = f
    .engine
    .apply_movement(f.tenant, "5012345678900", Action::Sale, 1)
    .await
    .unwrap();
  assert!(second.alert.is_none());

  let open = f
    .engine
    .list_alerts(f.tenant, AlertFilter { acknowledged: Some(false), ..Default::default() })
    .await
    .unwrap();
  assert_eq!(open.len(), 1);

  // Two from the first sale, one from the second.
  let events = f.sink.take();
  assert_eq!(events.len(), 3);
}

#[tokio::test]
async fn acknowledged_alert_allows_a_new_one() {
  let f = fixture().await;
  f.engine.register_product(f.tenant, sugar(25)).await.unwrap();
  let first = f
    .engine
    .apply_movement(f.tenant, "5012345678900", Action::Sale, 10)
    .await
    .unwrap()
    .alert
    .unwrap();

  f.engine.acknowledge_alert(f.tenant, first.alert_id).await.unwrap();
  let next = f
    .engine
    .apply_movement(f.tenant, "5012345678900", Action::Sale, 1)
    .await
    .unwrap();
  assert!(next.alert.is_some());
}

#[tokio::test]
async fn healthy_sale_raises_nothing() {
  let f = fixture().await;
  f.engine.register_product(f.tenant, sugar(100)).await.unwrap();
  let receipt = f
    .engine
    .apply_movement(f.tenant, "5012345678900", Action::Sale, 10)
    .await
    .unwrap();
  assert_eq!(receipt.item.status, HealthStatus::Healthy);
  assert!(receipt.alert.is_none());
  assert_eq!(f.sink.take().len(), 1);
}

#[tokio::test]
async fn oversell_is_refused_without_side_effects() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(5)).await.unwrap();
  let err = f
    .engine
    .apply_movement(f.tenant, "5012345678900", Action::Sale, 6)
    .await
    .unwrap_err();

  assert!(matches!(err, Error::InsufficientStock { available: 5, requested: 6 }));
  assert_eq!(f.engine.product(f.tenant, item.product.product_id).await.unwrap().quantity, 5);
  assert!(f.sink.take().is_empty());
  assert!(f.engine.list_alerts(f.tenant, AlertFilter::default()).await.unwrap().is_empty());
}

#[tokio::test]
async fn invalid_quantities_are_rejected_before_lookup() {
  let f = fixture().await;
  for quantity in [0, -3] {
    let err = f
      .engine
      .apply_movement(f.tenant, "no-such-barcode", Action::Restock, quantity)
      .await
      .unwrap_err();
    assert!(matches!(err, Error::InvalidInput { field: "quantity", .. }));
  }
}

#[tokio::test]
async fn unknown_barcode_is_not_found() {
  let f = fixture().await;
  let err = f
    .engine
    .apply_movement(f.tenant, "99999999", Action::Sale, 1)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn other_tenants_cannot_touch_stock() {
  let f = fixture().await;
  f.engine.register_product(f.tenant, sugar(25)).await.unwrap();
  let intruder = add_tenant(f.engine.store(), "0722000000").await;

  let err = f
    .engine
    .apply_movement(intruder, "5012345678900", Action::Sale, 1)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
  assert!(f.sink.take().is_empty());
}

#[tokio::test]
async fn concurrent_scans_never_oversell() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(30)).await.unwrap();

  let tasks: Vec<_> = (0..8)
    .map(|_| {
      let engine = f.engine.clone();
      let tenant = f.tenant;
      tokio::spawn(async move {
        engine.apply_movement(tenant, "5012345678900", Action::Sale, 5).await
      })
    })
    .collect();

  let mut ok = 0;
  for task in tasks {
    match task.await.unwrap() {
      Ok(_) => ok += 1,
      Err(Error::InsufficientStock { .. }) => {}
      Err(e) => panic!("unexpected error: {e}"),
    }
  }

  assert_eq!(ok, 6);
  let stock = f.engine.product(f.tenant, item.product.product_id).await.unwrap();
  assert_eq!(stock.quantity, 0);
}

#[tokio::test]
async fn manual_set_may_go_below_what_a_sale_could() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(50)).await.unwrap();
  let id = item.product.product_id;

  let receipt = f.engine.set_absolute_quantity(f.tenant, id, 0).await.unwrap();
  assert_eq!(receipt.previous_quantity, 50);
  assert_eq!(receipt.item.quantity, 0);
  assert!(receipt.movement_id.is_some());
  assert!(receipt.alert.is_some());

  let sales = f
    .engine
    .store()
    .movements_since(f.tenant, id, Direction::Out, chrono::Utc::now() - chrono::Duration::days(1))
    .await
    .unwrap();
  assert_eq!(sales.len(), 1);
  assert_eq!(sales[0].quantity, 50);

  match &f.sink.take()[0] {
    LiveEvent::InventoryUpdate(u) => assert_eq!(u.action, UpdateAction::Adjust),
    other => panic!("expected inventory_update, got {other:?}"),
  }
}

#[tokio::test]
async fn manual_set_to_same_value_writes_no_movement() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(50)).await.unwrap();
  let receipt = f
    .engine
    .set_absolute_quantity(f.tenant, item.product.product_id, 50)
    .await
    .unwrap();
  assert!(receipt.movement_id.is_none());
  assert_eq!(f.sink.take().len(), 1);
}

#[tokio::test]
async fn manual_set_rejects_negative_quantity() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(50)).await.unwrap();
  let err = f
    .engine
    .set_absolute_quantity(f.tenant, item.product.product_id, -1)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidInput { field: "quantity", .. }));
}

#[tokio::test]
async fn repeated_restocks_keep_raising_stock() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(5)).await.unwrap();
  let id = item.product.product_id;

  let mut last = 5;
  for quantity in [10, 1, 250] {
    let receipt = f
      .engine
      .apply_movement(f.tenant, "5012345678900", Action::Restock, quantity)
      .await
      .unwrap();
    assert_eq!(receipt.item.quantity, last + quantity);
    assert!(receipt.item.quantity > last);
    last = receipt.item.quantity;
  }

  let restocks = f
    .engine
    .store()
    .movements_since(f.tenant, id, Direction::In, chrono::Utc::now() - chrono::Duration::days(1))
    .await
    .unwrap();
  let quantities: Vec<_> = restocks.iter().map(|m| m.quantity).collect();
  // Opening stock first, then one movement per restock.
  assert_eq!(quantities, [5, 10, 1, 250]);
  assert_eq!(f.engine.product(f.tenant, id).await.unwrap().quantity, 266);
}

#[tokio::test]
async fn restock_past_the_largest_quantity_is_invalid() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(5)).await.unwrap();
  let id = item.product.product_id;

  let err = f
    .engine
    .apply_movement(f.tenant, "5012345678900", Action::Restock, i64::MAX)
    .await
    .unwrap_err();
  assert!(matches!(err, Error::InvalidInput { field: "quantity", .. }));
  assert_eq!(f.engine.product(f.tenant, id).await.unwrap().quantity, 5);
  assert!(f.sink.take().is_empty());

  // The store is still usable afterwards.
  let receipt = f
    .engine
    .apply_movement(f.tenant, "5012345678900", Action::Sale, 1)
    .await
    .unwrap();
  assert_eq!(receipt.item.quantity, 4);
}

#[tokio::test]
async fn manual_set_to_the_largest_quantity() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(5)).await.unwrap();
  let receipt = f
    .engine
    .set_absolute_quantity(f.tenant, item.product.product_id, i64::MAX)
    .await
    .unwrap();
  assert_eq!(receipt.item.quantity, i64::MAX);
  assert_eq!(receipt.item.status, HealthStatus::Healthy);
  assert!(receipt.alert.is_none());
  assert_eq!(f.sink.take().len(), 1);
}

#[tokio::test]
async fn huge_reorder_point_still_classifies() {
  let f = fixture().await;
  let item = f
    .engine
    .register_product(f.tenant, sugar(5).with_reorder_point(i64::MAX))
    .await
    .unwrap();
  assert_eq!(item.status, HealthStatus::Critical);

  let listed = f.engine.list_inventory(f.tenant).await.unwrap();
  assert_eq!(listed.len(), 1);
  assert_eq!(listed[0].status, HealthStatus::Critical);
}

#[tokio::test]
async fn events_reach_live_subscribers_through_the_dispatcher() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let tenant = add_tenant(&store, "0711000000").await;
  let registry = Arc::new(ConnectionRegistry::new());
  let dispatcher = Arc::new(Dispatcher::new(registry.clone()));
  let engine = InventoryEngine::new(Arc::new(store), dispatcher);

  let (sub, mut rx) = Subscriber::channel(8);
  registry.register(tenant, sub);

  engine.register_product(tenant, sugar(25)).await.unwrap();
  engine.apply_movement(tenant, "5012345678900", Action::Sale, 10).await.unwrap();

  let first: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
  let second: Value = serde_json::from_str(&rx.try_recv().unwrap()).unwrap();
  assert_eq!(first["type"], "inventory_update");
  assert_eq!(first["data"]["quantity"], 15);
  assert_eq!(first["data"]["status"], "critical");
  assert_eq!(second["type"], "alert_created");
  assert_eq!(second["data"]["alert_type"], "low_stock");
  assert!(rx.try_recv().is_err());
}

// ─── Products ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn duplicate_barcode_is_rejected() {
  let f = fixture().await;
  f.engine.register_product(f.tenant, sugar(1)).await.unwrap();
  let err = f
    .engine
    .register_product(f.tenant, NewProduct::new(" 5012345678900 ", "Other", Decimal::ONE))
    .await
    .unwrap_err();
  assert!(matches!(err, Error::DuplicateBarcode(ref b) if b == "5012345678900"));
}

#[tokio::test]
async fn deleting_a_product_removes_its_history() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(25)).await.unwrap();
  let id = item.product.product_id;
  f.engine.apply_movement(f.tenant, "5012345678900", Action::Sale, 10).await.unwrap();
  f.engine.refresh_forecast(f.tenant, id).await.unwrap();

  f.engine.delete_product(f.tenant, id).await.unwrap();

  assert!(matches!(f.engine.product(f.tenant, id).await, Err(Error::NotFound { .. })));
  assert!(f.engine.list_alerts(f.tenant, AlertFilter::default()).await.unwrap().is_empty());
  assert!(f.engine.list_forecasts(f.tenant).await.unwrap().is_empty());
  assert!(matches!(
    f.engine.delete_product(f.tenant, id).await,
    Err(Error::NotFound { .. })
  ));
}

// ─── Forecasts ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn forecast_without_sales_has_no_history() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(50)).await.unwrap();
  let result = f.engine.compute_forecast(f.tenant, item.product.product_id).await.unwrap();
  assert_eq!(result.days_until_stockout, None);
  assert_eq!(result.confidence, 0.0);
  assert_eq!(result.recommendation, "No sales history available");
}

#[tokio::test]
async fn forecast_from_a_single_day_of_sales() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(50)).await.unwrap();
  f.engine.apply_movement(f.tenant, "5012345678900", Action::Sale, 6).await.unwrap();
  f.engine.apply_movement(f.tenant, "5012345678900", Action::Sale, 4).await.unwrap();
  // Restocks are not sales.
  f.engine.apply_movement(f.tenant, "5012345678900", Action::Restock, 10).await.unwrap();

  let result = f.engine.compute_forecast(f.tenant, item.product.product_id).await.unwrap();
  assert_eq!(result.avg_daily_sales, 10.0);
  assert_eq!(result.confidence, 0.5);
  assert_eq!(result.days_until_stockout, Some(5));
  assert_eq!(result.recommendation, "Schedule reorder this week");
}

#[tokio::test]
async fn forecast_for_stores_on_first_access() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(50)).await.unwrap();
  let id = item.product.product_id;

  let first = f.engine.forecast_for(f.tenant, id).await.unwrap();
  let again = f.engine.forecast_for(f.tenant, id).await.unwrap();
  assert_eq!(first.last_recalculated, again.last_recalculated);
  assert_eq!(f.engine.list_forecasts(f.tenant).await.unwrap().len(), 1);
}

#[tokio::test]
async fn forecast_of_unknown_product_is_not_found() {
  let f = fixture().await;
  let err = f.engine.compute_forecast(f.tenant, Uuid::new_v4()).await.unwrap_err();
  assert!(matches!(err, Error::NotFound { .. }));
}

#[tokio::test]
async fn recalculate_all_is_idempotent() {
  let f = fixture().await;
  f.engine.register_product(f.tenant, sugar(50)).await.unwrap();
  f.engine
    .register_product(f.tenant, NewProduct::new("40000001", "Salt", Decimal::ONE).with_stock(3))
    .await
    .unwrap();
  f.engine.apply_movement(f.tenant, "5012345678900", Action::Sale, 10).await.unwrap();

  assert_eq!(f.engine.recalculate_all(f.tenant).await.unwrap(), 2);
  let before: Vec<_> = f
    .engine
    .list_forecasts(f.tenant)
    .await
    .unwrap()
    .into_iter()
    .map(|v| (v.forecast.product_id, v.forecast.days_until_stockout, v.forecast.recommendation))
    .collect();

  assert_eq!(f.engine.recalculate_all(f.tenant).await.unwrap(), 2);
  let after: Vec<_> = f
    .engine
    .list_forecasts(f.tenant)
    .await
    .unwrap()
    .into_iter()
    .map(|v| (v.forecast.product_id, v.forecast.days_until_stockout, v.forecast.recommendation))
    .collect();

  assert_eq!(before, after);
  // Sugar has a projection, salt has no sales and sorts last.
  assert_eq!(before[0].1, Some(4));
  assert_eq!(before[0].2, "Schedule reorder this week");
  assert_eq!(before[1].1, None);
  assert_eq!(before[1].2, "No sales history available");
}

#[tokio::test]
async fn recalculate_all_on_empty_tenant_writes_nothing() {
  let f = fixture().await;
  assert_eq!(f.engine.recalculate_all(f.tenant).await.unwrap(), 0);
}

// ─── Router ──────────────────────────────────────────────────────────────────

fn app(f: &Fixture) -> Router {
  api_router(f.engine.clone()).layer(Extension(f.tenant))
}

async fn send(router: Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let mut req = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      req = req.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = router.oneshot(req.body(body).unwrap()).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let json = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap()
  };
  (status, json)
}

#[tokio::test]
async fn create_then_scan_over_http() {
  let f = fixture().await;
  let (status, created) = send(
    app(&f),
    "POST",
    "/products",
    Some(json!({
      "barcode": "5012345678900",
      "name": "Sugar 1kg",
      "price": "150.00",
      "initial_quantity": 25
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["reorder_point"], 20);
  assert_eq!(created["status"], "low");

  let (status, receipt) = send(
    app(&f),
    "POST",
    "/inventory/scan",
    Some(json!({ "barcode": "5012345678900", "action": "sale", "quantity": 10 })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(receipt["item"]["quantity"], 15);
  assert_eq!(receipt["alert"]["alert_type"], "low_stock");

  let (_, low) = send(app(&f), "GET", "/inventory/low-stock", None).await;
  assert_eq!(low.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn error_kinds_map_to_distinct_statuses() {
  let f = fixture().await;
  f.engine.register_product(f.tenant, sugar(5)).await.unwrap();

  let (status, body) = send(
    app(&f),
    "POST",
    "/inventory/scan",
    Some(json!({ "barcode": "5012345678900", "action": "sale", "quantity": 9 })),
  )
  .await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(body["available"], 5);
  assert_eq!(body["requested"], 9);

  let (status, body) = send(
    app(&f),
    "POST",
    "/inventory/scan",
    Some(json!({ "barcode": "5012345678900", "action": "sale", "quantity": 0 })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(body["field"], "quantity");

  let (status, _) = send(
    app(&f),
    "POST",
    "/inventory/scan",
    Some(json!({ "barcode": "00000000", "action": "sale" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(app(&f), "GET", "/products?limit=0", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn alert_lifecycle_over_http() {
  let f = fixture().await;
  f.engine.register_product(f.tenant, sugar(25)).await.unwrap();
  let alert = f
    .engine
    .apply_movement(f.tenant, "5012345678900", Action::Sale, 10)
    .await
    .unwrap()
    .alert
    .unwrap();

  let (_, open) = send(app(&f), "GET", "/alerts?acknowledged=false", None).await;
  assert_eq!(open.as_array().unwrap().len(), 1);
  assert_eq!(open[0]["product_barcode"], "5012345678900");

  let uri = format!("/alerts/{}/acknowledge", alert.alert_id);
  let (status, _) = send(app(&f), "POST", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, open) = send(app(&f), "GET", "/alerts?acknowledged=false", None).await;
  assert!(open.as_array().unwrap().is_empty());

  let uri = format!("/alerts/{}", alert.alert_id);
  let (status, _) = send(app(&f), "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(app(&f), "DELETE", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn forecasts_over_http() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(50)).await.unwrap();

  let (status, run) = send(app(&f), "POST", "/forecasts/run", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(run["recalculated"], 1);

  let uri = format!("/forecasts/{}", item.product.product_id);
  let (status, forecast) = send(app(&f), "GET", &uri, None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(forecast["recommendation"], "No sales history available");

  let uri = format!("/forecasts/{}/recalculate", Uuid::new_v4());
  let (status, _) = send(app(&f), "POST", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn me_returns_the_calling_tenant() {
  let f = fixture().await;
  let (status, body) = send(app(&f), "GET", "/me", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["tenant_id"], f.tenant.to_string());
  assert_eq!(body["name"], "Duka");
  assert_eq!(body["phone"], "0711000000");
  assert!(body.get("password_hash").is_none());

  let router = api_router(f.engine.clone()).layer(Extension(TenantId::new()));
  let (status, _) = send(router, "GET", "/me", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_bodies_get_json_errors() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(5)).await.unwrap();

  let (status, body) = send(
    app(&f),
    "POST",
    "/inventory/scan",
    Some(json!({ "barcode": "5012345678900", "action": "steal" })),
  )
  .await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].as_str().unwrap().contains("unknown variant"));

  let uri = format!("/inventory/{}", item.product.product_id);
  let (status, body) = send(app(&f), "PUT", &uri, Some(json!({ "quantity": "ten" }))).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert!(body["error"].is_string());

  // No content type at all.
  let (status, body) = send(app(&f), "PUT", &uri, None).await;
  assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
  assert!(body["error"].is_string());

  assert_eq!(f.engine.product(f.tenant, item.product.product_id).await.unwrap().quantity, 5);
}

#[tokio::test]
async fn handlers_only_see_their_own_tenant() {
  let f = fixture().await;
  let item = f.engine.register_product(f.tenant, sugar(5)).await.unwrap();
  let other = add_tenant(f.engine.store(), "0733000000").await;
  let router = api_router(f.engine.clone()).layer(Extension(other));

  let uri = format!("/products/{}", item.product.product_id);
  let (status, _) = send(router.clone(), "GET", &uri, None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (_, page) = send(router, "GET", "/products", None).await;
  assert_eq!(page["total"], 0);
}

#[tokio::test]
async fn null_sink_engine_still_serves_requests() {
  let store = SqliteStore::open_in_memory().await.unwrap();
  let tenant = add_tenant(&store, "0711000000").await;
  let engine = Arc::new(InventoryEngine::new(Arc::new(store), Arc::new(NullSink)));
  let router = api_router(engine).layer(Extension(tenant));
  let (status, body) = send(router, "GET", "/inventory", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body, json!([]));
}
