//! HTTP server for Tally.
//!
//! Wires the inventory engine, the SQLite store and the live push channel
//! into one axum [`Router`]:
//!
//! | Path | Auth | Notes |
//! |------|------|-------|
//! | `/health` | none | Liveness probe |
//! | `/api/...` | Basic | JSON API from `tally-api` |
//! | `/ws` | Basic | WebSocket push channel |

pub mod auth;
pub mod error;
pub mod ws;

pub use error::Error;

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{Json, Router, middleware, routing::get};
use serde::Deserialize;
use serde_json::{Value, json};
use tally_core::{engine::InventoryEngine, store::InventoryStore};
use tally_live::Dispatcher;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `tally.toml` and
/// `TALLY_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:              String,
  #[serde(default = "default_port")]
  pub port:              u16,
  /// SQLite file; `:memory:` for a throwaway store.
  #[serde(default = "default_store_path")]
  pub store_path:        PathBuf,
  /// Messages queued per live connection before it counts as lost.
  #[serde(default = "default_subscriber_buffer")]
  pub subscriber_buffer: usize,
}

fn default_host() -> String { "0.0.0.0".to_string() }
fn default_port() -> u16 { 8000 }
fn default_store_path() -> PathBuf { PathBuf::from("tally.db") }
fn default_subscriber_buffer() -> usize { 64 }

impl ServerConfig {
  /// Layer the optional file at `path` under `TALLY_*` environment variables.
  pub fn load(path: &Path) -> Result<Self, config::ConfigError> {
    config::Config::builder()
      .add_source(config::File::from(path).required(false))
      .add_source(config::Environment::with_prefix("TALLY").try_parsing(true))
      .build()?
      .try_deserialize()
  }

  pub fn in_memory(&self) -> bool { self.store_path.as_os_str() == ":memory:" }
}

// ─── Application state ────────────────────────────────────────────────────────

/// Shared state threaded through all axum handlers.
pub struct AppState<S> {
  pub engine:     Arc<InventoryEngine<S>>,
  pub dispatcher: Arc<Dispatcher>,
  pub config:     Arc<ServerConfig>,
}

impl<S> Clone for AppState<S> {
  fn clone(&self) -> Self {
    Self {
      engine:     self.engine.clone(),
      dispatcher: self.dispatcher.clone(),
      config:     self.config.clone(),
    }
  }
}

impl<S: InventoryStore> AppState<S> {
  /// Build the engine on `store`, broadcasting through `dispatcher`.
  pub fn new(store: Arc<S>, dispatcher: Arc<Dispatcher>, config: ServerConfig) -> Self {
    let engine = InventoryEngine::new(store, dispatcher.clone());
    Self {
      engine: Arc::new(engine),
      dispatcher,
      config: Arc::new(config),
    }
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the full application [`Router`].
pub fn router<S: InventoryStore + 'static>(state: AppState<S>) -> Router {
  let live = Router::new()
    .route("/ws", get(ws::handler::<S>))
    .with_state(state.clone());

  let protected = Router::new()
    .nest("/api", tally_api::api_router(state.engine.clone()))
    .merge(live)
    .route_layer(middleware::from_fn_with_state(
      state.clone(),
      auth::require_tenant::<S>,
    ));

  Router::new()
    .route("/health", get(health))
    .merge(protected)
    .layer(TraceLayer::new_for_http())
}

async fn health() -> Json<Value> {
  Json(json!({ "status": "healthy", "service": "tally" }))
}
