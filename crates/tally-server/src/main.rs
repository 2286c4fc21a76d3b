//! tally-server binary.
//!
//! Reads `tally.toml` (or the path specified with `--config`), opens the
//! SQLite store, and serves the Tally API and push channel over HTTP.
//!
//! # Creating a store account
//!
//! ```
//! tally-server --create-store --name "Corner Shop" --phone 0711000000
//! ```
//!
//! The password is read from stdin.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use clap::Parser;
use tally_core::{store::InventoryStore, tenant::NewTenant};
use tally_live::{ConnectionRegistry, Dispatcher};
use tally_server::{AppState, ServerConfig, auth};
use tally_store_sqlite::SqliteStore;
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Tally inventory server")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "tally.toml")]
  config: PathBuf,

  /// Create a store account with a password entered on stdin and exit.
  #[arg(long, requires_all = ["name", "phone"])]
  create_store: bool,

  /// Display name of the store to create.
  #[arg(long)]
  name: Option<String>,

  /// Login phone of the store to create.
  #[arg(long)]
  phone: Option<String>,

  /// Optional location of the store to create.
  #[arg(long)]
  location: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(
      EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .from_env_lossy(),
    )
    .init();

  let cli = Cli::parse();

  let server_cfg = ServerConfig::load(&cli.config)
    .with_context(|| format!("failed to load configuration from {:?}", cli.config))?;

  let store = if server_cfg.in_memory() {
    tracing::warn!("using an in-memory store; all data is lost on exit");
    SqliteStore::open_in_memory()
      .await
      .context("failed to open in-memory store")?
  } else {
    let store_path = expand_tilde(&server_cfg.store_path);
    SqliteStore::open(&store_path)
      .await
      .with_context(|| format!("failed to open store at {store_path:?}"))?
  };

  if cli.create_store {
    return create_store(&store, cli).await;
  }

  let registry = Arc::new(ConnectionRegistry::new());
  let dispatcher = Arc::new(Dispatcher::new(registry));
  let state = AppState::new(Arc::new(store), dispatcher, server_cfg.clone());

  let app = tally_server::router(state);
  let address = format!("{}:{}", server_cfg.host, server_cfg.port);

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app)
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

  Ok(())
}

async fn create_store(store: &SqliteStore, cli: Cli) -> anyhow::Result<()> {
  let (Some(name), Some(phone)) = (cli.name, cli.phone) else {
    anyhow::bail!("--create-store needs --name and --phone");
  };

  let password = read_password()?;
  if password.is_empty() {
    anyhow::bail!("password must not be empty");
  }
  let password_hash = auth::hash_password(&password)?;

  let tenant = store
    .create_tenant(NewTenant {
      name:          name.trim().to_owned(),
      location:      cli.location,
      phone:         phone.trim().to_owned(),
      password_hash,
    })
    .await
    .context("failed to create store account")?
    .with_context(|| format!("phone {phone:?} is already registered"))?;

  println!("{}", tenant.tenant_id);
  Ok(())
}

/// Read a password from stdin.
fn read_password() -> anyhow::Result<String> {
  use std::io::{self, BufRead, Write};
  let stdin = io::stdin();
  print!("Password: ");
  io::stdout().flush().ok();
  let mut line = String::new();
  stdin.lock().read_line(&mut line)?;
  Ok(
    line
      .trim_end_matches('\n')
      .trim_end_matches('\r')
      .to_string(),
  )
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

async fn shutdown_signal() {
  if let Err(e) = tokio::signal::ctrl_c().await {
    tracing::error!(error = %e, "failed to listen for shutdown signal");
    std::future::pending::<()>().await;
  }
  tracing::info!("shutting down");
}
