//! Gate console server binary.
//!
//! Reads `config.toml` (or the path specified with `--config`), loads the
//! optional JSON seed into an in-memory registry, and serves the JSON API
//! over HTTP.

use std::{path::PathBuf, sync::Arc};

use anyhow::Context as _;
use clap::Parser;
use gatehouse_server::{ServerConfig, app, spawn_expiry_sweep};
use gatehouse_store_memory::{MemoryStore, load_seed};
use tokio::net::TcpListener;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about = "Gated-community access console")]
struct Cli {
  /// Path to the TOML configuration file.
  #[arg(short, long, default_value = "config.toml")]
  config: PathBuf,
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

  let settings = config::Config::builder()
    .add_source(config::File::from(cli.config.clone()).required(false))
    .add_source(config::Environment::with_prefix("GATEHOUSE"))
    .build()
    .context("failed to read config file")?;

  let server_cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;

  let policy = server_cfg.policy()?;

  let store = match server_cfg.resolve_seed_path(&cli.config) {
    Some(path) => {
      let seed = load_seed(&path)
        .await
        .with_context(|| format!("failed to load seed from {path:?}"))?;
      MemoryStore::from_bootstrap(policy, seed)
    }
    None => {
      tracing::warn!("no seed_path configured; starting with empty catalogs");
      MemoryStore::new(policy)
    }
  };
  let store = Arc::new(store);

  if let Some(every) = server_cfg.sweep_interval() {
    spawn_expiry_sweep(store.clone(), every);
  }

  let app = app(store);
  let address = server_cfg.address();

  tracing::info!("Listening on http://{address}");
  let listener = TcpListener::bind(&address)
    .await
    .with_context(|| format!("failed to bind {address}"))?;

  axum::serve(listener, app).await.context("server error")?;

  Ok(())
}
