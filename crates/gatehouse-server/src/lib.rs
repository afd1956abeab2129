//! Gate console server: configuration, router assembly and background jobs.
//!
//! The binary in `main.rs` wires these together; tests drive [`app`]
//! directly.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
  time::Duration,
};

use anyhow::Context as _;
use axum::{Router, routing::get};
use chrono::FixedOffset;
use gatehouse_core::{
  access::{AccessPolicy, MissingAuthorization},
  store::GateStore,
};
use serde::Deserialize;
use tokio::{task::JoinHandle, time::MissedTickBehavior};
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `GATEHOUSE_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  #[serde(default = "default_host")]
  pub host:                  String,
  #[serde(default = "default_port")]
  pub port:                  u16,
  /// JSON document with the startup catalogs. Absent means an empty registry.
  /// A relative path is taken from the config file's directory.
  pub seed_path:             Option<PathBuf>,
  /// Community wall-clock offset from UTC, in minutes.
  #[serde(default)]
  pub utc_offset_minutes:    i32,
  /// How often stale invitations are expired. `0` disables the sweep.
  #[serde(default = "default_sweep_interval")]
  pub sweep_interval_secs:   u64,
  #[serde(default)]
  pub missing_authorization: MissingAuthorization,
}

fn default_host() -> String { "127.0.0.1".to_string() }

fn default_port() -> u16 { 8080 }

fn default_sweep_interval() -> u64 { 60 }

impl Default for ServerConfig {
  fn default() -> Self {
    Self {
      host:                  default_host(),
      port:                  default_port(),
      seed_path:             None,
      utc_offset_minutes:    0,
      sweep_interval_secs:   default_sweep_interval(),
      missing_authorization: MissingAuthorization::default(),
    }
  }
}

impl ServerConfig {
  pub fn address(&self) -> String { format!("{}:{}", self.host, self.port) }

  pub fn policy(&self) -> anyhow::Result<AccessPolicy> {
    let utc_offset = FixedOffset::east_opt(self.utc_offset_minutes * 60)
      .with_context(|| {
        format!("utc_offset_minutes out of range: {}", self.utc_offset_minutes)
      })?;
    Ok(AccessPolicy {
      utc_offset,
      missing_authorization: self.missing_authorization,
    })
  }

  /// Where to read the seed from, given the config file that was loaded.
  ///
  /// `~/` expands to `$HOME`; other relative paths are joined onto the
  /// directory holding `config_file`.
  pub fn resolve_seed_path(&self, config_file: &Path) -> Option<PathBuf> {
    let path = self.seed_path.as_deref()?;
    let s = path.to_string_lossy();
    if let Some(rest) = s.strip_prefix("~/")
      && let Ok(home) = std::env::var("HOME")
    {
      return Some(PathBuf::from(home).join(rest));
    }
    if path.is_absolute() {
      return Some(path.to_path_buf());
    }
    let base = config_file.parent().unwrap_or(Path::new(""));
    Some(base.join(path))
  }

  pub fn sweep_interval(&self) -> Option<Duration> {
    (self.sweep_interval_secs > 0)
      .then(|| Duration::from_secs(self.sweep_interval_secs))
  }
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// The full application: `/health` plus the JSON API under `/api`.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: GateStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    .route("/health", get(|| async { "ok" }))
    .nest("/api", gatehouse_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

// ─── Background jobs ──────────────────────────────────────────────────────────

/// Periodically move invitations past their window to `expired`.
pub fn spawn_expiry_sweep<S>(store: Arc<S>, every: Duration) -> JoinHandle<()>
where
  S: GateStore + 'static,
{
  tokio::spawn(async move {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
      ticker.tick().await;
      match store.expire_invitations().await {
        Ok(expired) => tracing::debug!(expired, "invitation sweep finished"),
        Err(e) => tracing::warn!(error = %e, "invitation sweep failed"),
      }
    }
  })
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests;
