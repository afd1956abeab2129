//! Read-only catalogs loaded from the seed.

use std::sync::Arc;

use axum::{Json, extract::State};
use gatehouse_core::{
  directory::{DirectoryEntry, Unit},
  store::GateStore,
};

use crate::error::ApiError;

/// `GET /directory` — owners and tenants, sorted by unit.
pub async fn directory<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<DirectoryEntry>>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(store.directory().await.map_err(ApiError::store)?))
}

/// `GET /units`
pub async fn units<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Unit>>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(store.units().await.map_err(ApiError::store)?))
}
