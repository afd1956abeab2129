//! Handlers for `/emergencies`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/emergencies` | Active alerts only |
//! | `POST` | `/emergencies` | Body: [`NewEmergency`]; returns 201 |
//! | `POST` | `/emergencies/:id/resolve` | 204, or 404 if unknown |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use gatehouse_core::{
  emergency::{Emergency, NewEmergency},
  store::GateStore,
};
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /emergencies`
pub async fn active<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Emergency>>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(store.active_emergencies().await.map_err(ApiError::store)?))
}

/// `POST /emergencies`
pub async fn trigger<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewEmergency>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let emergency = store
    .trigger_emergency(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(emergency)))
}

/// `POST /emergencies/:id/resolve`
pub async fn resolve<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if store.resolve_emergency(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("emergency {id} not found")))
  }
}
