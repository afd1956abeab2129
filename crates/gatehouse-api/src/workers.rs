//! Handlers for workers and their work authorizations.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/workers` | |
//! | `POST` | `/workers` | Body: [`NewWorker`]; starts `pending` |
//! | `POST` | `/workers/:id/status` | Body: `{"status":"approved"}` |
//! | `GET`  | `/authorizations` | |
//! | `POST` | `/authorizations` | Body: [`NewAuthorization`]; 404 if the worker is unknown |
//! | `POST` | `/authorizations/:id/revoke` | |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
};
use gatehouse_core::{
  credential::{
    ApprovalStatus, NewAuthorization, NewWorker, WorkAuthorization, Worker,
  },
  store::GateStore,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

// ─── Workers ──────────────────────────────────────────────────────────────────

/// `GET /workers`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<Worker>>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(store.list_workers().await.map_err(ApiError::store)?))
}

/// `POST /workers`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewWorker>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.national_id.trim().is_empty() {
    return Err(ApiError::BadRequest("national_id must not be empty".into()));
  }
  let worker = store.add_worker(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(worker)))
}

#[derive(Debug, Deserialize)]
pub struct StatusBody {
  pub status: ApprovalStatus,
}

/// `POST /workers/:id/status`
pub async fn set_status<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  Json(body): Json<StatusBody>,
) -> Result<Json<Worker>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let worker = store
    .set_worker_status(id, body.status)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("worker {id} not found")))?;
  Ok(Json(worker))
}

// ─── Authorizations ───────────────────────────────────────────────────────────

/// `GET /authorizations`
pub async fn list_authorizations<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<WorkAuthorization>>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(store.list_authorizations().await.map_err(ApiError::store)?))
}

/// `POST /authorizations`
pub async fn create_authorization<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewAuthorization>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let worker_id = body.worker_id;
  let auth = store
    .add_authorization(body)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("worker {worker_id} not found"))
    })?;
  Ok((StatusCode::CREATED, Json(auth)))
}

/// `POST /authorizations/:id/revoke`
pub async fn revoke_authorization<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<Json<WorkAuthorization>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let auth = store
    .revoke_authorization(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("authorization {id} not found"))
    })?;
  Ok(Json(auth))
}
