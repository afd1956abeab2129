//! Handlers for the visit ledger.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/visits` | Full ledger, newest first |
//! | `POST` | `/visits` | Body: [`NewVisit`]; returns 201 + the `in` event |
//! | `GET`  | `/visits/active` | Open visits |
//! | `GET`  | `/visits/today` | `?q=` filters by name, national ID or plate |
//! | `POST` | `/visits/:id/exit` | Body (optional): `{"actor":"..."}`; 404 if unknown |
//! | `GET`  | `/stats` | Occupancy and today's entries |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use gatehouse_core::{
  registry::{Stats, VisitMatch},
  store::GateStore,
  visit::{ExitOutcome, NewVisit, VisitEvent},
};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::ApiError;

/// `GET /visits`
pub async fn list<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<VisitEvent>>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(store.all_logs().await.map_err(ApiError::store)?))
}

/// `POST /visits` — returns 201 + the stored [`VisitEvent`].
pub async fn enter<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewVisit>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let event = store.record_entry(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(event)))
}

/// `GET /visits/active`
pub async fn active<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Vec<VisitEvent>>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(store.active_visits().await.map_err(ApiError::store)?))
}

#[derive(Debug, Default, Deserialize)]
pub struct TodayParams {
  #[serde(default)]
  pub q: String,
}

/// `GET /visits/today[?q=...]`
pub async fn today<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<TodayParams>,
) -> Result<Json<Vec<VisitMatch>>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let matches = store
    .visits_today(params.q)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(matches))
}

#[derive(Debug, Default, Deserialize)]
pub struct ExitBody {
  #[serde(default)]
  pub actor: String,
}

/// `POST /visits/:id/exit`
///
/// Closing an already-closed visit is not an error; the body reports
/// `"outcome": "already_closed"`.
pub async fn exit<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
  body: Option<Json<ExitBody>>,
) -> Result<Json<ExitOutcome>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let actor = body.map(|Json(b)| b.actor).unwrap_or_default();
  let outcome = store
    .record_exit(id, actor)
    .await
    .map_err(ApiError::store)?;
  if !outcome.existed() {
    return Err(ApiError::NotFound(format!("visit {id} not found")));
  }
  Ok(Json(outcome))
}

/// `GET /stats`
pub async fn stats<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Stats>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Ok(Json(store.stats().await.map_err(ApiError::store)?))
}
