//! Handlers for the notification outbox.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/notifications` | All, newest first; `?unit=` returns that unit's unread |
//! | `POST` | `/notifications` | Body: [`NewNotification`]; returns 201 |
//! | `POST` | `/notifications/:id/read` | 204, or 404 if unknown |
//! | `GET`  | `/notifications/unread-count` | `{"unread": n}` across all units |
//! | `POST` | `/notifications/read-all` | `{"updated": n}` |
//! | `POST` | `/packages` | Body: [`PackageNotice`]; returns 201 + the notification |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use gatehouse_core::{
  notification::{NewNotification, Notification, PackageNotice},
  store::GateStore,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  pub unit: Option<String>,
}

/// `GET /notifications[?unit=...]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Notification>>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let notifications = match params.unit {
    Some(unit) => store.unread_for(unit).await,
    None => store.notifications().await,
  }
  .map_err(ApiError::store)?;
  Ok(Json(notifications))
}

/// `POST /notifications`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewNotification>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let n = store.notify(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(n)))
}

/// `POST /notifications/:id/read`
pub async fn read_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<Uuid>,
) -> Result<StatusCode, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if store.mark_read(id).await.map_err(ApiError::store)? {
    Ok(StatusCode::NO_CONTENT)
  } else {
    Err(ApiError::NotFound(format!("notification {id} not found")))
  }
}

/// `GET /notifications/unread-count`
pub async fn unread_count<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Value>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let unread = store.unread_count().await.map_err(ApiError::store)?;
  Ok(Json(json!({ "unread": unread })))
}

/// `POST /notifications/read-all`
pub async fn read_all<S>(
  State(store): State<Arc<S>>,
) -> Result<Json<Value>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let updated = store.mark_all_read().await.map_err(ApiError::store)?;
  Ok(Json(json!({ "updated": updated })))
}

/// `POST /packages`
pub async fn package<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<PackageNotice>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.company.trim().is_empty() {
    return Err(ApiError::BadRequest("company must not be empty".into()));
  }
  let n = store.register_package(body).await.map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(n)))
}
