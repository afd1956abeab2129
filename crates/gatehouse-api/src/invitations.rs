//! Handlers for `/invitations`.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/invitations` | `?active=true` limits to usable invitations |
//! | `POST` | `/invitations` | Body: [`NewInvitation`]; returns 201, 400 on an inverted window |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
};
use gatehouse_core::{
  credential::{Invitation, NewInvitation},
  store::GateStore,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
  #[serde(default)]
  pub active: bool,
}

/// `GET /invitations[?active=true]`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Invitation>>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  let invitations = store
    .list_invitations(params.active)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(invitations))
}

/// `POST /invitations`
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<NewInvitation>,
) -> Result<impl IntoResponse, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  if body.guest_name.trim().is_empty() {
    return Err(ApiError::BadRequest("guest_name must not be empty".into()));
  }
  let invitation = store
    .create_invitation(body)
    .await
    .map_err(ApiError::store)?;
  Ok((StatusCode::CREATED, Json(invitation)))
}
