//! Handlers for credential checks at the gate.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/validate` | Body: `{"identifier":"..."}`; returns a [`Decision`], records nothing |
//! | `POST` | `/admit` | Body: [`AdmitRequest`]; validates and records the entry |

use std::sync::Arc;

use axum::{Json, extract::State};
use gatehouse_core::{
  access::Decision,
  registry::{AdmitRequest, Admission},
  store::GateStore,
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize)]
pub struct ValidateBody {
  /// Invitation id (QR token) or national ID.
  pub identifier: String,
}

fn require_identifier(identifier: &str) -> Result<(), ApiError> {
  if identifier.trim().is_empty() {
    return Err(ApiError::BadRequest("identifier must not be empty".into()));
  }
  Ok(())
}

/// `POST /validate`
pub async fn validate<S>(
  State(store): State<Arc<S>>,
  Json(body): Json<ValidateBody>,
) -> Result<Json<Decision>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  require_identifier(&body.identifier)?;
  let decision = store
    .validate(body.identifier.trim().to_owned())
    .await
    .map_err(ApiError::store)?;
  Ok(Json(decision))
}

/// `POST /admit`
///
/// A denied credential is still let in when `override_reason` is present; a
/// blank reason is rejected with `400`.
pub async fn admit<S>(
  State(store): State<Arc<S>>,
  Json(mut body): Json<AdmitRequest>,
) -> Result<Json<Admission>, ApiError>
where
  S: GateStore,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  require_identifier(&body.identifier)?;
  body.identifier = body.identifier.trim().to_owned();
  let admission = store.admit(body).await.map_err(ApiError::store)?;
  Ok(Json(admission))
}
