//! JSON REST API for the gate console.
//!
//! Exposes an axum [`Router`] backed by any [`gatehouse_core::store::GateStore`].
//! Auth, TLS, and transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", gatehouse_api::api_router(store.clone()))
//! ```

pub mod access;
pub mod directory;
pub mod emergencies;
pub mod error;
pub mod invitations;
pub mod notifications;
pub mod visits;
pub mod workers;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use gatehouse_core::store::GateStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: GateStore + Clone + Send + Sync + 'static,
  S::Error: std::error::Error + Send + Sync + 'static,
{
  Router::new()
    // Access
    .route("/validate", post(access::validate::<S>))
    .route("/admit", post(access::admit::<S>))
    // Visit ledger
    .route("/visits", get(visits::list::<S>).post(visits::enter::<S>))
    .route("/visits/active", get(visits::active::<S>))
    .route("/visits/today", get(visits::today::<S>))
    .route("/visits/{id}/exit", post(visits::exit::<S>))
    .route("/stats", get(visits::stats::<S>))
    // Emergencies
    .route(
      "/emergencies",
      get(emergencies::active::<S>).post(emergencies::trigger::<S>),
    )
    .route("/emergencies/{id}/resolve", post(emergencies::resolve::<S>))
    // Notifications
    .route(
      "/notifications",
      get(notifications::list::<S>).post(notifications::create::<S>),
    )
    .route("/notifications/unread-count", get(notifications::unread_count::<S>))
    .route("/notifications/read-all", post(notifications::read_all::<S>))
    .route("/notifications/{id}/read", post(notifications::read_one::<S>))
    .route("/packages", post(notifications::package::<S>))
    // Credentials
    .route(
      "/invitations",
      get(invitations::list::<S>).post(invitations::create::<S>),
    )
    .route("/workers", get(workers::list::<S>).post(workers::create::<S>))
    .route("/workers/{id}/status", post(workers::set_status::<S>))
    .route(
      "/authorizations",
      get(workers::list_authorizations::<S>)
        .post(workers::create_authorization::<S>),
    )
    .route(
      "/authorizations/{id}/revoke",
      post(workers::revoke_authorization::<S>),
    )
    // Catalogs
    .route("/directory", get(directory::directory::<S>))
    .route("/units", get(directory::units::<S>))
    .with_state(store)
}
