//! The `GateStore` trait.
//!
//! The trait is implemented by backends that own a [`Gatehouse`] registry
//! (e.g. `gatehouse-store-memory`). The HTTP layer depends on this
//! abstraction, not on any concrete backend. Backends stamp every operation
//! with the current time.
//!
//! [`Gatehouse`]: crate::registry::Gatehouse

use std::future::Future;

use uuid::Uuid;

use crate::{
  access::Decision,
  credential::{
    ApprovalStatus, Invitation, NewAuthorization, NewInvitation, NewWorker,
    WorkAuthorization, Worker,
  },
  directory::{DirectoryEntry, Unit},
  emergency::{Emergency, NewEmergency},
  notification::{NewNotification, Notification, PackageNotice},
  registry::{AdmitRequest, Admission, Stats, VisitMatch},
  visit::{ExitOutcome, NewVisit, VisitEvent},
};

/// Abstraction over the gate registry.
///
/// Policy rejections and unknown ids are reported through return values;
/// `Self::Error` is reserved for malformed input and backend failures.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait GateStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Access ────────────────────────────────────────────────────────────

  /// Decide whether `identifier` may enter now. Never records anything.
  fn validate(
    &self,
    identifier: String,
  ) -> impl Future<Output = Result<Decision, Self::Error>> + Send + '_;

  /// Validate and record the entry, forcing it if an override reason is set.
  fn admit(
    &self,
    request: AdmitRequest,
  ) -> impl Future<Output = Result<Admission, Self::Error>> + Send + '_;

  // ── Visit ledger ──────────────────────────────────────────────────────

  /// Append an `in` event and notify the destination unit.
  fn record_entry(
    &self,
    input: NewVisit,
  ) -> impl Future<Output = Result<VisitEvent, Self::Error>> + Send + '_;

  /// Close an open visit. Idempotent.
  fn record_exit(
    &self,
    id: Uuid,
    actor: String,
  ) -> impl Future<Output = Result<ExitOutcome, Self::Error>> + Send + '_;

  fn active_visits(
    &self,
  ) -> impl Future<Output = Result<Vec<VisitEvent>, Self::Error>> + Send + '_;

  fn visits_today(
    &self,
    query: String,
  ) -> impl Future<Output = Result<Vec<VisitMatch>, Self::Error>> + Send + '_;

  fn stats(&self) -> impl Future<Output = Result<Stats, Self::Error>> + Send + '_;

  /// The full ledger, newest first.
  fn all_logs(
    &self,
  ) -> impl Future<Output = Result<Vec<VisitEvent>, Self::Error>> + Send + '_;

  // ── Invitations ───────────────────────────────────────────────────────

  fn create_invitation(
    &self,
    input: NewInvitation,
  ) -> impl Future<Output = Result<Invitation, Self::Error>> + Send + '_;

  fn list_invitations(
    &self,
    active_only: bool,
  ) -> impl Future<Output = Result<Vec<Invitation>, Self::Error>> + Send + '_;

  /// Expire invitations past their window; returns how many changed.
  fn expire_invitations(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Workers ───────────────────────────────────────────────────────────

  fn add_worker(
    &self,
    input: NewWorker,
  ) -> impl Future<Output = Result<Worker, Self::Error>> + Send + '_;

  /// Returns `None` if the worker does not exist.
  fn set_worker_status(
    &self,
    id: Uuid,
    status: ApprovalStatus,
  ) -> impl Future<Output = Result<Option<Worker>, Self::Error>> + Send + '_;

  fn list_workers(
    &self,
  ) -> impl Future<Output = Result<Vec<Worker>, Self::Error>> + Send + '_;

  /// Returns `None` if the referenced worker does not exist.
  fn add_authorization(
    &self,
    input: NewAuthorization,
  ) -> impl Future<Output = Result<Option<WorkAuthorization>, Self::Error>>
  + Send
  + '_;

  fn revoke_authorization(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<Option<WorkAuthorization>, Self::Error>>
  + Send
  + '_;

  fn list_authorizations(
    &self,
  ) -> impl Future<Output = Result<Vec<WorkAuthorization>, Self::Error>>
  + Send
  + '_;

  // ── Emergencies ───────────────────────────────────────────────────────

  fn trigger_emergency(
    &self,
    input: NewEmergency,
  ) -> impl Future<Output = Result<Emergency, Self::Error>> + Send + '_;

  /// Returns `false` if the emergency does not exist.
  fn resolve_emergency(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn active_emergencies(
    &self,
  ) -> impl Future<Output = Result<Vec<Emergency>, Self::Error>> + Send + '_;

  // ── Notifications ─────────────────────────────────────────────────────

  fn notify(
    &self,
    input: NewNotification,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  fn register_package(
    &self,
    notice: PackageNotice,
  ) -> impl Future<Output = Result<Notification, Self::Error>> + Send + '_;

  /// Every notification, newest first.
  fn notifications(
    &self,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  fn unread_for(
    &self,
    unit: String,
  ) -> impl Future<Output = Result<Vec<Notification>, Self::Error>> + Send + '_;

  fn unread_count(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  /// Returns `false` if the notification does not exist.
  fn mark_read(
    &self,
    id: Uuid,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  fn mark_all_read(
    &self,
  ) -> impl Future<Output = Result<usize, Self::Error>> + Send + '_;

  // ── Directory ─────────────────────────────────────────────────────────

  fn units(&self) -> impl Future<Output = Result<Vec<Unit>, Self::Error>> + Send + '_;

  fn directory(
    &self,
  ) -> impl Future<Output = Result<Vec<DirectoryEntry>, Self::Error>> + Send + '_;
}
