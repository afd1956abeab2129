//! [`MemoryStore`] — the in-memory implementation of [`GateStore`].

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use uuid::Uuid;

use gatehouse_core::{
  access::{AccessPolicy, Decision},
  credential::{
    ApprovalStatus, Invitation, NewAuthorization, NewInvitation, NewWorker,
    WorkAuthorization, Worker,
  },
  directory::{DirectoryEntry, Unit},
  emergency::{Emergency, NewEmergency},
  notification::{NewNotification, Notification, PackageNotice},
  registry::{AdmitRequest, Admission, Bootstrap, Gatehouse, Stats, VisitMatch},
  store::GateStore,
  visit::{ExitOutcome, NewVisit, VisitEvent},
};

use crate::{Error, Result};

// ─── Store ───────────────────────────────────────────────────────────────────

/// The gate registry shared between request handlers.
///
/// Cloning is cheap — the inner registry is reference-counted.
#[derive(Clone)]
pub struct MemoryStore {
  inner: Arc<Mutex<Gatehouse>>,
}

impl MemoryStore {
  /// An empty registry.
  pub fn new(policy: AccessPolicy) -> Self {
    Self::from_registry(Gatehouse::new(policy))
  }

  /// A registry pre-populated from startup catalogs.
  pub fn from_bootstrap(policy: AccessPolicy, seed: Bootstrap) -> Self {
    Self::from_registry(Gatehouse::from_bootstrap(policy, seed))
  }

  pub fn from_registry(registry: Gatehouse) -> Self {
    Self { inner: Arc::new(Mutex::new(registry)) }
  }
}

impl GateStore for MemoryStore {
  type Error = Error;

  // ── Access ────────────────────────────────────────────────────────────────

  async fn validate(&self, identifier: String) -> Result<Decision> {
    let g = self.inner.lock().await;
    let decision = g.validate(&identifier, Utc::now());
    if let Some(reason) = decision.reason() {
      tracing::debug!(%reason, "credential denied");
    }
    Ok(decision)
  }

  async fn admit(&self, request: AdmitRequest) -> Result<Admission> {
    let mut g = self.inner.lock().await;
    Ok(g.admit(request, Utc::now())?)
  }

  // ── Visit ledger ──────────────────────────────────────────────────────────

  async fn record_entry(&self, input: NewVisit) -> Result<VisitEvent> {
    let mut g = self.inner.lock().await;
    Ok(g.record_entry(input, Utc::now())?)
  }

  async fn record_exit(&self, id: Uuid, actor: String) -> Result<ExitOutcome> {
    let mut g = self.inner.lock().await;
    Ok(g.record_exit(id, &actor, Utc::now()))
  }

  async fn active_visits(&self) -> Result<Vec<VisitEvent>> {
    Ok(self.inner.lock().await.active_visits())
  }

  async fn visits_today(&self, query: String) -> Result<Vec<VisitMatch>> {
    Ok(self.inner.lock().await.visits_today(&query, Utc::now()))
  }

  async fn stats(&self) -> Result<Stats> {
    Ok(self.inner.lock().await.stats(Utc::now()))
  }

  async fn all_logs(&self) -> Result<Vec<VisitEvent>> {
    Ok(self.inner.lock().await.all_logs())
  }

  // ── Invitations ───────────────────────────────────────────────────────────

  async fn create_invitation(&self, input: NewInvitation) -> Result<Invitation> {
    let mut g = self.inner.lock().await;
    Ok(g.create_invitation(input, Utc::now())?)
  }

  async fn list_invitations(&self, active_only: bool) -> Result<Vec<Invitation>> {
    let g = self.inner.lock().await;
    Ok(if active_only {
      g.active_invitations()
    } else {
      g.invitations().to_vec()
    })
  }

  async fn expire_invitations(&self) -> Result<usize> {
    let expired = self.inner.lock().await.expire_invitations(Utc::now());
    if expired > 0 {
      tracing::info!(expired, "expired stale invitations");
    }
    Ok(expired)
  }

  // ── Workers ───────────────────────────────────────────────────────────────

  async fn add_worker(&self, input: NewWorker) -> Result<Worker> {
    Ok(self.inner.lock().await.add_worker(input))
  }

  async fn set_worker_status(
    &self,
    id: Uuid,
    status: ApprovalStatus,
  ) -> Result<Option<Worker>> {
    Ok(self.inner.lock().await.set_worker_status(id, status))
  }

  async fn list_workers(&self) -> Result<Vec<Worker>> {
    Ok(self.inner.lock().await.workers().to_vec())
  }

  async fn add_authorization(
    &self,
    input: NewAuthorization,
  ) -> Result<Option<WorkAuthorization>> {
    Ok(self.inner.lock().await.add_authorization(input)?)
  }

  async fn revoke_authorization(
    &self,
    id: Uuid,
  ) -> Result<Option<WorkAuthorization>> {
    Ok(self.inner.lock().await.revoke_authorization(id))
  }

  async fn list_authorizations(&self) -> Result<Vec<WorkAuthorization>> {
    Ok(self.inner.lock().await.authorizations().to_vec())
  }

  // ── Emergencies ───────────────────────────────────────────────────────────

  async fn trigger_emergency(&self, input: NewEmergency) -> Result<Emergency> {
    let mut g = self.inner.lock().await;
    Ok(g.trigger_emergency(input.unit, input.reporter, input.kind, Utc::now()))
  }

  async fn resolve_emergency(&self, id: Uuid) -> Result<bool> {
    Ok(self.inner.lock().await.resolve_emergency(id, Utc::now()))
  }

  async fn active_emergencies(&self) -> Result<Vec<Emergency>> {
    Ok(self.inner.lock().await.active_emergencies())
  }

  // ── Notifications ─────────────────────────────────────────────────────────

  async fn notify(&self, input: NewNotification) -> Result<Notification> {
    let mut g = self.inner.lock().await;
    Ok(g.notify(input.unit, input.title, input.message, input.kind, Utc::now()))
  }

  async fn register_package(&self, notice: PackageNotice) -> Result<Notification> {
    let mut g = self.inner.lock().await;
    Ok(g.register_package(
      notice.unit,
      &notice.company,
      notice.tracking.as_deref(),
      Utc::now(),
    ))
  }

  async fn notifications(&self) -> Result<Vec<Notification>> {
    Ok(self.inner.lock().await.notifications())
  }

  async fn unread_for(&self, unit: String) -> Result<Vec<Notification>> {
    Ok(self.inner.lock().await.unread_for(&unit))
  }

  async fn unread_count(&self) -> Result<usize> {
    Ok(self.inner.lock().await.unread_count())
  }

  async fn mark_read(&self, id: Uuid) -> Result<bool> {
    Ok(self.inner.lock().await.mark_read(id))
  }

  async fn mark_all_read(&self) -> Result<usize> {
    Ok(self.inner.lock().await.mark_all_read())
  }

  // ── Directory ─────────────────────────────────────────────────────────────

  async fn units(&self) -> Result<Vec<Unit>> {
    Ok(self.inner.lock().await.units().to_vec())
  }

  async fn directory(&self) -> Result<Vec<DirectoryEntry>> {
    Ok(self.inner.lock().await.directory())
  }
}
