//! [`Gatehouse`] — the single registry that owns every catalog and log.
//!
//! It is constructed once at process start and handed to whoever needs it.
//! All methods are synchronous; a caller sharing it between tasks must wrap
//! it in a lock so that read-modify-write operations (exit, resolve,
//! mark-read) stay atomic.

use chrono::{DateTime, Datelike as _, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
  Result,
  access::{self, AccessPolicy, Catalogs, Decision},
  credential::{
    ApprovalStatus, AuthorizationStatus, Credential, Invitation,
    InvitationStatus, InvitationType, NewAuthorization, NewInvitation,
    NewWorker, WorkAuthorization, Worker,
  },
  directory::{self, DirectoryEntry, Profile, Unit},
  emergency::{Emergency, EmergencyChannel, EmergencyKind},
  notification::{Notification, NotificationKind, NotificationOutbox},
  visit::{EntryMethod, ExitOutcome, NewVisit, VisitEvent, VisitLedger},
};

// ─── Bootstrap ───────────────────────────────────────────────────────────────

/// Catalogs loaded once at startup.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Bootstrap {
  pub units:          Vec<Unit>,
  pub profiles:       Vec<Profile>,
  pub workers:        Vec<Worker>,
  pub authorizations: Vec<WorkAuthorization>,
  pub invitations:    Vec<Invitation>,
  #[serde(alias = "logs")]
  pub visits:         Vec<VisitEvent>,
}

// ─── Request / response shapes ───────────────────────────────────────────────

/// A guard's request to let someone through.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdmitRequest {
  pub identifier:      String,
  #[serde(default)]
  pub actor:           String,
  #[serde(default)]
  pub method:          EntryMethod,
  pub vehicle_plate:   Option<String>,
  /// Justification for admitting despite a denial.
  pub override_reason: Option<String>,
  /// Used for a forced entry when the identifier resolved to nobody.
  pub guest_name:      Option<String>,
  /// Used for a forced entry when the identifier resolved to nobody.
  pub unit:            Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Admission {
  pub decision: Decision,
  /// The ledger entry, if the bearer was let in (normally or forced).
  pub visit:    Option<VisitEvent>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
  Invitation,
  Worker,
}

/// A guard-side lookup hit for someone expected today.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitMatch {
  pub kind:        MatchKind,
  pub id:          Uuid,
  pub name:        String,
  pub national_id: Option<String>,
  pub unit:        Option<String>,
  pub plate:       Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stats {
  /// Occupancy: number of open visits.
  pub people_inside: usize,
  /// `in` events since local midnight.
  pub visits_today:  usize,
}

// ─── Registry ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct Gatehouse {
  policy:         AccessPolicy,
  units:          Vec<Unit>,
  profiles:       Vec<Profile>,
  invitations:    Vec<Invitation>,
  workers:        Vec<Worker>,
  authorizations: Vec<WorkAuthorization>,
  ledger:         VisitLedger,
  emergencies:    EmergencyChannel,
  outbox:         NotificationOutbox,
}

impl Gatehouse {
  pub fn new(policy: AccessPolicy) -> Self {
    Self { policy, ..Self::default() }
  }

  pub fn from_bootstrap(policy: AccessPolicy, seed: Bootstrap) -> Self {
    Self {
      policy,
      units: seed.units,
      profiles: seed.profiles,
      invitations: seed.invitations,
      workers: seed.workers,
      authorizations: seed.authorizations,
      ledger: VisitLedger::from_events(seed.visits),
      emergencies: EmergencyChannel::new(),
      outbox: NotificationOutbox::new(),
    }
  }

  pub fn policy(&self) -> &AccessPolicy { &self.policy }

  // ── Access ──────────────────────────────────────────────────────────────

  pub fn validate(&self, identifier: &str, now: DateTime<Utc>) -> Decision {
    let catalogs = Catalogs {
      invitations:    &self.invitations,
      workers:        &self.workers,
      authorizations: &self.authorizations,
    };
    access::validate(catalogs, identifier, now, &self.policy)
  }

  /// Validate and, when allowed, record the entry.
  ///
  /// A denial is turned into a forced entry when `override_reason` is set.
  /// A granted single-use invitation is consumed.
  pub fn admit(
    &mut self,
    req: AdmitRequest,
    now: DateTime<Utc>,
  ) -> Result<Admission> {
    let decision = self.validate(&req.identifier, now);

    let forced_reason = match (&decision, req.override_reason) {
      (Decision::Granted { .. }, _) => None,
      (Decision::Denied { .. }, None) => {
        return Ok(Admission { decision, visit: None });
      }
      (Decision::Denied { .. }, Some(reason)) => Some(reason),
    };

    let credential = decision.credential();
    let visit = NewVisit {
      actor:         req.actor,
      method:        req.method,
      guest_name:    credential
        .map(Credential::display_name)
        .or(req.guest_name)
        .unwrap_or_else(|| req.identifier.clone()),
      national_id:   credential
        .and_then(Credential::national_id)
        .map(str::to_owned),
      unit:          credential
        .and_then(Credential::unit)
        .map(str::to_owned)
        .or(req.unit)
        .unwrap_or_default(),
      vehicle_plate: req
        .vehicle_plate
        .filter(|p| !p.trim().is_empty())
        .or_else(|| credential.and_then(Credential::plate).map(str::to_owned)),
      forced_reason,
    };
    let event = self.record_entry(visit, now)?;

    if let Decision::Granted { credential: Credential::Invitation(inv) } =
      &decision
      && inv.kind == InvitationType::Single
      && let Some(stored) = self.invitations.iter_mut().find(|i| i.id == inv.id)
    {
      stored.status = InvitationStatus::Used;
    }

    Ok(Admission { decision, visit: Some(event) })
  }

  // ── Visits ──────────────────────────────────────────────────────────────

  /// Append an entry and notify the destination unit.
  pub fn record_entry(
    &mut self,
    input: NewVisit,
    now: DateTime<Utc>,
  ) -> Result<VisitEvent> {
    let event = self.ledger.record_entry(input, now)?;
    let d = &event.details;

    let (title, message, kind) = if event.is_forced_entry {
      tracing::warn!(
        id = %event.id,
        guest = %d.guest_name,
        unit = %d.unit,
        reason = event.forced_reason.as_deref().unwrap_or_default(),
        "forced entry recorded"
      );
      (
        "Forced entry",
        format!("{} was let in by the guard without a valid pass.", d.guest_name),
        NotificationKind::Warning,
      )
    } else {
      tracing::info!(
        id = %event.id,
        guest = %d.guest_name,
        unit = %d.unit,
        method = %event.method,
        "entry recorded"
      );
      (
        "Entry authorized",
        format!("{} has just entered on their way to your unit.", d.guest_name),
        NotificationKind::Success,
      )
    };
    self.outbox.enqueue(d.unit.clone(), title.to_owned(), message, kind, now);

    Ok(event)
  }

  pub fn record_exit(
    &mut self,
    id: Uuid,
    actor: &str,
    now: DateTime<Utc>,
  ) -> ExitOutcome {
    let outcome = self.ledger.record_exit(id, actor, now);
    match &outcome {
      ExitOutcome::Closed { entry, .. } => tracing::info!(
        id = %entry.id,
        guest = %entry.details.guest_name,
        "exit recorded"
      ),
      ExitOutcome::AlreadyClosed => {
        tracing::debug!(%id, "exit requested for a closed visit")
      }
      ExitOutcome::NotFound => tracing::debug!(%id, "exit for unknown visit"),
    }
    outcome
  }

  pub fn active_visits(&self) -> Vec<VisitEvent> {
    self.ledger.active().cloned().collect()
  }

  /// Case-insensitive lookup over today's valid invitations and workers
  /// authorized for today. A blank query matches nothing.
  pub fn visits_today(&self, query: &str, now: DateTime<Utc>) -> Vec<VisitMatch> {
    let q = query.trim().to_lowercase();
    if q.is_empty() {
      return Vec::new();
    }
    let hit = |s: Option<&str>| s.is_some_and(|s| s.to_lowercase().contains(&q));

    let invitations = self
      .invitations
      .iter()
      .filter(|i| i.status == InvitationStatus::Active && i.covers(now))
      .filter(|i| {
        hit(Some(i.guest_name.as_str()))
          || hit(i.national_id.as_deref())
          || hit(i.plate.as_deref())
      })
      .map(|i| VisitMatch {
        kind:        MatchKind::Invitation,
        id:          i.id,
        name:        i.guest_name.clone(),
        national_id: i.national_id.clone(),
        unit:        Some(i.unit.clone()),
        plate:       i.plate.clone(),
      });

    let local = now.with_timezone(&self.policy.utc_offset);
    let today = local.date_naive();
    let workers = self
      .workers
      .iter()
      .filter(|w| w.status == ApprovalStatus::Approved)
      .filter(|w| {
        hit(Some(w.full_name().as_str())) || hit(Some(w.national_id.as_str()))
      })
      .filter_map(|w| {
        let auth = self.authorizations.iter().find(|a| {
          a.worker_id == w.id
            && a.status == AuthorizationStatus::Active
            && a.covers_date(today)
            && a.permits_day(local.weekday())
        })?;
        Some(VisitMatch {
          kind:        MatchKind::Worker,
          id:          w.id,
          name:        w.full_name(),
          national_id: Some(w.national_id.clone()),
          unit:        Some(auth.unit.clone()),
          plate:       None,
        })
      });

    invitations.chain(workers).collect()
  }

  pub fn stats(&self, now: DateTime<Utc>) -> Stats {
    let midnight = access::start_of_local_day(now, self.policy.utc_offset);
    Stats {
      people_inside: self.ledger.occupancy(),
      visits_today:  self.ledger.entries_since(midnight),
    }
  }

  /// The full ledger, newest first, for export.
  pub fn all_logs(&self) -> Vec<VisitEvent> { self.ledger.all() }

  // ── Invitations ─────────────────────────────────────────────────────────

  pub fn create_invitation(
    &mut self,
    input: NewInvitation,
    now: DateTime<Utc>,
  ) -> Result<Invitation> {
    let inv = input.into_invitation(now)?;
    tracing::info!(id = %inv.id, unit = %inv.unit, kind = %inv.kind, "invitation created");
    self.invitations.push(inv.clone());
    Ok(inv)
  }

  pub fn invitations(&self) -> &[Invitation] { &self.invitations }

  pub fn active_invitations(&self) -> Vec<Invitation> {
    self
      .invitations
      .iter()
      .filter(|i| i.status == InvitationStatus::Active)
      .cloned()
      .collect()
  }

  /// Mark active invitations whose window has passed as expired. Returns how
  /// many changed.
  pub fn expire_invitations(&mut self, now: DateTime<Utc>) -> usize {
    let mut expired = 0;
    for inv in self
      .invitations
      .iter_mut()
      .filter(|i| i.status == InvitationStatus::Active && now > i.valid_to)
    {
      inv.status = InvitationStatus::Expired;
      expired += 1;
    }
    expired
  }

  // ── Workers ─────────────────────────────────────────────────────────────

  /// Register a worker; they start out pending approval.
  pub fn add_worker(&mut self, input: NewWorker) -> Worker {
    let worker = Worker::from(input);
    tracing::info!(id = %worker.id, "worker registered");
    self.workers.push(worker.clone());
    worker
  }

  pub fn set_worker_status(
    &mut self,
    id: Uuid,
    status: ApprovalStatus,
  ) -> Option<Worker> {
    let worker = self.workers.iter_mut().find(|w| w.id == id)?;
    worker.status = status;
    tracing::info!(%id, %status, "worker approval changed");
    Some(worker.clone())
  }

  pub fn workers(&self) -> &[Worker] { &self.workers }

  /// Returns `Ok(None)` if the referenced worker does not exist.
  pub fn add_authorization(
    &mut self,
    input: NewAuthorization,
  ) -> Result<Option<WorkAuthorization>> {
    if !self.workers.iter().any(|w| w.id == input.worker_id) {
      return Ok(None);
    }
    let auth = input.into_authorization()?;
    self.authorizations.push(auth.clone());
    Ok(Some(auth))
  }

  pub fn revoke_authorization(&mut self, id: Uuid) -> Option<WorkAuthorization> {
    let auth = self.authorizations.iter_mut().find(|a| a.id == id)?;
    auth.status = AuthorizationStatus::Revoked;
    Some(auth.clone())
  }

  pub fn authorizations(&self) -> &[WorkAuthorization] { &self.authorizations }

  // ── Emergencies ─────────────────────────────────────────────────────────

  pub fn trigger_emergency(
    &mut self,
    unit: String,
    reporter: String,
    kind: EmergencyKind,
    now: DateTime<Utc>,
  ) -> Emergency {
    self.emergencies.trigger(unit, reporter, kind, now)
  }

  pub fn resolve_emergency(&mut self, id: Uuid, now: DateTime<Utc>) -> bool {
    self.emergencies.resolve(id, now)
  }

  pub fn active_emergencies(&self) -> Vec<Emergency> {
    self.emergencies.active()
  }

  // ── Notifications ───────────────────────────────────────────────────────

  pub fn notify(
    &mut self,
    unit: String,
    title: String,
    message: String,
    kind: NotificationKind,
    now: DateTime<Utc>,
  ) -> Notification {
    self.outbox.enqueue(unit, title, message, kind, now)
  }

  /// Tell a unit a parcel is waiting at the gate.
  pub fn register_package(
    &mut self,
    unit: String,
    company: &str,
    tracking: Option<&str>,
    now: DateTime<Utc>,
  ) -> Notification {
    let mut message =
      format!("A package from {company} is waiting for pickup at the gate.");
    if let Some(t) = tracking.filter(|t| !t.trim().is_empty()) {
      message.push_str(&format!(" Ref: {t}"));
    }
    self.outbox.enqueue(
      unit,
      "New package at the gate".to_owned(),
      message,
      NotificationKind::Info,
      now,
    )
  }

  pub fn unread_for(&self, unit: &str) -> Vec<Notification> {
    self.outbox.unread_for(unit)
  }

  pub fn unread_count(&self) -> usize { self.outbox.unread_count() }

  pub fn mark_read(&mut self, id: Uuid) -> bool { self.outbox.mark_read(id) }

  pub fn mark_all_read(&mut self) -> usize { self.outbox.mark_all_read() }

  pub fn notifications(&self) -> Vec<Notification> { self.outbox.all() }

  // ── Directory ───────────────────────────────────────────────────────────

  pub fn units(&self) -> &[Unit] { &self.units }

  pub fn directory(&self) -> Vec<DirectoryEntry> {
    directory::directory(&self.profiles)
  }
}
