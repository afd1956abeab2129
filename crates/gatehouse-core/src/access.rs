//! Gate validation — "is this credential allowed in, right now?"
//!
//! Evaluation is ordered and first-match: invitations are consulted before
//! workers, and each class runs its checks from coarse (status) to fine
//! (time of day) so the first failure is the most actionable one.

use chrono::{
  DateTime, Datelike as _, FixedOffset, NaiveDate, NaiveTime, Offset as _, Utc,
};
use serde::{Deserialize, Serialize};

use crate::credential::{
  ApprovalStatus, AuthorizationStatus, Credential, Invitation,
  InvitationStatus, WorkAuthorization, Worker, minute_of_day_of,
};

// ─── Policy ──────────────────────────────────────────────────────────────────

/// What to report when an approved worker has no active authorization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingAuthorization {
  /// Report the generic [`Rejection::NotFound`], as if the identifier were
  /// unknown.
  #[default]
  NotFound,
  /// Report [`Rejection::NoAuthorization`].
  Explicit,
}

/// Knobs for [`validate`].
#[derive(Debug, Clone, Copy)]
pub struct AccessPolicy {
  /// Community wall-clock offset. Day-of-week, calendar-date and
  /// minute-of-day checks are evaluated in this offset.
  pub utc_offset:            FixedOffset,
  pub missing_authorization: MissingAuthorization,
}

impl Default for AccessPolicy {
  fn default() -> Self {
    Self {
      utc_offset:            Utc.fix(),
      missing_authorization: MissingAuthorization::default(),
    }
  }
}

// ─── Outcome ─────────────────────────────────────────────────────────────────

/// Why a credential was turned away.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
  #[strum(to_string = "expired or used")]
  ExpiredOrUsed,
  #[strum(to_string = "outside window")]
  OutsideWindow,
  #[strum(to_string = "insurance/approval not granted")]
  NotApproved,
  #[strum(to_string = "day not permitted")]
  DayNotPermitted,
  #[strum(to_string = "date invalid")]
  DateInvalid,
  #[strum(to_string = "outside work hours")]
  OutsideWorkHours,
  #[strum(to_string = "no active authorization")]
  NoAuthorization,
  #[strum(to_string = "not found")]
  NotFound,
}

/// The answer to a gate validation.
///
/// A denial still carries the credential it resolved to (if any) so the guard
/// can see who is at the gate before deciding on an override.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "decision", rename_all = "snake_case")]
pub enum Decision {
  Granted {
    credential: Credential,
  },
  Denied {
    reason:     Rejection,
    credential: Option<Credential>,
  },
}

impl Decision {
  pub fn is_valid(&self) -> bool { matches!(self, Self::Granted { .. }) }

  pub fn reason(&self) -> Option<Rejection> {
    match self {
      Self::Granted { .. } => None,
      Self::Denied { reason, .. } => Some(*reason),
    }
  }

  pub fn credential(&self) -> Option<&Credential> {
    match self {
      Self::Granted { credential } => Some(credential),
      Self::Denied { credential, .. } => credential.as_ref(),
    }
  }

  fn denied(reason: Rejection, credential: Option<Credential>) -> Self {
    Self::Denied { reason, credential }
  }
}

// ─── Catalog view ────────────────────────────────────────────────────────────

/// Borrowed view over the credential catalogs.
#[derive(Debug, Clone, Copy)]
pub struct Catalogs<'a> {
  pub invitations:    &'a [Invitation],
  pub workers:        &'a [Worker],
  pub authorizations: &'a [WorkAuthorization],
}

// ─── Validation ──────────────────────────────────────────────────────────────

/// Decide whether the bearer of `identifier` may enter at `now`.
///
/// `identifier` is either an invitation id (as encoded in its QR payload) or a
/// national-ID number.
pub fn validate(
  catalogs: Catalogs<'_>,
  identifier: &str,
  now: DateTime<Utc>,
  policy: &AccessPolicy,
) -> Decision {
  let identifier = identifier.trim();
  if identifier.is_empty() {
    return Decision::denied(Rejection::NotFound, None);
  }

  if let Some(inv) = invitation_for_now(catalogs.invitations, identifier, now) {
    return validate_invitation(inv, now);
  }

  if let Some(worker) = catalogs
    .workers
    .iter()
    .find(|w| w.national_id == identifier)
  {
    let local = now.with_timezone(&policy.utc_offset);
    return validate_worker(worker, catalogs.authorizations, local, policy);
  }

  Decision::denied(Rejection::NotFound, None)
}

fn validate_invitation(inv: &Invitation, now: DateTime<Utc>) -> Decision {
  let credential = Credential::Invitation(inv.clone());
  if inv.status != InvitationStatus::Active {
    return Decision::denied(Rejection::ExpiredOrUsed, Some(credential));
  }
  if !inv.covers(now) {
    return Decision::denied(Rejection::OutsideWindow, Some(credential));
  }
  Decision::Granted { credential }
}

fn validate_worker(
  worker: &Worker,
  authorizations: &[WorkAuthorization],
  now: DateTime<FixedOffset>,
  policy: &AccessPolicy,
) -> Decision {
  if worker.status != ApprovalStatus::Approved {
    return Decision::denied(
      Rejection::NotApproved,
      Some(Credential::Worker { worker: worker.clone(), authorization: None }),
    );
  }

  let today = now.date_naive();
  let Some(auth) = authorization_for_day(worker, authorizations, today) else {
    return match policy.missing_authorization {
      MissingAuthorization::NotFound => {
        Decision::denied(Rejection::NotFound, None)
      }
      MissingAuthorization::Explicit => Decision::denied(
        Rejection::NoAuthorization,
        Some(Credential::Worker { worker: worker.clone(), authorization: None }),
      ),
    };
  };

  let credential = Credential::Worker {
    worker:        worker.clone(),
    authorization: Some(auth.clone()),
  };

  if !auth.permits_day(now.weekday()) {
    return Decision::denied(Rejection::DayNotPermitted, Some(credential));
  }
  if !auth.covers_date(today) {
    return Decision::denied(Rejection::DateInvalid, Some(credential));
  }
  if let Some(window) = auth.window
    && !window.contains(minute_of_day_of(now.time()))
  {
    return Decision::denied(Rejection::OutsideWorkHours, Some(credential));
  }

  Decision::Granted { credential }
}

/// The worker's active authorization to judge today's visit against.
///
/// One whose date range covers `today` wins; otherwise the first active one is
/// returned so the date check can report it as out of range.
fn authorization_for_day<'a>(
  worker: &Worker,
  authorizations: &'a [WorkAuthorization],
  today: NaiveDate,
) -> Option<&'a WorkAuthorization> {
  let active = || {
    authorizations.iter().filter(|a| {
      a.worker_id == worker.id && a.status == AuthorizationStatus::Active
    })
  };
  active()
    .find(|a| a.covers_date(today))
    .or_else(|| active().next())
}

/// The invitation to judge `identifier` against.
///
/// A guest can hold several invitations under one national ID. A usable one
/// wins; otherwise the first match is returned so its status or window can be
/// reported.
fn invitation_for_now<'a>(
  invitations: &'a [Invitation],
  identifier: &str,
  now: DateTime<Utc>,
) -> Option<&'a Invitation> {
  let matching = || invitations.iter().filter(|i| i.matches(identifier));
  matching()
    .find(|i| i.status == InvitationStatus::Active && i.covers(now))
    .or_else(|| matching().next())
}

/// The instant local midnight began for the day containing `now`.
pub fn start_of_local_day(
  now: DateTime<Utc>,
  offset: FixedOffset,
) -> DateTime<Utc> {
  let local = now.with_timezone(&offset);
  let midnight = local.date_naive().and_time(NaiveTime::MIN);
  midnight
    .and_local_timezone(offset)
    .single()
    .map(|dt| dt.with_timezone(&Utc))
    .unwrap_or(now)
}

#[cfg(test)]
mod tests {
  use chrono::{Duration, TimeZone as _, Weekday};
  use uuid::Uuid;

  use super::*;
  use crate::credential::{
    AccessMode, DailyWindow, InvitationType, WorkerRole,
  };

  // Tuesday, 10:30 UTC.
  fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 10, 10, 30, 0).unwrap()
  }

  fn invitation(from: DateTime<Utc>, to: DateTime<Utc>) -> Invitation {
    Invitation {
      id:          Uuid::new_v4(),
      unit:        "UF 61".into(),
      guest_name:  "Laura Vivas".into(),
      national_id: Some("30.111.222".into()),
      plate:       Some("KTY 888".into()),
      kind:        InvitationType::Single,
      valid_from:  from,
      valid_to:    to,
      status:      InvitationStatus::Active,
      created_by:  None,
    }
  }

  fn worker(status: ApprovalStatus) -> Worker {
    Worker {
      id: Uuid::new_v4(),
      first_name: "Pedro".into(),
      last_name: "Pintor".into(),
      national_id: "20.444.444".into(),
      role: WorkerRole::Painter,
      status,
    }
  }

  fn authorization(worker: &Worker) -> WorkAuthorization {
    WorkAuthorization {
      id:         Uuid::new_v4(),
      worker_id:  worker.id,
      unit:       "UF 15".into(),
      mode:       AccessMode::DateRange,
      start_date: NaiveDate::from_ymd_opt(2026, 3, 1).unwrap(),
      end_date:   NaiveDate::from_ymd_opt(2026, 3, 31).unwrap(),
      days:       None,
      window:     None,
      status:     AuthorizationStatus::Active,
    }
  }

  fn hm(h: u32, m: u32) -> NaiveTime { NaiveTime::from_hms_opt(h, m, 0).unwrap() }

  fn check(
    invitations: &[Invitation],
    workers: &[Worker],
    authorizations: &[WorkAuthorization],
    identifier: &str,
  ) -> Decision {
    let catalogs = Catalogs { invitations, workers, authorizations };
    validate(catalogs, identifier, now(), &AccessPolicy::default())
  }

  // ─── Invitations ──────────────────────────────────────────────────────────

  #[test]
  fn active_invitation_inside_window_is_granted() {
    let inv = invitation(now() - Duration::hours(1), now() + Duration::hours(1));
    let d = check(std::slice::from_ref(&inv), &[], &[], &inv.id.to_string());
    assert!(d.is_valid());
    assert!(matches!(
      d.credential(),
      Some(Credential::Invitation(i)) if i.id == inv.id
    ));
  }

  #[test]
  fn invitation_found_by_national_id() {
    let inv = invitation(now() - Duration::hours(1), now() + Duration::hours(1));
    let d = check(&[inv], &[], &[], "30.111.222");
    assert!(d.is_valid());
  }

  #[test]
  fn window_bounds_are_inclusive() {
    let at_start = invitation(now(), now() + Duration::hours(1));
    let at_end = invitation(now() - Duration::hours(1), now());
    for inv in [at_start, at_end] {
      let id = inv.id.to_string();
      assert!(check(&[inv], &[], &[], &id).is_valid());
    }
  }

  #[test]
  fn invitation_past_its_window_is_outside_window() {
    // Valid [T, T+24h], presented at T+25h.
    let t = now() - Duration::hours(25);
    let inv = invitation(t, t + Duration::hours(24));
    let d = check(&[inv.clone()], &[], &[], &inv.id.to_string());
    assert!(!d.is_valid());
    assert_eq!(d.reason(), Some(Rejection::OutsideWindow));
    assert_eq!(d.reason().unwrap().to_string(), "outside window");
  }

  #[test]
  fn invitation_not_yet_valid_is_outside_window() {
    let inv = invitation(now() + Duration::minutes(1), now() + Duration::hours(2));
    let d = check(&[inv.clone()], &[], &[], &inv.id.to_string());
    assert_eq!(d.reason(), Some(Rejection::OutsideWindow));
  }

  #[test]
  fn used_or_expired_invitation_is_rejected_before_window_check() {
    for status in [InvitationStatus::Used, InvitationStatus::Expired] {
      let mut inv =
        invitation(now() - Duration::hours(1), now() + Duration::hours(1));
      inv.status = status;
      let d = check(&[inv.clone()], &[], &[], &inv.id.to_string());
      assert_eq!(d.reason(), Some(Rejection::ExpiredOrUsed));
      assert_eq!(d.reason().unwrap().to_string(), "expired or used");
    }
  }

  #[test]
  fn invitation_wins_over_worker_with_same_national_id() {
    let mut inv =
      invitation(now() - Duration::hours(1), now() + Duration::hours(1));
    inv.national_id = Some("20.444.444".into());
    inv.status = InvitationStatus::Used;
    let w = worker(ApprovalStatus::Approved);
    let a = authorization(&w);
    let d = check(&[inv], &[w], &[a], "20.444.444");
    assert_eq!(d.reason(), Some(Rejection::ExpiredOrUsed));
  }

  // ─── Workers ──────────────────────────────────────────────────────────────

  #[test]
  fn approved_worker_with_covering_range_is_granted() {
    let w = worker(ApprovalStatus::Approved);
    let a = authorization(&w);
    let d = check(&[], &[w.clone()], &[a.clone()], "20.444.444");
    assert!(d.is_valid());
    match d.credential() {
      Some(Credential::Worker { worker, authorization: Some(auth) }) => {
        assert_eq!(worker.id, w.id);
        assert_eq!(auth.id, a.id);
      }
      other => panic!("unexpected credential: {other:?}"),
    }
  }

  #[test]
  fn unapproved_worker_is_rejected_regardless_of_authorization() {
    for status in [ApprovalStatus::Pending, ApprovalStatus::Rejected] {
      let w = worker(status);
      let a = authorization(&w);
      let d = check(&[], &[w], &[a], "20.444.444");
      assert_eq!(d.reason(), Some(Rejection::NotApproved));
      assert!(d.reason().unwrap().to_string().contains("approval not granted"));
    }
  }

  #[test]
  fn missing_authorization_falls_through_to_not_found_by_default() {
    let w = worker(ApprovalStatus::Approved);
    let d = check(&[], &[w], &[], "20.444.444");
    assert_eq!(d.reason(), Some(Rejection::NotFound));
    assert!(d.credential().is_none());
  }

  #[test]
  fn missing_authorization_can_be_reported_explicitly() {
    let w = worker(ApprovalStatus::Approved);
    let mut revoked = authorization(&w);
    revoked.status = AuthorizationStatus::Revoked;
    let policy = AccessPolicy {
      missing_authorization: MissingAuthorization::Explicit,
      ..AccessPolicy::default()
    };
    let catalogs = Catalogs {
      invitations:    &[],
      workers:        std::slice::from_ref(&w),
      authorizations: std::slice::from_ref(&revoked),
    };
    let d = validate(catalogs, "20.444.444", now(), &policy);
    assert_eq!(d.reason(), Some(Rejection::NoAuthorization));
  }

  #[test]
  fn restricted_days_are_enforced() {
    let w = worker(ApprovalStatus::Approved);
    let mut a = authorization(&w);
    a.days = Some(vec![Weekday::Mon, Weekday::Wed]);
    let d = check(&[], &[w.clone()], &[a.clone()], "20.444.444");
    assert_eq!(d.reason(), Some(Rejection::DayNotPermitted));

    a.days = Some(vec![Weekday::Tue]);
    assert!(check(&[], &[w], &[a], "20.444.444").is_valid());
  }

  #[test]
  fn expired_date_range_is_date_invalid() {
    let w = worker(ApprovalStatus::Approved);
    let mut a = authorization(&w);
    a.start_date = NaiveDate::from_ymd_opt(2026, 2, 1).unwrap();
    a.end_date = NaiveDate::from_ymd_opt(2026, 3, 9).unwrap();
    let d = check(&[], &[w], &[a], "20.444.444");
    assert_eq!(d.reason(), Some(Rejection::DateInvalid));
  }

  #[test]
  fn single_day_authorization_covers_the_whole_day() {
    let w = worker(ApprovalStatus::Approved);
    let mut a = authorization(&w);
    a.mode = AccessMode::SingleDay;
    a.start_date = now().date_naive();
    a.end_date = now().date_naive();
    assert!(check(&[], &[w], &[a], "20.444.444").is_valid());
  }

  #[test]
  fn covering_authorization_is_preferred_over_stale_one() {
    let w = worker(ApprovalStatus::Approved);
    let mut stale = authorization(&w);
    stale.start_date = NaiveDate::from_ymd_opt(2026, 1, 1).unwrap();
    stale.end_date = NaiveDate::from_ymd_opt(2026, 1, 31).unwrap();
    let current = authorization(&w);
    let d = check(&[], &[w], &[stale, current.clone()], "20.444.444");
    assert!(d.is_valid());
    assert_eq!(d.credential().and_then(Credential::unit), Some("UF 15"));
  }

  #[test]
  fn daily_window_is_checked_at_minute_precision() {
    let w = worker(ApprovalStatus::Approved);
    let mut a = authorization(&w);
    a.window = Some(DailyWindow { start: hm(8, 0), end: hm(10, 30) });
    assert!(check(&[], &[w.clone()], &[a.clone()], "20.444.444").is_valid());

    a.window = Some(DailyWindow { start: hm(8, 0), end: hm(10, 29) });
    let d = check(&[], &[w], &[a], "20.444.444");
    assert_eq!(d.reason(), Some(Rejection::OutsideWorkHours));
  }

  #[test]
  fn schedule_checks_use_community_offset() {
    // 10:30 UTC is 07:30 at UTC-3.
    let w = worker(ApprovalStatus::Approved);
    let mut a = authorization(&w);
    a.window = Some(DailyWindow { start: hm(8, 0), end: hm(17, 0) });
    let policy = AccessPolicy {
      utc_offset: FixedOffset::west_opt(3 * 3600).unwrap(),
      ..AccessPolicy::default()
    };
    let catalogs = Catalogs {
      invitations:    &[],
      workers:        std::slice::from_ref(&w),
      authorizations: std::slice::from_ref(&a),
    };
    let d = validate(catalogs, "20.444.444", now(), &policy);
    assert_eq!(d.reason(), Some(Rejection::OutsideWorkHours));
  }

  #[test]
  fn unknown_and_blank_identifiers_are_not_found() {
    assert_eq!(check(&[], &[], &[], "nobody").reason(), Some(Rejection::NotFound));
    assert_eq!(check(&[], &[], &[], "   ").reason(), Some(Rejection::NotFound));
  }

  #[test]
  fn start_of_local_day_respects_offset() {
    let offset = FixedOffset::west_opt(3 * 3600).unwrap();
    let late = Utc.with_ymd_and_hms(2026, 3, 11, 1, 0, 0).unwrap();
    // 01:00 UTC on the 11th is 22:00 on the 10th locally.
    assert_eq!(
      start_of_local_day(late, offset),
      Utc.with_ymd_and_hms(2026, 3, 10, 3, 0, 0).unwrap()
    );
  }
}
