//! Credentials — the things a person presents at the gate.
//!
//! There are two identity classes: resident-issued [`Invitation`]s, and
//! [`Worker`]s admitted through one of their [`WorkAuthorization`]s. The two
//! never overlap; a presented identifier resolves to at most one of them.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Invitations ─────────────────────────────────────────────────────────────

/// How long an invitation is meant to be used for.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvitationType {
  /// Consumed by the first admission.
  #[default]
  Single,
  /// Reusable for the whole validity window.
  Range,
  /// Reusable; issued for a gathering.
  Event,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum InvitationStatus {
  #[default]
  Active,
  Used,
  Expired,
}

/// A guest pass issued by a resident for their unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Invitation {
  pub id:          Uuid,
  /// Host unit key, e.g. `"UF 61"`.
  pub unit:        String,
  pub guest_name:  String,
  pub national_id: Option<String>,
  pub plate:       Option<String>,
  #[serde(default)]
  pub kind:        InvitationType,
  /// Inclusive lower bound.
  pub valid_from:  DateTime<Utc>,
  /// Inclusive upper bound.
  pub valid_to:    DateTime<Utc>,
  #[serde(default)]
  pub status:      InvitationStatus,
  /// Profile that issued the invitation, if known.
  pub created_by:  Option<String>,
}

impl Invitation {
  /// Whether `identifier` is this invitation's id (as carried in its QR
  /// payload) or the guest's national ID.
  pub fn matches(&self, identifier: &str) -> bool {
    Uuid::parse_str(identifier).is_ok_and(|id| id == self.id)
      || self.national_id.as_deref() == Some(identifier)
  }

  pub fn covers(&self, now: DateTime<Utc>) -> bool {
    self.valid_from <= now && now <= self.valid_to
  }
}

/// Input to [`crate::registry::Gatehouse::create_invitation`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewInvitation {
  pub unit:        String,
  pub guest_name:  String,
  pub national_id: Option<String>,
  pub plate:       Option<String>,
  pub kind:        Option<InvitationType>,
  /// Defaults to the creation instant.
  pub valid_from:  Option<DateTime<Utc>>,
  /// Defaults to 24 hours after `valid_from`.
  pub valid_to:    Option<DateTime<Utc>>,
  pub created_by:  Option<String>,
}

impl NewInvitation {
  pub fn into_invitation(self, now: DateTime<Utc>) -> Result<Invitation> {
    let valid_from = self.valid_from.unwrap_or(now);
    let valid_to = self.valid_to.unwrap_or(valid_from + Duration::hours(24));
    if valid_from > valid_to {
      return Err(Error::InvalidWindow {
        from: valid_from.to_rfc3339(),
        to:   valid_to.to_rfc3339(),
      });
    }
    Ok(Invitation {
      id: Uuid::new_v4(),
      unit: self.unit,
      guest_name: self.guest_name,
      national_id: self.national_id.filter(|s| !s.trim().is_empty()),
      plate: self.plate.filter(|s| !s.trim().is_empty()),
      kind: self.kind.unwrap_or_default(),
      valid_from,
      valid_to,
      status: InvitationStatus::Active,
      created_by: self.created_by,
    })
  }
}

// ─── Workers ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkerRole {
  Painter,
  Gardener,
  Mason,
  Plumber,
  Electrician,
  Delivery,
  Other,
}

/// Insurance / administrative approval. Gates every authorization the worker
/// holds, regardless of dates.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ApprovalStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Worker {
  pub id:          Uuid,
  pub first_name:  String,
  pub last_name:   String,
  pub national_id: String,
  pub role:        WorkerRole,
  #[serde(default)]
  pub status:      ApprovalStatus,
}

impl Worker {
  pub fn full_name(&self) -> String {
    format!("{} {}", self.first_name, self.last_name)
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewWorker {
  pub first_name:  String,
  pub last_name:   String,
  pub national_id: String,
  pub role:        WorkerRole,
}

impl From<NewWorker> for Worker {
  fn from(w: NewWorker) -> Self {
    Worker {
      id:          Uuid::new_v4(),
      first_name:  w.first_name,
      last_name:   w.last_name,
      national_id: w.national_id,
      role:        w.role,
      status:      ApprovalStatus::Pending,
    }
  }
}

// ─── Work authorizations ─────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessMode {
  SingleDay,
  DateRange,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  strum::Display,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum AuthorizationStatus {
  #[default]
  Active,
  Expired,
  Revoked,
}

/// A daily time-of-day window, inclusive at both ends, minute precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyWindow {
  #[serde(with = "hh_mm")]
  pub start: NaiveTime,
  #[serde(with = "hh_mm")]
  pub end:   NaiveTime,
}

impl DailyWindow {
  pub fn contains(&self, minute_of_day: u32) -> bool {
    minute_of_day_of(self.start) <= minute_of_day
      && minute_of_day <= minute_of_day_of(self.end)
  }
}

pub(crate) fn minute_of_day_of(t: NaiveTime) -> u32 {
  use chrono::Timelike as _;
  t.hour() * 60 + t.minute()
}

/// Permission for a worker to enter on behalf of a unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkAuthorization {
  pub id:         Uuid,
  pub worker_id:  Uuid,
  pub unit:       String,
  pub mode:       AccessMode,
  pub start_date: NaiveDate,
  /// Inclusive. Equal to `start_date` for [`AccessMode::SingleDay`].
  pub end_date:   NaiveDate,
  /// Permitted weekdays; `None` means every day.
  pub days:       Option<Vec<Weekday>>,
  pub window:     Option<DailyWindow>,
  #[serde(default)]
  pub status:     AuthorizationStatus,
}

impl WorkAuthorization {
  pub fn covers_date(&self, date: NaiveDate) -> bool {
    self.start_date <= date && date <= self.end_date
  }

  pub fn permits_day(&self, day: Weekday) -> bool {
    self.days.as_ref().is_none_or(|days| days.contains(&day))
  }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewAuthorization {
  pub worker_id:  Uuid,
  pub unit:       String,
  pub mode:       AccessMode,
  pub start_date: NaiveDate,
  /// Ignored for [`AccessMode::SingleDay`].
  pub end_date:   Option<NaiveDate>,
  pub days:       Option<Vec<Weekday>>,
  pub window:     Option<DailyWindow>,
}

impl NewAuthorization {
  pub fn into_authorization(self) -> Result<WorkAuthorization> {
    let end_date = match self.mode {
      AccessMode::SingleDay => self.start_date,
      AccessMode::DateRange => self.end_date.unwrap_or(self.start_date),
    };
    if self.start_date > end_date {
      return Err(Error::InvalidWindow {
        from: self.start_date.to_string(),
        to:   end_date.to_string(),
      });
    }
    if let Some(w) = self.window
      && w.start > w.end
    {
      return Err(Error::InvalidWindow {
        from: w.start.format("%H:%M").to_string(),
        to:   w.end.format("%H:%M").to_string(),
      });
    }
    Ok(WorkAuthorization {
      id: Uuid::new_v4(),
      worker_id: self.worker_id,
      unit: self.unit,
      mode: self.mode,
      start_date: self.start_date,
      end_date,
      days: self.days.filter(|d| !d.is_empty()),
      window: self.window,
      status: AuthorizationStatus::Active,
    })
  }
}

// ─── Credential ──────────────────────────────────────────────────────────────

/// What a presented identifier resolved to.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "entity", rename_all = "snake_case")]
pub enum Credential {
  Invitation(Invitation),
  Worker {
    worker:        Worker,
    /// The authorization the decision was made against, when one exists.
    authorization: Option<WorkAuthorization>,
  },
}

impl Credential {
  pub fn display_name(&self) -> String {
    match self {
      Self::Invitation(inv) => inv.guest_name.clone(),
      Self::Worker { worker, .. } => worker.full_name(),
    }
  }

  pub fn national_id(&self) -> Option<&str> {
    match self {
      Self::Invitation(inv) => inv.national_id.as_deref(),
      Self::Worker { worker, .. } => Some(&worker.national_id),
    }
  }

  /// Destination unit, when the credential names one.
  pub fn unit(&self) -> Option<&str> {
    match self {
      Self::Invitation(inv) => Some(&inv.unit),
      Self::Worker { authorization, .. } => {
        authorization.as_ref().map(|a| a.unit.as_str())
      }
    }
  }

  pub fn plate(&self) -> Option<&str> {
    match self {
      Self::Invitation(inv) => inv.plate.as_deref(),
      Self::Worker { .. } => None,
    }
  }
}

// ─── Serde helpers ───────────────────────────────────────────────────────────

/// `NaiveTime` as `"HH:MM"`; seconds are accepted on input and dropped.
mod hh_mm {
  use chrono::NaiveTime;
  use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

  pub fn serialize<S: Serializer>(
    t: &NaiveTime,
    s: S,
  ) -> Result<S::Ok, S::Error> {
    s.collect_str(&t.format("%H:%M"))
  }

  pub fn deserialize<'de, D: Deserializer<'de>>(
    d: D,
  ) -> Result<NaiveTime, D::Error> {
    let raw = String::deserialize(d)?;
    NaiveTime::parse_from_str(&raw, "%H:%M")
      .or_else(|_| NaiveTime::parse_from_str(&raw, "%H:%M:%S"))
      .map_err(|e| D::Error::custom(format!("invalid time {raw:?}: {e}")))
  }
}
