//! The visit ledger — an append-only log of gate crossings.
//!
//! Every admission appends an `in` event. An exit stamps `exit_time` on that
//! event and appends a companion `out` event for audit symmetry. The set of
//! `in` events without an `exit_time` is the authoritative "who is inside".

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result};

/// How an entry was recorded at the gate.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
  strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EntryMethod {
  #[default]
  Qr,
  Manual,
  Remote,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Direction {
  In,
  Out,
}

/// Who crossed the gate, and where they were headed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisitDetails {
  pub guest_name:    String,
  pub national_id:   Option<String>,
  /// Destination unit key.
  pub unit:          String,
  pub vehicle_plate: Option<String>,
  pub direction:     Direction,
}

/// One ledger entry. Only `exit_time` is ever written after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VisitEvent {
  pub id:              Uuid,
  pub timestamp:       DateTime<Utc>,
  /// Name of whoever recorded the event (usually the guard on duty).
  pub actor:           String,
  pub method:          EntryMethod,
  pub is_forced_entry: bool,
  pub forced_reason:   Option<String>,
  pub details:         VisitDetails,
  #[serde(default)]
  pub exit_time:       Option<DateTime<Utc>>,
}

impl VisitEvent {
  /// An `in` event nobody has exited yet.
  pub fn is_open(&self) -> bool {
    self.details.direction == Direction::In && self.exit_time.is_none()
  }
}

/// Input to [`VisitLedger::record_entry`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewVisit {
  #[serde(default)]
  pub actor:         String,
  #[serde(default)]
  pub method:        EntryMethod,
  pub guest_name:    String,
  pub national_id:   Option<String>,
  pub unit:          String,
  pub vehicle_plate: Option<String>,
  /// Set to record a forced entry; must not be blank.
  pub forced_reason: Option<String>,
}

/// Result of [`VisitLedger::record_exit`].
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ExitOutcome {
  /// The visit was open and is now closed.
  Closed {
    entry: VisitEvent,
    /// The companion `out` event appended for the audit trail.
    exit:  VisitEvent,
  },
  /// The event exists but is not an open visit; nothing changed.
  AlreadyClosed,
  NotFound,
}

impl ExitOutcome {
  pub fn existed(&self) -> bool { !matches!(self, Self::NotFound) }
}

/// Placeholder names used when a caller leaves a field blank.
const UNKNOWN_GUEST: &str = "Unknown";
const UNKNOWN_UNIT: &str = "No unit";
const DEFAULT_ACTOR: &str = "Guard";

// ─── Ledger ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default)]
pub struct VisitLedger {
  events: Vec<VisitEvent>,
}

impl VisitLedger {
  pub fn new() -> Self { Self::default() }

  /// Start from previously recorded events (e.g. seed data).
  pub fn from_events(events: Vec<VisitEvent>) -> Self { Self { events } }

  /// Append an `in` event. Never rejects a well-formed visit; an entry that
  /// duplicates an open visit is recorded and logged.
  pub fn record_entry(
    &mut self,
    input: NewVisit,
    now: DateTime<Utc>,
  ) -> Result<VisitEvent> {
    let forced_reason = match input.forced_reason {
      Some(r) if r.trim().is_empty() => return Err(Error::MissingForcedReason),
      Some(r) => Some(r.trim().to_owned()),
      None => None,
    };

    let details = VisitDetails {
      guest_name:    non_blank(input.guest_name, UNKNOWN_GUEST),
      national_id:   input.national_id.filter(|s| !s.trim().is_empty()),
      unit:          non_blank(input.unit, UNKNOWN_UNIT),
      vehicle_plate: input.vehicle_plate.filter(|s| !s.trim().is_empty()),
      direction:     Direction::In,
    };

    if let Some(open) = self.find_open(&details) {
      tracing::warn!(
        open_visit = %open.id,
        guest = %details.guest_name,
        unit = %details.unit,
        "recording entry for a visitor who is already inside"
      );
    }

    let event = VisitEvent {
      id: Uuid::new_v4(),
      timestamp: now,
      actor: non_blank(input.actor, DEFAULT_ACTOR),
      method: input.method,
      is_forced_entry: forced_reason.is_some(),
      forced_reason,
      details,
      exit_time: None,
    };
    self.events.push(event.clone());
    Ok(event)
  }

  /// Close the open visit `id`.
  ///
  /// Idempotent: an already-closed visit reports
  /// [`ExitOutcome::AlreadyClosed`] and keeps its original `exit_time`.
  pub fn record_exit(
    &mut self,
    id: Uuid,
    actor: &str,
    now: DateTime<Utc>,
  ) -> ExitOutcome {
    let Some(entry) = self.events.iter_mut().find(|e| e.id == id) else {
      return ExitOutcome::NotFound;
    };
    if !entry.is_open() {
      return ExitOutcome::AlreadyClosed;
    }
    entry.exit_time = Some(now);
    let entry = entry.clone();

    let exit = VisitEvent {
      id:              Uuid::new_v4(),
      timestamp:       now,
      actor:           non_blank(actor.to_owned(), DEFAULT_ACTOR),
      method:          EntryMethod::Manual,
      is_forced_entry: false,
      forced_reason:   None,
      details:         VisitDetails {
        direction: Direction::Out,
        ..entry.details.clone()
      },
      exit_time:       None,
    };
    self.events.push(exit.clone());
    ExitOutcome::Closed { entry, exit }
  }

  pub fn get(&self, id: Uuid) -> Option<&VisitEvent> {
    self.events.iter().find(|e| e.id == id)
  }

  /// Open visits, oldest first.
  pub fn active(&self) -> impl Iterator<Item = &VisitEvent> {
    self.events.iter().filter(|e| e.is_open())
  }

  pub fn occupancy(&self) -> usize { self.active().count() }

  /// Number of `in` events at or after `since`.
  pub fn entries_since(&self, since: DateTime<Utc>) -> usize {
    self
      .events
      .iter()
      .filter(|e| e.details.direction == Direction::In && e.timestamp >= since)
      .count()
  }

  /// The full ledger, newest first.
  pub fn all(&self) -> Vec<VisitEvent> {
    let mut events = self.events.clone();
    events.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    events
  }

  pub fn len(&self) -> usize { self.events.len() }

  pub fn is_empty(&self) -> bool { self.events.is_empty() }

  /// An open visit for the same person and unit: matched on national ID when
  /// both sides carry one, on name otherwise.
  fn find_open(&self, details: &VisitDetails) -> Option<&VisitEvent> {
    self.active().find(|e| {
      e.details.unit == details.unit
        && match (&e.details.national_id, &details.national_id) {
          (Some(a), Some(b)) => a == b,
          _ => e.details.guest_name.eq_ignore_ascii_case(&details.guest_name),
        }
    })
  }
}

fn non_blank(value: String, fallback: &str) -> String {
  if value.trim().is_empty() { fallback.to_owned() } else { value }
}
