//! SOS alerts: `none → ACTIVE → RESOLVED`.
//!
//! An alert stays active until a guard resolves it. There is no timeout and no
//! re-opening.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EmergencyKind {
  Medical,
  Security,
}

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EmergencyStatus {
  Active,
  Resolved,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Emergency {
  pub id:          Uuid,
  pub unit:        String,
  pub reporter:    String,
  pub kind:        EmergencyKind,
  pub status:      EmergencyStatus,
  pub created_at:  DateTime<Utc>,
  pub resolved_at: Option<DateTime<Utc>>,
}

/// A resident's SOS request.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEmergency {
  pub unit:     String,
  pub reporter: String,
  pub kind:     EmergencyKind,
}

#[derive(Debug, Clone, Default)]
pub struct EmergencyChannel {
  emergencies: Vec<Emergency>,
}

impl EmergencyChannel {
  pub fn new() -> Self { Self::default() }

  pub fn trigger(
    &mut self,
    unit: String,
    reporter: String,
    kind: EmergencyKind,
    now: DateTime<Utc>,
  ) -> Emergency {
    let emergency = Emergency {
      id: Uuid::new_v4(),
      unit,
      reporter,
      kind,
      status: EmergencyStatus::Active,
      created_at: now,
      resolved_at: None,
    };
    tracing::warn!(
      id = %emergency.id,
      unit = %emergency.unit,
      kind = %emergency.kind,
      "emergency triggered"
    );
    self.emergencies.push(emergency.clone());
    emergency
  }

  /// Resolve `id`. Returns `false` only when no such emergency exists; a
  /// repeated resolve keeps the first resolution time.
  pub fn resolve(&mut self, id: Uuid, now: DateTime<Utc>) -> bool {
    let Some(e) = self.emergencies.iter_mut().find(|e| e.id == id) else {
      return false;
    };
    if e.status == EmergencyStatus::Active {
      e.status = EmergencyStatus::Resolved;
      e.resolved_at = Some(now);
      tracing::info!(id = %e.id, unit = %e.unit, "emergency resolved");
    }
    true
  }

  pub fn active(&self) -> Vec<Emergency> {
    self
      .emergencies
      .iter()
      .filter(|e| e.status == EmergencyStatus::Active)
      .cloned()
      .collect()
  }

  pub fn get(&self, id: Uuid) -> Option<&Emergency> {
    self.emergencies.iter().find(|e| e.id == id)
  }
}
