//! Per-unit notifications, pulled by polling dashboards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationKind {
  Success,
  Warning,
  Info,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
  pub id:        Uuid,
  pub unit:      String,
  pub title:     String,
  pub message:   String,
  pub kind:      NotificationKind,
  pub read:      bool,
  pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewNotification {
  pub unit:    String,
  pub title:   String,
  pub message: String,
  pub kind:    NotificationKind,
}

/// A parcel left at the gate for a unit.
#[derive(Debug, Clone, Deserialize)]
pub struct PackageNotice {
  pub unit:     String,
  pub company:  String,
  pub tracking: Option<String>,
}

/// In-memory retention only. Notifications are never deleted.
#[derive(Debug, Clone, Default)]
pub struct NotificationOutbox {
  notifications: Vec<Notification>,
}

impl NotificationOutbox {
  pub fn new() -> Self { Self::default() }

  pub fn enqueue(
    &mut self,
    unit: String,
    title: String,
    message: String,
    kind: NotificationKind,
    now: DateTime<Utc>,
  ) -> Notification {
    let n = Notification {
      id: Uuid::new_v4(),
      unit,
      title,
      message,
      kind,
      read: false,
      timestamp: now,
    };
    tracing::debug!(id = %n.id, unit = %n.unit, kind = %n.kind, "notification enqueued");
    self.notifications.push(n.clone());
    n
  }

  pub fn unread_for(&self, unit: &str) -> Vec<Notification> {
    self
      .notifications
      .iter()
      .filter(|n| n.unit == unit && !n.read)
      .cloned()
      .collect()
  }

  pub fn unread_count(&self) -> usize {
    self.notifications.iter().filter(|n| !n.read).count()
  }

  /// Returns `false` if `id` is unknown.
  pub fn mark_read(&mut self, id: Uuid) -> bool {
    match self.notifications.iter_mut().find(|n| n.id == id) {
      Some(n) => {
        n.read = true;
        true
      }
      None => false,
    }
  }

  /// Returns how many notifications changed state.
  pub fn mark_all_read(&mut self) -> usize {
    let mut changed = 0;
    for n in self.notifications.iter_mut().filter(|n| !n.read) {
      n.read = true;
      changed += 1;
    }
    changed
  }

  /// Every notification, newest first.
  pub fn all(&self) -> Vec<Notification> {
    let mut all = self.notifications.clone();
    all.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
    all
  }
}
