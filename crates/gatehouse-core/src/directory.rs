//! Units and the people attached to them. Read-only bootstrap data.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
  Admin,
  Guard,
  Owner,
  Tenant,
  Resident,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitStatus {
  #[default]
  UpToDate,
  Debt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContactPriority {
  Primary,
  Secondary,
  Emergency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitContact {
  pub name:     String,
  pub phone:    String,
  pub priority: ContactPriority,
}

/// A lot or apartment. Residents and vehicles refer to it by `number`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Unit {
  pub id:       String,
  /// Display key, e.g. `"UF 61"`.
  pub number:   String,
  #[serde(default)]
  pub status:   UnitStatus,
  #[serde(default)]
  pub contacts: Vec<UnitContact>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Profile {
  pub id:         String,
  pub role:       Role,
  pub first_name: String,
  pub last_name:  String,
  pub phone:      Option<String>,
  pub email:      Option<String>,
  /// Unit key (`Unit::number`) for residents.
  pub unit:       Option<String>,
}

/// One row of the guard-facing resident directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryEntry {
  pub name:  String,
  pub unit:  Option<String>,
  pub phone: Option<String>,
  pub role:  Role,
}

/// Owners and tenants, sorted by unit.
pub fn directory(profiles: &[Profile]) -> Vec<DirectoryEntry> {
  let mut entries: Vec<_> = profiles
    .iter()
    .filter(|p| matches!(p.role, Role::Owner | Role::Tenant))
    .map(|p| DirectoryEntry {
      name:  format!("{} {}", p.first_name, p.last_name),
      unit:  p.unit.clone(),
      phone: p.phone.clone(),
      role:  p.role,
    })
    .collect();
  entries.sort_by(|a, b| {
    a.unit.as_deref().unwrap_or("").cmp(b.unit.as_deref().unwrap_or(""))
  });
  entries
}

#[cfg(test)]
mod tests {
  use super::*;

  fn profile(id: &str, role: Role, unit: Option<&str>) -> Profile {
    Profile {
      id:         id.into(),
      role,
      first_name: id.into(),
      last_name:  "Demo".into(),
      phone:      None,
      email:      None,
      unit:       unit.map(Into::into),
    }
  }

  #[test]
  fn directory_lists_owners_and_tenants_by_unit() {
    let profiles = [
      profile("guard", Role::Guard, None),
      profile("b", Role::Tenant, Some("UF 3")),
      profile("a", Role::Owner, Some("UF 2")),
      profile("admin", Role::Admin, None),
    ];
    let dir = directory(&profiles);
    let units: Vec<_> = dir.iter().map(|d| d.unit.as_deref()).collect();
    assert_eq!(units, [Some("UF 2"), Some("UF 3")]);
    assert_eq!(dir[0].name, "a Demo");
  }
}
