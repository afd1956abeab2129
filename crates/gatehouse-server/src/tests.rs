//! Router tests: the assembled app driven with `oneshot`.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use gatehouse_core::access::AccessPolicy;
use gatehouse_store_memory::{MemoryStore, load_seed};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

use super::{ServerConfig, app};

fn fresh() -> Router { app(Arc::new(MemoryStore::new(AccessPolicy::default()))) }

async fn send(
  app: &Router,
  method: &str,
  uri: &str,
  body: Option<Value>,
) -> (StatusCode, Value) {
  let mut builder = Request::builder().method(method).uri(uri);
  let body = match body {
    Some(v) => {
      builder = builder.header(header::CONTENT_TYPE, "application/json");
      Body::from(v.to_string())
    }
    None => Body::empty(),
  };
  let resp = app
    .clone()
    .oneshot(builder.body(body).unwrap())
    .await
    .unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
    .await
    .unwrap();
  let value = if bytes.is_empty() {
    Value::Null
  } else {
    serde_json::from_slice(&bytes).unwrap_or(Value::Null)
  };
  (status, value)
}

fn visit(name: &str, unit: &str) -> Value {
  json!({ "actor": "Carlos", "guest_name": name, "unit": unit })
}

// ── Health & config ──────────────────────────────────────────────────────────

#[tokio::test]
async fn health_is_ok() {
  let resp = fresh()
    .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
    .await
    .unwrap();
  assert_eq!(resp.status(), StatusCode::OK);
}

#[test]
fn config_builds_policy_and_sweep() {
  let cfg = ServerConfig { utc_offset_minutes: -180, ..Default::default() };
  let policy = cfg.policy().unwrap();
  assert_eq!(policy.utc_offset.local_minus_utc(), -180 * 60);
  assert!(cfg.sweep_interval().is_some());

  let off = ServerConfig { sweep_interval_secs: 0, ..Default::default() };
  assert!(off.sweep_interval().is_none());

  let bad = ServerConfig { utc_offset_minutes: 24 * 60, ..Default::default() };
  assert!(bad.policy().is_err());
}

#[test]
fn seed_path_is_relative_to_the_config_file() {
  let cfg = ServerConfig {
    seed_path: Some("seed.json".into()),
    ..Default::default()
  };
  assert_eq!(
    cfg.resolve_seed_path(Path::new("crates/gatehouse-server/config.toml")),
    Some(PathBuf::from("crates/gatehouse-server/seed.json"))
  );
  assert_eq!(
    cfg.resolve_seed_path(Path::new("config.toml")),
    Some(PathBuf::from("seed.json"))
  );

  let absolute = ServerConfig {
    seed_path: Some("/srv/gate/seed.json".into()),
    ..Default::default()
  };
  assert_eq!(
    absolute.resolve_seed_path(Path::new("/etc/gatehouse/config.toml")),
    Some(PathBuf::from("/srv/gate/seed.json"))
  );

  assert!(
    ServerConfig::default()
      .resolve_seed_path(Path::new("config.toml"))
      .is_none()
  );
}

// ── Validation ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn unknown_identifier_is_not_found() {
  let app = fresh();
  let (status, body) =
    send(&app, "POST", "/api/validate", Some(json!({ "identifier": "99.999.999" })))
      .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(body["decision"], "denied");
  assert_eq!(body["reason"], "not_found");
}

#[tokio::test]
async fn blank_identifier_is_bad_request() {
  let app = fresh();
  let (status, body) =
    send(&app, "POST", "/api/validate", Some(json!({ "identifier": "  " }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].is_string());
}

#[tokio::test]
async fn single_invitation_is_consumed_by_admit() {
  let app = fresh();
  let (status, inv) = send(
    &app,
    "POST",
    "/api/invitations",
    Some(json!({ "unit": "UF 61", "guest_name": "Ana", "national_id": "30.123.456" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let id = inv["id"].as_str().unwrap().to_string();

  let (_, d) =
    send(&app, "POST", "/api/validate", Some(json!({ "identifier": id }))).await;
  assert_eq!(d["decision"], "granted");
  assert_eq!(d["credential"]["entity"], "invitation");

  let (status, admission) = send(
    &app,
    "POST",
    "/api/admit",
    Some(json!({ "identifier": "30.123.456", "actor": "Carlos" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(admission["visit"]["details"]["unit"], "UF 61");

  let (_, again) =
    send(&app, "POST", "/api/validate", Some(json!({ "identifier": id }))).await;
  assert_eq!(again["reason"], "expired_or_used");

  let (_, active) = send(&app, "GET", "/api/invitations?active=true", None).await;
  assert_eq!(active.as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn inverted_invitation_window_is_bad_request() {
  let app = fresh();
  let (status, _) = send(
    &app,
    "POST",
    "/api/invitations",
    Some(json!({
      "unit": "UF 61",
      "guest_name": "Ana",
      "valid_from": "2030-01-02T10:00:00Z",
      "valid_to": "2030-01-01T10:00:00Z",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn denied_admit_without_override_records_nothing() {
  let app = fresh();
  let (status, admission) = send(
    &app,
    "POST",
    "/api/admit",
    Some(json!({ "identifier": "nobody" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert!(admission["visit"].is_null());

  let (status, _) = send(
    &app,
    "POST",
    "/api/admit",
    Some(json!({ "identifier": "nobody", "override_reason": "   " })),
  )
  .await;
  assert_eq!(status, StatusCode::BAD_REQUEST);

  let (_, logs) = send(&app, "GET", "/api/visits", None).await;
  assert!(logs.as_array().unwrap().is_empty());
}

// ── Visit ledger ─────────────────────────────────────────────────────────────

#[tokio::test]
async fn entry_and_exit_drive_occupancy() {
  let app = fresh();
  let (status, ev) =
    send(&app, "POST", "/api/visits", Some(visit("Juan", "UF 61"))).await;
  assert_eq!(status, StatusCode::CREATED);
  let id = ev["id"].as_str().unwrap().to_string();

  let (_, stats) = send(&app, "GET", "/api/stats", None).await;
  assert_eq!(stats["people_inside"], 1);
  assert_eq!(stats["visits_today"], 1);

  let (status, out) = send(
    &app,
    "POST",
    &format!("/api/visits/{id}/exit"),
    Some(json!({ "actor": "Miguel" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(out["outcome"], "closed");

  let (status, out) =
    send(&app, "POST", &format!("/api/visits/{id}/exit"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(out["outcome"], "already_closed");

  let (_, stats) = send(&app, "GET", "/api/stats", None).await;
  assert_eq!(stats["people_inside"], 0);

  let (status, _) = send(
    &app,
    "POST",
    &format!("/api/visits/{}/exit", Uuid::new_v4()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn visits_today_filters_by_query() {
  let app = fresh();
  send(
    &app,
    "POST",
    "/api/invitations",
    Some(json!({ "unit": "UF 3", "guest_name": "Lucia Gomez", "plate": "AB123CD" })),
  )
  .await;
  send(
    &app,
    "POST",
    "/api/invitations",
    Some(json!({ "unit": "UF 4", "guest_name": "Mario Ruiz" })),
  )
  .await;

  let (_, hits) = send(&app, "GET", "/api/visits/today?q=ab123", None).await;
  let hits = hits.as_array().unwrap();
  assert_eq!(hits.len(), 1);
  assert_eq!(hits[0]["name"], "Lucia Gomez");
}

// ── Emergencies ──────────────────────────────────────────────────────────────

#[tokio::test]
async fn emergency_lifecycle() {
  let app = fresh();
  let (status, e) = send(
    &app,
    "POST",
    "/api/emergencies",
    Some(json!({ "unit": "UF 24", "reporter": "Florencia", "kind": "MEDICAL" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(e["status"], "ACTIVE");
  let id = e["id"].as_str().unwrap().to_string();

  let (_, active) = send(&app, "GET", "/api/emergencies", None).await;
  assert_eq!(active.as_array().unwrap().len(), 1);

  let (status, _) =
    send(&app, "POST", &format!("/api/emergencies/{id}/resolve"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, active) = send(&app, "GET", "/api/emergencies", None).await;
  assert!(active.as_array().unwrap().is_empty());

  let (status, _) = send(
    &app,
    "POST",
    &format!("/api/emergencies/{}/resolve", Uuid::new_v4()),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

// ── Notifications ────────────────────────────────────────────────────────────

#[tokio::test]
async fn notifications_per_unit_and_read_all() {
  let app = fresh();
  send(&app, "POST", "/api/visits", Some(visit("Juan", "UF 61"))).await;
  let (status, pkg) = send(
    &app,
    "POST",
    "/api/packages",
    Some(json!({ "unit": "UF 62", "company": "Correo", "tracking": "X1" })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(pkg["kind"], "info");

  let (_, unread) = send(&app, "GET", "/api/notifications?unit=UF%2061", None).await;
  let unread = unread.as_array().unwrap();
  assert_eq!(unread.len(), 1);
  let id = unread[0]["id"].as_str().unwrap().to_string();

  let (status, _) =
    send(&app, "POST", &format!("/api/notifications/{id}/read"), None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (_, count) =
    send(&app, "GET", "/api/notifications/unread-count", None).await;
  assert_eq!(count["unread"], 1);

  let (_, res) = send(&app, "POST", "/api/notifications/read-all", None).await;
  assert_eq!(res["updated"], 1);

  let (_, all) = send(&app, "GET", "/api/notifications", None).await;
  assert_eq!(all.as_array().unwrap().len(), 2);
}

// ── Workers ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn worker_needs_approval_and_authorization() {
  let app = fresh();
  let (status, w) = send(
    &app,
    "POST",
    "/api/workers",
    Some(json!({
      "first_name": "Pedro",
      "last_name": "Pintor",
      "national_id": "20.444.444",
      "role": "painter",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(w["status"], "pending");
  let id = w["id"].as_str().unwrap().to_string();

  let (_, d) = send(
    &app,
    "POST",
    "/api/validate",
    Some(json!({ "identifier": "20.444.444" })),
  )
  .await;
  assert_eq!(d["reason"], "not_approved");

  let (status, _) = send(
    &app,
    "POST",
    &format!("/api/workers/{}/status", Uuid::new_v4()),
    Some(json!({ "status": "approved" })),
  )
  .await;
  assert_eq!(status, StatusCode::NOT_FOUND);

  let (status, _) = send(
    &app,
    "POST",
    &format!("/api/workers/{id}/status"),
    Some(json!({ "status": "approved" })),
  )
  .await;
  assert_eq!(status, StatusCode::OK);

  let (status, auth) = send(
    &app,
    "POST",
    "/api/authorizations",
    Some(json!({
      "worker_id": id,
      "unit": "UF 15",
      "mode": "date_range",
      "start_date": "2000-01-01",
      "end_date": "2100-01-01",
    })),
  )
  .await;
  assert_eq!(status, StatusCode::CREATED);
  let auth_id = auth["id"].as_str().unwrap().to_string();

  let (_, d) = send(
    &app,
    "POST",
    "/api/validate",
    Some(json!({ "identifier": "20.444.444" })),
  )
  .await;
  assert_eq!(d["decision"], "granted");

  let (status, revoked) = send(
    &app,
    "POST",
    &format!("/api/authorizations/{auth_id}/revoke"),
    None,
  )
  .await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(revoked["status"], "revoked");
}

#[tokio::test]
async fn catalogs_start_empty() {
  let app = fresh();
  let (status, units) = send(&app, "GET", "/api/units", None).await;
  assert_eq!(status, StatusCode::OK);
  assert!(units.as_array().unwrap().is_empty());
  let (_, dir) = send(&app, "GET", "/api/directory", None).await;
  assert!(dir.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn demo_seed_populates_catalogs() {
  let seed = load_seed(concat!(env!("CARGO_MANIFEST_DIR"), "/seed.json"))
    .await
    .unwrap();
  let app = app(Arc::new(MemoryStore::from_bootstrap(
    AccessPolicy::default(),
    seed,
  )));

  let (_, units) = send(&app, "GET", "/api/units", None).await;
  assert_eq!(units.as_array().unwrap().len(), 3);

  let (_, dir) = send(&app, "GET", "/api/directory", None).await;
  let dir = dir.as_array().unwrap();
  assert_eq!(dir.len(), 2);
  assert_eq!(dir[0]["unit"], "UF 61");

  let (_, workers) = send(&app, "GET", "/api/workers", None).await;
  assert_eq!(workers[0]["status"], "approved");
}
