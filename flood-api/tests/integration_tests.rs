//! Integration tests for the Flood Watch API
//!
//! Exercise the router end to end over an in-memory store, with bearer
//! tokens minted by the same JWT config the server verifies with.

use axum::http::StatusCode;
use axum_test::TestServer;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flood_api::{create_router, issue_token, AppState, AuthClaims, JwtConfig};
use flood_core::ledger::{UserDirectory, WardRegistry};
use flood_core::{Role, UserId, UserRecord, WardId, WardRecord};
use flood_db::{FloodStore, MemoryMailer};
use serde_json::{json, Value};
use std::sync::Arc;

const SECRET: &str = "integration-test-secret-0123456789abcdef";

struct TestApp {
    server: TestServer,
    mailer: Arc<MemoryMailer>,
    resident: String,
    neighbour: String,
    authority: String,
}

fn token(jwt: &JwtConfig, sub: &str, role: Role) -> String {
    issue_token(&AuthClaims::new(sub, &[role], 3600), jwt).unwrap()
}

async fn create_test_app() -> TestApp {
    let store = Arc::new(FloodStore::in_memory().await.unwrap());
    let mailer = Arc::new(MemoryMailer::new());
    let jwt = JwtConfig::try_new(SECRET).unwrap();

    store
        .upsert_user(
            UserRecord::new(UserId::new("resident-1"), "amina", Role::Resident)
                .with_email("amina@example.com")
                .subscribe(WardId(1)),
        )
        .await
        .unwrap();
    store
        .upsert_user(UserRecord::new(UserId::new("resident-2"), "otieno", Role::Resident))
        .await
        .unwrap();
    store
        .upsert_user(
            UserRecord::new(UserId::new("officer-1"), "officer", Role::Authority)
                .with_email("officer@example.com"),
        )
        .await
        .unwrap();
    store
        .upsert_ward(WardRecord::new(
            WardId(1),
            "Westlands",
            json!({
                "type": "Polygon",
                "coordinates": [[[36.79, -1.29], [36.83, -1.29], [36.83, -1.26], [36.79, -1.26], [36.79, -1.29]]]
            }),
        ))
        .await
        .unwrap();
    store
        .upsert_ward(WardRecord::new(WardId(2), "Kibera", json!({ "type": "Polygon" })))
        .await
        .unwrap();

    let state = AppState::with_store(store, mailer.clone(), "http://localhost:8000", jwt.clone());

    TestApp {
        server: TestServer::new(create_router(state)).unwrap(),
        mailer,
        resident: token(&jwt, "resident-1", Role::Resident),
        neighbour: token(&jwt, "resident-2", Role::Resident),
        authority: token(&jwt, "officer-1", Role::Authority),
    }
}

fn report_body() -> Value {
    json!({
        "location": "Waiyaki Way near Sarit",
        "latitude": -1.28,
        "longitude": 36.81,
        "description": "Road completely flooded, cars stalling"
    })
}

// ============ Health Endpoint Tests ============

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app().await;

    let response = app.server.get("/health").await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["mailer"], "memory");
    assert_eq!(body["risk_policy"], "manual");
}

#[tokio::test]
async fn test_liveness_and_readiness() {
    let app = create_test_app().await;

    app.server.get("/health/live").await.assert_status_ok();
    app.server.get("/health/ready").await.assert_status_ok();
}

#[tokio::test]
async fn test_metrics_disabled_without_recorder() {
    let app = create_test_app().await;

    let response = app.server.get("/metrics").await;
    response.assert_status(StatusCode::NOT_FOUND);
}

// ============ Auth Tests ============

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let app = create_test_app().await;

    let response = app.server.get("/api/ward-data/").await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body: Value = response.json();
    assert_eq!(body["code"], "MISSING_TOKEN");
}

#[tokio::test]
async fn test_foreign_token_is_unauthorized() {
    let app = create_test_app().await;
    let other = JwtConfig::try_new("another-secret-another-secret-0000").unwrap();

    let response = app
        .server
        .get("/api/dashboard")
        .authorization_bearer(token(&other, "resident-1", Role::Resident))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_resident_cannot_review() {
    let app = create_test_app().await;

    let created: Value = app
        .server
        .post("/api/reports")
        .authorization_bearer(&app.resident)
        .json(&report_body())
        .await
        .json();

    let response = app
        .server
        .post(&format!("/api/reports/{}/review", created["report_id"]))
        .authorization_bearer(&app.resident)
        .json(&json!({ "decision": "validate" }))
        .await;

    response.assert_status(StatusCode::FORBIDDEN);
    let body: Value = response.json();
    assert_eq!(body["code"], "FORBIDDEN");
}

// ============ Report Lifecycle Tests ============

#[tokio::test]
async fn test_submit_and_validate_flow() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/reports")
        .authorization_bearer(&app.resident)
        .json(&report_body())
        .await;
    response.assert_status(StatusCode::CREATED);
    let report: Value = response.json();
    assert_eq!(report["status"], "Pending");
    assert_eq!(report["ward_id"], 1);
    let report_id = report["report_id"].as_u64().unwrap();

    let pending: Value = app
        .server
        .get("/api/reports")
        .add_query_param("status", "pending")
        .authorization_bearer(&app.authority)
        .await
        .json();
    assert_eq!(pending["count"], 1);

    let response = app
        .server
        .post(&format!("/api/reports/{}/review", report_id))
        .authorization_bearer(&app.authority)
        .json(&json!({ "decision": "validate", "notes": "Confirmed by field team" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["report"]["status"], "Validated");
    assert_eq!(body["action"]["admin_id"], "officer-1");

    let subjects: Vec<String> = app
        .mailer
        .sent_to("amina@example.com")
        .await
        .into_iter()
        .map(|m| m.subject)
        .collect();
    assert!(subjects.contains(&format!("Flood Report #{} Has Been Validated", report_id)));
}

#[tokio::test]
async fn test_second_review_conflicts() {
    let app = create_test_app().await;
    let report: Value = app
        .server
        .post("/api/reports")
        .authorization_bearer(&app.resident)
        .json(&report_body())
        .await
        .json();
    let path = format!("/api/reports/{}/review", report["report_id"]);

    app.server
        .post(&path)
        .authorization_bearer(&app.authority)
        .json(&json!({ "decision": "reject", "notes": "Duplicate report" }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .post(&path)
        .authorization_bearer(&app.authority)
        .json(&json!({ "decision": "validate" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body: Value = response.json();
    assert_eq!(body["code"], "INVALID_STATE");
}

#[tokio::test]
async fn test_missing_coordinates_rejected() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/reports")
        .authorization_bearer(&app.resident)
        .json(&json!({
            "location": "Kibera",
            "description": "Water in the houses"
        }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body: Value = response.json();
    assert_eq!(body["message"], "Location data is required. Please allow geolocation.");

    let counts: Value = app
        .server
        .get("/api/dashboard")
        .authorization_bearer(&app.authority)
        .await
        .json();
    assert_eq!(counts["reports"]["total"], 0);
}

#[tokio::test]
async fn test_non_image_photo_rejected() {
    let app = create_test_app().await;
    let mut body = report_body();
    body["photo"] = json!({
        "file_name": "notes.txt",
        "content_type": "text/plain",
        "data": STANDARD.encode(b"hello")
    });

    let response = app
        .server
        .post("/api/reports")
        .authorization_bearer(&app.resident)
        .json(&body)
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_photo_metadata_recorded() {
    let app = create_test_app().await;
    let mut body = report_body();
    body["photo"] = json!({
        "file_name": "street.jpg",
        "content_type": "image/jpeg",
        "data": STANDARD.encode(vec![0xFFu8; 2048])
    });

    let response = app
        .server
        .post("/api/reports")
        .authorization_bearer(&app.resident)
        .json(&body)
        .await;

    response.assert_status(StatusCode::CREATED);
    let report: Value = response.json();
    assert_eq!(report["photo"]["size_bytes"], 2048);
    assert_eq!(report["photo"]["content_type"], "image/jpeg");
}

#[tokio::test]
async fn test_report_visible_to_owner_only() {
    let app = create_test_app().await;
    let report: Value = app
        .server
        .post("/api/reports")
        .authorization_bearer(&app.resident)
        .json(&report_body())
        .await
        .json();
    let path = format!("/api/reports/{}", report["report_id"]);

    app.server
        .get(&path)
        .authorization_bearer(&app.resident)
        .await
        .assert_status_ok();
    app.server
        .get(&path)
        .authorization_bearer(&app.authority)
        .await
        .assert_status_ok();
    app.server
        .get(&path)
        .authorization_bearer(&app.neighbour)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_resident_cannot_list_reports() {
    let app = create_test_app().await;

    app.server
        .get("/api/reports")
        .authorization_bearer(&app.resident)
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_vote_counts() {
    let app = create_test_app().await;
    let report: Value = app
        .server
        .post("/api/reports")
        .authorization_bearer(&app.resident)
        .json(&report_body())
        .await
        .json();
    let path = format!("/api/reports/{}/vote", report["report_id"]);

    for _ in 0..3 {
        app.server
            .post(&path)
            .authorization_bearer(&app.authority)
            .json(&json!({ "vote": "up" }))
            .await
            .assert_status_ok();
    }

    let response = app
        .server
        .post(&path)
        .authorization_bearer(&app.resident)
        .json(&json!({ "vote": "down" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["upvotes"], 1);
    assert_eq!(body["downvotes"], 1);
    assert_eq!(body["vote"], "down");
    assert!(body.get("description").is_none());
}

#[tokio::test]
async fn test_vote_requires_report_visibility() {
    let app = create_test_app().await;
    let report: Value = app
        .server
        .post("/api/reports")
        .authorization_bearer(&app.resident)
        .json(&report_body())
        .await
        .json();

    app.server
        .get(&format!("/api/reports/{}", report["report_id"]))
        .authorization_bearer(&app.neighbour)
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .post(&format!("/api/reports/{}/vote", report["report_id"]))
        .authorization_bearer(&app.neighbour)
        .json(&json!({ "vote": "up" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
    app.server
        .post("/api/reports/999/vote")
        .authorization_bearer(&app.authority)
        .json(&json!({ "vote": "up" }))
        .await
        .assert_status(StatusCode::NOT_FOUND);

    let detail: Value = app
        .server
        .get(&format!("/api/reports/{}", report["report_id"]))
        .authorization_bearer(&app.resident)
        .await
        .json();
    assert_eq!(detail["upvotes"], 0);
}

// ============ Map and Risk Tests ============

#[tokio::test]
async fn test_ward_data_geojson() {
    let app = create_test_app().await;

    let response = app
        .server
        .get("/api/ward-data/")
        .authorization_bearer(&app.resident)
        .await;

    response.assert_status_ok();
    assert_eq!(response.header("cache-control"), "public, max-age=300");

    let body: Value = response.json();
    assert_eq!(body["type"], "FeatureCollection");
    let features = body["features"].as_array().unwrap();
    assert_eq!(features.len(), 2);
    assert_eq!(features[0]["properties"]["name"], "Westlands");
    assert_eq!(features[0]["geometry"]["type"], "Polygon");
    // Kibera's stored boundary has no coordinates
    assert!(features[1]["geometry"].is_null());
}

#[tokio::test]
async fn test_escalation_to_high() {
    let app = create_test_app().await;

    let response = app
        .server
        .put("/api/wards/1/risk")
        .authorization_bearer(&app.authority)
        .json(&json!({ "risk_level": "High" }))
        .await;
    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["previous"], "Low");
    assert_eq!(body["escalated"], true);

    let risk: Value = app
        .server
        .get("/api/wards/1/risk")
        .authorization_bearer(&app.resident)
        .await
        .json();
    assert_eq!(risk["risk_level"], "High");

    let dashboard: Value = app
        .server
        .get("/api/dashboard")
        .authorization_bearer(&app.resident)
        .await
        .json();
    assert_eq!(dashboard["high_risk_wards"], 1);
    assert_eq!(dashboard["recent_alerts"].as_array().unwrap().len(), 1);

    // Subscriber of ward 1 is told
    assert!(!app.mailer.sent_to("amina@example.com").await.is_empty());
}

#[tokio::test]
async fn test_resident_cannot_set_risk() {
    let app = create_test_app().await;

    app.server
        .put("/api/wards/1/risk")
        .authorization_bearer(&app.resident)
        .json(&json!({ "risk_level": "High" }))
        .await
        .assert_status(StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_unknown_ward_risk_not_found() {
    let app = create_test_app().await;

    app.server
        .get("/api/wards/99/risk")
        .authorization_bearer(&app.resident)
        .await
        .assert_status_not_found();
}

#[tokio::test]
async fn test_historical_data_floors_high_wards() {
    let app = create_test_app().await;
    app.server
        .put("/api/wards/1/risk")
        .authorization_bearer(&app.authority)
        .json(&json!({ "risk_level": "High" }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .get("/api/historical-flood-data/")
        .authorization_bearer(&app.resident)
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["1"]["ward_name"], "Westlands");
    assert_eq!(body["1"]["probability"], 70.0);
    assert_eq!(body["2"]["probability"], 0.0);
}

// ============ Alert Tests ============

#[tokio::test]
async fn test_send_alert_broadcasts() {
    let app = create_test_app().await;

    let response = app
        .server
        .post("/api/alerts")
        .authorization_bearer(&app.authority)
        .json(&json!({ "ward_id": 1 }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    let sent = &body["alerts"][0];
    assert_eq!(sent["alert"]["risk_level"], "High");
    assert_eq!(
        sent["alert"]["message"],
        "Flood alert: High risk reported in Westlands"
    );
    // resident-2 has no email address
    assert_eq!(sent["delivery"]["sent"], 2);
    assert_eq!(sent["delivery"]["skipped"], 1);
}

#[tokio::test]
async fn test_send_alert_by_risk_level() {
    let app = create_test_app().await;

    let none: Value = app
        .server
        .post("/api/alerts")
        .authorization_bearer(&app.authority)
        .json(&json!({ "risk_level": "High" }))
        .await
        .json();
    assert_eq!(none["count"], 0);

    app.server
        .put("/api/wards/2/risk")
        .authorization_bearer(&app.authority)
        .json(&json!({ "risk_level": "Medium" }))
        .await
        .assert_status_ok();

    let response = app
        .server
        .post("/api/alerts")
        .authorization_bearer(&app.authority)
        .json(&json!({ "risk_level": "Medium" }))
        .await;

    response.assert_status(StatusCode::CREATED);
    let body: Value = response.json();
    assert_eq!(body["count"], 1);
    assert_eq!(body["alerts"][0]["alert"]["ward_id"], 2);
    assert_eq!(
        body["alerts"][0]["alert"]["message"],
        "Flood risk is currently Medium in Kibera. Please take necessary precautions."
    );
}

#[tokio::test]
async fn test_daily_summary() {
    let app = create_test_app().await;
    app.server
        .post("/api/reports")
        .authorization_bearer(&app.resident)
        .json(&report_body())
        .await
        .assert_status(StatusCode::CREATED);

    let response = app
        .server
        .post("/api/alerts/daily-summary")
        .authorization_bearer(&app.authority)
        .json(&json!({ "date": "2026-10-16" }))
        .await;

    response.assert_status_ok();
    let body: Value = response.json();
    assert_eq!(body["pending_reports"], 1);
    assert_eq!(body["low_risk_wards"], 2);

    let digest = app.mailer.sent_to("officer@example.com").await;
    assert!(digest
        .iter()
        .any(|m| m.subject == "Daily Flood Summary - October 16, 2026"));
}
