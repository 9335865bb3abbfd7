//! Integration tests for the JSON API.
//!
//! Each test drives the full router over a fresh file store in a temporary
//! directory.

#![allow(clippy::unwrap_used)]

use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use serde_json::json;

use rjukan_stays_integration_tests::{TEST_ADMIN_EMAIL, TestApp};

// =============================================================================
// Booking Submission
// =============================================================================

#[tokio::test]
async fn test_create_booking_is_pending_and_ignores_supplied_status() {
    let app = TestApp::new().await;

    let response = app
        .json(
            "POST",
            "/api/bookings",
            &json!({
                "guest_name": "Kari Nordmann",
                "guest_email": "Kari@Example.no",
                "check_in": "2024-06-10",
                "check_out": "2024-06-15",
                "guests": 2,
                "status": "approved",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::CREATED);
    let booking = response.json();
    assert_eq!(booking["id"], 1);
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["guest_email"], "kari@example.no");
    assert_eq!(booking["guest_phone"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_create_booking_validation_errors() {
    let app = TestApp::new().await;

    let cases = [
        json!({"guest_email": "kari@example.no", "check_in": "2024-06-10", "check_out": "2024-06-15", "guests": 2}),
        json!({"guest_name": "Kari", "guest_email": "not-an-email", "check_in": "2024-06-10", "check_out": "2024-06-15", "guests": 2}),
        json!({"guest_name": "Kari", "guest_email": "kari@example.no", "check_in": "2024-06-15", "check_out": "2024-06-10", "guests": 2}),
        json!({"guest_name": "Kari", "guest_email": "kari@example.no", "check_in": "2024-06-10", "check_out": "2024-06-15", "guests": 0}),
    ];

    for body in cases {
        let response = app.json("POST", "/api/bookings", &body).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{body}");
        assert!(response.json()["error"].is_string());
    }

    assert_eq!(app.get("/api/bookings").await.json(), json!([]));
}

#[tokio::test]
async fn test_overlapping_request_is_rejected_after_approval() {
    let app = TestApp::new().await;
    let first = app.create_booking("Kari", "2024-06-10", "2024-06-15").await;

    let response = app
        .json(
            "PATCH",
            &format!("/api/bookings/{}", first["id"]),
            &json!({"status": "approved"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let overlapping = app
        .json(
            "POST",
            "/api/bookings",
            &json!({
                "guest_name": "Ola",
                "guest_email": "ola@example.no",
                "check_in": "2024-06-14",
                "check_out": "2024-06-20",
                "guests": 1,
            }),
        )
        .await;
    assert_eq!(overlapping.status, StatusCode::CONFLICT);
    assert!(
        overlapping.json()["error"]
            .as_str()
            .unwrap()
            .contains("not available")
    );

    // Arriving on the departure day is fine.
    let turnover = app.create_booking("Ola", "2024-06-15", "2024-06-18").await;
    assert_eq!(turnover["status"], "pending");
}

#[tokio::test]
async fn test_blocked_period_rejects_requests() {
    let app = TestApp::new().await;

    let response = app
        .json(
            "POST",
            "/api/blocked-dates",
            &json!({"start_date": "2024-07-01", "end_date": "2024-07-10", "reason": "Maintenance"}),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let inside = app
        .json(
            "POST",
            "/api/bookings",
            &json!({
                "guest_name": "Kari",
                "guest_email": "kari@example.no",
                "check_in": "2024-07-05",
                "check_out": "2024-07-08",
                "guests": 2,
            }),
        )
        .await;
    assert_eq!(inside.status, StatusCode::CONFLICT);
}

// =============================================================================
// Status Updates
// =============================================================================

#[tokio::test]
async fn test_approve_then_deny() {
    let app = TestApp::new().await;
    let booking = app.create_booking("Kari", "2024-06-10", "2024-06-15").await;
    let uri = format!("/api/bookings/{}", booking["id"]);

    let approved = app.json("PATCH", &uri, &json!({"status": "approved"})).await;
    assert_eq!(approved.json()["status"], "approved");

    let denied = app.json("PATCH", &uri, &json!({"status": "denied"})).await;
    assert_eq!(denied.status, StatusCode::OK);
    assert_eq!(denied.json()["status"], "denied");

    assert_eq!(app.get(&uri).await.json()["status"], "denied");
}

#[tokio::test]
async fn test_status_update_errors() {
    let app = TestApp::new().await;
    let booking = app.create_booking("Kari", "2024-06-10", "2024-06-15").await;
    let uri = format!("/api/bookings/{}", booking["id"]);

    let pending = app.json("PATCH", &uri, &json!({"status": "pending"})).await;
    assert_eq!(pending.status, StatusCode::BAD_REQUEST);

    let unknown = app.json("PATCH", &uri, &json!({"status": "cancelled"})).await;
    assert_eq!(unknown.status, StatusCode::BAD_REQUEST);

    let missing = app
        .json("PATCH", "/api/bookings/99", &json!({"status": "approved"}))
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_malformed_requests_use_the_json_error_shape() {
    let app = TestApp::new().await;

    let bad_id = app.get("/api/bookings/abc").await;
    assert_eq!(bad_id.status, StatusCode::BAD_REQUEST);
    assert!(bad_id.json()["error"].is_string(), "{}", bad_id.body);

    let bad_delete = app.delete("/api/blocked-dates/first").await;
    assert_eq!(bad_delete.status, StatusCode::BAD_REQUEST);
    assert!(bad_delete.json()["error"].is_string());

    let syntax = app
        .send(
            Request::post("/api/bookings")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{\"guest_name\": "))
                .unwrap(),
        )
        .await;
    assert_eq!(syntax.status, StatusCode::BAD_REQUEST);
    assert!(syntax.json()["error"].is_string(), "{}", syntax.body);

    let no_content_type = app
        .send(
            Request::post("/api/bookings")
                .body(Body::from("{}"))
                .unwrap(),
        )
        .await;
    assert_eq!(no_content_type.status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(no_content_type.json()["error"].is_string());

    let wrong_type = app
        .json("POST", "/api/bookings", &json!({"guests": "two"}))
        .await;
    assert_eq!(wrong_type.status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(wrong_type.json()["error"].is_string());
}

#[tokio::test]
async fn test_conflicting_approval_is_refused() {
    let app = TestApp::new().await;
    let a = app.create_booking("Kari", "2024-06-10", "2024-06-15").await;
    let b = app.create_booking("Ola", "2024-06-12", "2024-06-18").await;

    let first = app
        .json("PATCH", &format!("/api/bookings/{}", a["id"]), &json!({"status": "approved"}))
        .await;
    assert_eq!(first.status, StatusCode::OK);

    let second = app
        .json("PATCH", &format!("/api/bookings/{}", b["id"]), &json!({"status": "approved"}))
        .await;
    assert_eq!(second.status, StatusCode::CONFLICT);

    let approved = app.get("/api/bookings?status=approved").await.json();
    assert_eq!(approved.as_array().unwrap().len(), 1);
}

// =============================================================================
// Listing and Deletion
// =============================================================================

#[tokio::test]
async fn test_ids_are_not_reused_after_delete() {
    let app = TestApp::new().await;
    for name in ["A", "B", "C"] {
        app.create_booking(name, "2024-06-10", "2024-06-15").await;
    }

    let deleted = app.delete("/api/bookings/2").await;
    assert_eq!(deleted.status, StatusCode::OK);
    assert_eq!(deleted.json(), json!({"success": true}));

    let next = app.create_booking("D", "2024-07-01", "2024-07-03").await;
    assert_eq!(next["id"], 4);
    assert_eq!(app.get("/api/bookings/2").await.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_absent_records_reports_success() {
    let app = TestApp::new().await;
    assert_eq!(
        app.delete("/api/bookings/42").await.json(),
        json!({"success": true})
    );
    assert_eq!(
        app.delete("/api/blocked-dates/42").await.json(),
        json!({"success": true})
    );
}

#[tokio::test]
async fn test_list_filters_and_orders() {
    let app = TestApp::new().await;
    let august = app.create_booking("A", "2024-08-01", "2024-08-05").await;
    let june = app.create_booking("B", "2024-06-01", "2024-06-05").await;
    app.create_booking("C", "2024-07-01", "2024-07-05").await;

    for booking in [&august, &june] {
        app.json(
            "PATCH",
            &format!("/api/bookings/{}", booking["id"]),
            &json!({"status": "approved"}),
        )
        .await;
    }

    let ids = |body: serde_json::Value| -> Vec<i64> {
        body.as_array()
            .unwrap()
            .iter()
            .map(|b| b["id"].as_i64().unwrap())
            .collect()
    };

    assert_eq!(ids(app.get("/api/bookings").await.json()), vec![3, 2, 1]);
    assert_eq!(ids(app.get("/api/bookings?status=approved").await.json()), vec![2, 1]);
    assert_eq!(ids(app.get("/api/bookings?status=pending").await.json()), vec![3]);
    assert_eq!(ids(app.get("/api/bookings?status=denied").await.json()), Vec::<i64>::new());
    assert_eq!(
        app.get("/api/bookings?status=maybe").await.status,
        StatusCode::BAD_REQUEST
    );
}

#[tokio::test]
async fn test_unavailable_dates_lists_approved_and_blocked() {
    let app = TestApp::new().await;
    let booking = app.create_booking("Kari", "2024-06-10", "2024-06-15").await;
    app.create_booking("Ola", "2024-06-20", "2024-06-22").await;
    app.json(
        "PATCH",
        &format!("/api/bookings/{}", booking["id"]),
        &json!({"status": "approved"}),
    )
    .await;
    app.json(
        "POST",
        "/api/blocked-dates",
        &json!({"start_date": "2024-07-01", "end_date": "2024-07-10"}),
    )
    .await;

    assert_eq!(
        app.get("/api/unavailable-dates").await.json(),
        json!([
            {"start": "2024-06-10", "end": "2024-06-15"},
            {"start": "2024-07-01", "end": "2024-07-10"},
        ])
    );
}

// =============================================================================
// Blocked Dates and Settings
// =============================================================================

#[tokio::test]
async fn test_blocked_dates_crud() {
    let app = TestApp::new().await;

    let invalid = app
        .json(
            "POST",
            "/api/blocked-dates",
            &json!({"start_date": "2024-07-10", "end_date": "2024-07-01"}),
        )
        .await;
    assert_eq!(invalid.status, StatusCode::BAD_REQUEST);

    let created = app
        .json(
            "POST",
            "/api/blocked-dates",
            &json!({"start_date": "2024-12-20", "end_date": "2025-01-02", "reason": "Owner stay"}),
        )
        .await
        .json();
    assert_eq!(created["id"], 1);
    assert_eq!(created["reason"], "Owner stay");

    assert_eq!(app.get("/api/blocked-dates").await.json().as_array().unwrap().len(), 1);
    app.delete("/api/blocked-dates/1").await;
    assert_eq!(app.get("/api/blocked-dates").await.json(), json!([]));
}

#[tokio::test]
async fn test_settings_round_trip() {
    let app = TestApp::new().await;

    assert_eq!(
        app.get("/api/settings/admin_email").await.json(),
        json!({"key": "admin_email", "value": TEST_ADMIN_EMAIL})
    );
    assert_eq!(
        app.get("/api/settings/season").await.json(),
        json!({"key": "season", "value": null})
    );

    let updated = app
        .json("PUT", "/api/settings/season", &json!({"value": "winter"}))
        .await;
    assert_eq!(updated.json(), json!({"key": "season", "value": "winter"}));
    assert_eq!(
        app.store.get_setting("season").await.unwrap().as_deref(),
        Some("winter")
    );
}

#[tokio::test]
async fn test_health_endpoints() {
    let app = TestApp::new().await;
    assert_eq!(app.get("/health").await.body, "ok");
    assert_eq!(app.get("/health/ready").await.status, StatusCode::OK);
}
