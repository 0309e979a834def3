use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use chrono::{NaiveDate, NaiveDateTime};
use jsonwebtoken::{encode, EncodingKey, Header};
use roost_api::auth::Claims;
use roost_api::{app, AppState, AuthConfig};
use roost_availability::RefreshEvent;
use roost_booking::{BookingManager, LifecyclePolicy, MemoryLedger};
use roost_core::identity::MemoryEmployeeDirectory;
use roost_core::FixedClock;
use roost_inventory::MemorySeatStore;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower::ServiceExt;
use uuid::Uuid;

const TEST_SECRET: &str = "test-secret";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn morning() -> NaiveDateTime {
    date(2024, 6, 10).and_hms_opt(9, 0, 0).unwrap()
}

fn test_state(now: NaiveDateTime) -> (AppState, broadcast::Receiver<RefreshEvent>) {
    let ledger = Arc::new(MemoryLedger::new());
    let clock = Arc::new(FixedClock(now));
    let manager = Arc::new(BookingManager::new(
        ledger,
        LifecyclePolicy::default(),
        0,
        clock.clone(),
    ));
    let (refresh_tx, refresh_rx) = broadcast::channel(16);

    let state = AppState {
        seats: Arc::new(MemorySeatStore::new()),
        employees: Arc::new(MemoryEmployeeDirectory::new()),
        manager,
        clock,
        refresh_tx,
        auth: AuthConfig {
            secret: TEST_SECRET.to_string(),
        },
    };
    (state, refresh_rx)
}

fn token(employee_id: Uuid, role: &str) -> String {
    let claims = Claims {
        sub: employee_id.to_string(),
        role: role.to_string(),
        exp: 4_102_444_800, // far future; the tests pin "now" elsewhere
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(TEST_SECRET.as_bytes()),
    )
    .unwrap()
}

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header("authorization", format!("Bearer {bearer}"));
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

#[tokio::test]
async fn requests_without_a_token_are_rejected() {
    let (state, _rx) = test_state(morning());
    let app = app(state);

    let (status, _) = send(&app, "GET", "/v1/seats", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn admin_surface_requires_the_admin_role() {
    let (state, _rx) = test_state(morning());
    let app = app(state);
    let employee = token(Uuid::new_v4(), "employee");

    let (status, body) = send(&app, "GET", "/v1/admin/seats", Some(&employee), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "Administrator role required");
}

#[tokio::test]
async fn booking_flow_end_to_end() {
    let (state, _rx) = test_state(morning());
    let app = app(state);
    let admin = token(Uuid::new_v4(), "admin");
    let e1 = Uuid::new_v4();
    let e2 = Uuid::new_v4();
    let t1 = token(e1, "employee");
    let t2 = token(e2, "employee");

    // Admin provisions three seats.
    let mut seat_ids = Vec::new();
    for number in ["A-1", "A-2", "A-3"] {
        let (status, body) = send(
            &app,
            "POST",
            "/v1/admin/seats",
            Some(&admin),
            Some(json!({ "seat_number": number })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        seat_ids.push(body["id"].as_str().unwrap().to_string());
    }

    // E1 books A-1 for today.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(&t1),
        Some(json!({ "seat_id": seat_ids[0], "booking_date": "2024-06-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "confirmed");
    let booking_id = body["booking_id"].as_str().unwrap().to_string();

    // E2 collides on the same seat: the seat-specific conflict message.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(&t2),
        Some(json!({ "seat_id": seat_ids[0], "booking_date": "2024-06-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Seat already booked for this date");

    // E1 cannot take a second seat the same day: the employee-specific
    // conflict message.
    let (status, body) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(&t1),
        Some(json!({ "seat_id": seat_ids[2], "booking_date": "2024-06-10" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "You already have a booking for this date");

    // Availability from E1's perspective: mine / available / available.
    let (status, body) = send(
        &app,
        "GET",
        "/v1/seats/availability?date=2024-06-10",
        Some(&t1),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let statuses: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v["status"].as_str().unwrap())
        .collect();
    assert_eq!(statuses, vec!["mine", "available", "available"]);

    // From E2's perspective the same seat is opaquely booked.
    let (_, body) = send(
        &app,
        "GET",
        "/v1/seats/availability?date=2024-06-10",
        Some(&t2),
        None,
    )
    .await;
    assert_eq!(body[0]["status"], "booked");
    assert!(body[0].get("employee_id").is_none());

    // Check-in on the booking's own date.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/bookings/{booking_id}/check-in"),
        Some(&t1),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "checked_in");
    assert!(body["check_in_time"].is_string());

    // Checked-in bookings are terminal for cancellation.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/bookings/{booking_id}/cancel"),
        Some(&t1),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "This booking can no longer be cancelled");

    // The booking list reflects everything, seat number included.
    let (status, body) = send(&app, "GET", "/v1/bookings/me", Some(&t1), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["seat_number"], "A-1");
    assert_eq!(body["items"][0]["status"], "checked_in");
}

#[tokio::test]
async fn cancelling_someone_elses_booking_reads_as_missing() {
    let (state, _rx) = test_state(morning());
    let app = app(state);
    let admin = token(Uuid::new_v4(), "admin");
    let owner = token(Uuid::new_v4(), "employee");
    let stranger = token(Uuid::new_v4(), "employee");

    let (_, seat) = send(
        &app,
        "POST",
        "/v1/admin/seats",
        Some(&admin),
        Some(json!({ "seat_number": "A-1" })),
    )
    .await;
    let (_, booking) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(&owner),
        Some(json!({ "seat_id": seat["id"], "booking_date": "2024-06-11" })),
    )
    .await;
    let booking_id = booking["booking_id"].as_str().unwrap();

    let (status, _) = send(
        &app,
        "POST",
        &format!("/v1/bookings/{booking_id}/cancel"),
        Some(&stranger),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The owner can still cancel a future booking at any time of day.
    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/bookings/{booking_id}/cancel"),
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    // And the seat is available again for that date.
    let (_, body) = send(
        &app,
        "GET",
        "/v1/seats/availability?date=2024-06-11",
        Some(&owner),
        None,
    )
    .await;
    assert_eq!(body[0]["status"], "available");
}

#[tokio::test]
async fn same_day_cancellation_closes_at_the_cutoff() {
    let late = date(2024, 6, 10).and_hms_opt(10, 30, 0).unwrap();
    let (state, _rx) = test_state(late);
    let app = app(state);
    let admin = token(Uuid::new_v4(), "admin");
    let employee = token(Uuid::new_v4(), "employee");

    let (_, seat) = send(
        &app,
        "POST",
        "/v1/admin/seats",
        Some(&admin),
        Some(json!({ "seat_number": "A-1" })),
    )
    .await;
    let (_, booking) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(&employee),
        Some(json!({ "seat_id": seat["id"], "booking_date": "2024-06-10" })),
    )
    .await;
    let booking_id = booking["booking_id"].as_str().unwrap();

    let (status, body) = send(
        &app,
        "POST",
        &format!("/v1/bookings/{booking_id}/cancel"),
        Some(&employee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["detail"], "This booking can no longer be cancelled");
}

#[tokio::test]
async fn bookings_outside_the_horizon_are_rejected() {
    let (state, _rx) = test_state(morning());
    let app = app(state);
    let admin = token(Uuid::new_v4(), "admin");
    let employee = token(Uuid::new_v4(), "employee");

    let (_, seat) = send(
        &app,
        "POST",
        "/v1/admin/seats",
        Some(&admin),
        Some(json!({ "seat_number": "A-1" })),
    )
    .await;

    for bad_date in ["2024-06-09", "2024-07-01"] {
        let (status, _) = send(
            &app,
            "POST",
            "/v1/bookings",
            Some(&employee),
            Some(json!({ "seat_id": seat["id"], "booking_date": bad_date })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "date {bad_date}");
    }
}

#[tokio::test]
async fn every_successful_mutation_emits_one_refresh_event() {
    let (state, mut rx) = test_state(morning());
    let app = app(state);
    let admin = token(Uuid::new_v4(), "admin");
    let employee_id = Uuid::new_v4();
    let employee = token(employee_id, "employee");

    let (_, seat) = send(
        &app,
        "POST",
        "/v1/admin/seats",
        Some(&admin),
        Some(json!({ "seat_number": "A-1" })),
    )
    .await;

    let (_, booking) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(&employee),
        Some(json!({ "seat_id": seat["id"], "booking_date": "2024-06-10" })),
    )
    .await;
    let event = rx.try_recv().unwrap();
    assert_eq!(event, RefreshEvent::new(date(2024, 6, 10), employee_id));

    let booking_id = booking["booking_id"].as_str().unwrap();
    send(
        &app,
        "POST",
        &format!("/v1/bookings/{booking_id}/check-in"),
        Some(&employee),
        None,
    )
    .await;
    let event = rx.try_recv().unwrap();
    assert_eq!(event, RefreshEvent::new(date(2024, 6, 10), employee_id));

    // A failed mutation must not invalidate anything.
    send(
        &app,
        "POST",
        &format!("/v1/bookings/{booking_id}/cancel"),
        Some(&employee),
        None,
    )
    .await;
    assert!(rx.try_recv().is_err());
}

#[tokio::test]
async fn seat_bulk_upload_reports_per_row_outcomes() {
    let (state, _rx) = test_state(morning());
    let app = app(state);
    let admin = token(Uuid::new_v4(), "admin");

    send(
        &app,
        "POST",
        "/v1/admin/seats",
        Some(&admin),
        Some(json!({ "seat_number": "A-1" })),
    )
    .await;

    let (status, body) = send(
        &app,
        "POST",
        "/v1/admin/seats/bulk-upload",
        Some(&admin),
        Some(json!({ "seat_numbers": ["A-2", "a-1", "  ", "A-3"] })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_rows"], 4);
    assert_eq!(body["created"], 2);
    assert_eq!(body["skipped_duplicate"], 1);
    assert_eq!(body["failed"], 1);
}

#[tokio::test]
async fn duplicate_seat_creation_conflicts_with_a_specific_message() {
    let (state, _rx) = test_state(morning());
    let app = app(state);
    let admin = token(Uuid::new_v4(), "admin");

    send(
        &app,
        "POST",
        "/v1/admin/seats",
        Some(&admin),
        Some(json!({ "seat_number": "A-1" })),
    )
    .await;
    let (status, body) = send(
        &app,
        "POST",
        "/v1/admin/seats",
        Some(&admin),
        Some(json!({ "seat_number": " a-1 " })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["detail"], "Seat A-1 already exists");
}

#[tokio::test]
async fn employee_directory_and_dashboard_metrics() {
    let (state, _rx) = test_state(morning());
    let app = app(state);
    let admin = token(Uuid::new_v4(), "admin");
    let employee = token(Uuid::new_v4(), "employee");

    // Two employees, one of them deactivated.
    let (status, created) = send(
        &app,
        "POST",
        "/v1/admin/employees",
        Some(&admin),
        Some(json!({ "badge": "E-100", "name": "Dana", "email": "dana@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["email"], "dana@example.com");

    let (_, parked) = send(
        &app,
        "POST",
        "/v1/admin/employees",
        Some(&admin),
        Some(json!({ "badge": "E-101", "name": "Robin", "email": "robin@example.com", "role": "admin" })),
    )
    .await;
    let parked_id = parked["id"].as_str().unwrap();
    let (status, _) = send(
        &app,
        "DELETE",
        &format!("/v1/admin/employees/{parked_id}"),
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Duplicate badges conflict.
    let (status, _) = send(
        &app,
        "POST",
        "/v1/admin/employees",
        Some(&admin),
        Some(json!({ "badge": "E-100", "name": "Other", "email": "other@example.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // One seat and one booking for today feed the day counters.
    let (_, seat) = send(
        &app,
        "POST",
        "/v1/admin/seats",
        Some(&admin),
        Some(json!({ "seat_number": "A-1" })),
    )
    .await;
    send(
        &app,
        "POST",
        "/v1/bookings",
        Some(&employee),
        Some(json!({ "seat_id": seat["id"], "booking_date": "2024-06-10" })),
    )
    .await;

    let (status, body) = send(
        &app,
        "GET",
        "/v1/admin/dashboard/metrics",
        Some(&admin),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["total_employees"], 2);
    assert_eq!(body["active_employees"], 1);
    assert_eq!(body["inactive_employees"], 1);
    assert_eq!(body["total_seats"], 1);
    assert_eq!(body["today_bookings"], 1);
    assert_eq!(body["today_confirmed"], 1);
    assert_eq!(body["today_checked_in"], 0);
}

#[tokio::test]
async fn my_bookings_supports_status_and_date_filters() {
    let (state, _rx) = test_state(morning());
    let app = app(state);
    let admin = token(Uuid::new_v4(), "admin");
    let employee = token(Uuid::new_v4(), "employee");

    for number in ["A-1", "A-2"] {
        send(
            &app,
            "POST",
            "/v1/admin/seats",
            Some(&admin),
            Some(json!({ "seat_number": number })),
        )
        .await;
    }
    let (_, seats) = send(&app, "GET", "/v1/seats", Some(&employee), None).await;
    let seats = seats.as_array().unwrap();

    let (_, first) = send(
        &app,
        "POST",
        "/v1/bookings",
        Some(&employee),
        Some(json!({ "seat_id": seats[0]["id"], "booking_date": "2024-06-10" })),
    )
    .await;
    send(
        &app,
        "POST",
        "/v1/bookings",
        Some(&employee),
        Some(json!({ "seat_id": seats[1]["id"], "booking_date": "2024-06-11" })),
    )
    .await;
    let first_id = first["booking_id"].as_str().unwrap();
    send(
        &app,
        "POST",
        &format!("/v1/bookings/{first_id}/cancel"),
        Some(&employee),
        None,
    )
    .await;

    let (_, body) = send(&app, "GET", "/v1/bookings/me", Some(&employee), None).await;
    assert_eq!(body["total"], 2);
    // Newest booking date first.
    assert_eq!(body["items"][0]["booking_date"], "2024-06-11");

    let (_, body) = send(
        &app,
        "GET",
        "/v1/bookings/me?status=cancelled",
        Some(&employee),
        None,
    )
    .await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["items"][0]["booking_date"], "2024-06-10");

    let (status, _) = send(
        &app,
        "GET",
        "/v1/bookings/me?status=bogus",
        Some(&employee),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (_, body) = send(
        &app,
        "GET",
        "/v1/bookings/me?date=2024-06-11",
        Some(&employee),
        None,
    )
    .await;
    assert_eq!(body["total"], 1);
}
