mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::{Duration, Utc};
use common::{parse_body, TestApp};
use serde_json::json;
use tower::ServiceExt;

#[tokio::test]
async fn test_capacity_is_enforced() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({})).await;
    let session = app.create_session_at(gym, &activity, Utc::now() + Duration::days(1), 2).await;
    let session_id = session["id"].as_str().unwrap();

    let r1 = app.add_attendee(gym, session_id, "c1").await;
    assert_eq!(r1.status(), StatusCode::OK);
    let r2 = app.add_attendee(gym, session_id, "c2").await;
    assert_eq!(r2.status(), StatusCode::OK);
    assert_eq!(parse_body(r2).await["attendee_count"], 2);

    let r3 = app.add_attendee(gym, session_id, "c3").await;
    assert_eq!(r3.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(r3).await["code"], "CAPACITY_EXCEEDED");
}

#[tokio::test]
async fn test_duplicate_booking_is_rejected() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({})).await;
    let session = app.create_session_at(gym, &activity, Utc::now() + Duration::days(1), 5).await;
    let session_id = session["id"].as_str().unwrap();

    assert_eq!(app.add_attendee(gym, session_id, "c1").await.status(), StatusCode::OK);
    let dup = app.add_attendee(gym, session_id, "c1").await;
    assert_eq!(dup.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(dup).await["code"], "ALREADY_BOOKED");
}

#[tokio::test]
async fn test_concurrent_bookings_never_exceed_capacity() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({})).await;
    let session = app.create_session_at(gym, &activity, Utc::now() + Duration::days(1), 1).await;
    let session_id = session["id"].as_str().unwrap().to_string();

    let mut handles = Vec::new();
    for i in 0..8 {
        let router = app.router.clone();
        let uri = format!("/api/v1/{gym}/sessions/{session_id}/attendees");
        handles.push(tokio::spawn(async move {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .header("X-Actor-Id", "staff-1")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json!({ "client_id": format!("client-{i}") }).to_string()))
                .unwrap();
            router.oneshot(request).await.unwrap().status()
        }));
    }

    let mut successes = 0;
    for handle in handles {
        if handle.await.unwrap() == StatusCode::OK {
            successes += 1;
        }
    }
    assert_eq!(successes, 1);

    let confirmed: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bookings WHERE session_id = ? AND status = 'CONFIRMED'"
    )
        .bind(&session_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(confirmed, 1);
}

#[tokio::test]
async fn test_rebooking_after_cancellation_revives_the_row() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({})).await;
    let session = app.create_session_at(gym, &activity, Utc::now() + Duration::days(1), 2).await;
    let session_id = session["id"].as_str().unwrap();

    assert_eq!(app.add_attendee(gym, session_id, "c1").await.status(), StatusCode::OK);
    let removed = app.delete(&format!(
        "/api/v1/{gym}/sessions/{session_id}/attendees/c1?cancellation_type=EARLY"
    )).await;
    assert_eq!(removed.status(), StatusCode::OK);

    let rebooked = app.add_attendee(gym, session_id, "c1").await;
    assert_eq!(rebooked.status(), StatusCode::OK);

    // History is a status change, not a new row.
    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE session_id = ? AND client_id = 'c1'")
        .bind(session_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rows, 1);
}

#[tokio::test]
async fn test_spot_booking_conflicts() {
    let app = TestApp::new().await;
    let gym = "gym1";

    let room_res = app.post(&format!("/api/v1/{gym}/rooms"), json!({
        "name": "Cycle Studio",
        "capacity": 10,
        "layout": [
            { "type": "spot", "number": 1, "x": 0.0, "y": 0.0 },
            { "type": "spot", "number": 2, "x": 1.0, "y": 0.0 },
            { "type": "spot", "number": 3, "x": 2.0, "y": 0.0 },
            { "type": "obstacle", "x": 0.0, "y": 1.0 }
        ]
    })).await;
    assert_eq!(room_res.status(), StatusCode::OK);
    let room_id = parse_body(room_res).await["id"].as_str().unwrap().to_string();

    let activity = app.create_activity(gym, None, json!({ "allow_spot_booking": true })).await;
    let start = Utc::now() + Duration::days(1);
    let session_res = app.post(&format!("/api/v1/{gym}/sessions"), json!({
        "activity_id": activity,
        "room_id": room_id,
        "date": start.format("%Y-%m-%d").to_string(),
        "start_time": start.format("%H:%M").to_string(),
    })).await;
    assert_eq!(session_res.status(), StatusCode::OK);
    let session = parse_body(session_res).await;
    let session_id = session["id"].as_str().unwrap();
    // Capacity snapshot comes from the room.
    assert_eq!(session["max_capacity"], 10);

    let r1 = app.post(&format!("/api/v1/{gym}/sessions/{session_id}/attendees"),
        json!({ "client_id": "c1", "spot_number": 1 })).await;
    assert_eq!(r1.status(), StatusCode::OK);

    let taken = app.post(&format!("/api/v1/{gym}/sessions/{session_id}/attendees"),
        json!({ "client_id": "c2", "spot_number": 1 })).await;
    assert_eq!(taken.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(taken).await["code"], "SPOT_TAKEN");

    let missing = app.post(&format!("/api/v1/{gym}/sessions/{session_id}/attendees"),
        json!({ "client_id": "c2", "spot_number": 99 })).await;
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);

    let r2 = app.post(&format!("/api/v1/{gym}/sessions/{session_id}/attendees"),
        json!({ "client_id": "c2", "spot_number": 2 })).await;
    assert_eq!(r2.status(), StatusCode::OK);

    // Occupancy is derived from active bookings at read time.
    let spots_res = app.get(&format!("/api/v1/{gym}/sessions/{session_id}/spots")).await;
    let spots = parse_body(spots_res).await;
    assert_eq!(spots["available_spots"], 1);
    assert_eq!(spots["occupied_spots"], 2);
    assert_eq!(spots["obstacles"].as_array().unwrap().len(), 1);

    // Moving to a free spot works, moving onto a held spot does not.
    let moved = app.post(&format!("/api/v1/{gym}/sessions/{session_id}/spots"),
        json!({ "client_id": "c2", "spot_number": 3 })).await;
    assert_eq!(moved.status(), StatusCode::OK);
    let blocked = app.post(&format!("/api/v1/{gym}/sessions/{session_id}/spots"),
        json!({ "client_id": "c2", "spot_number": 1 })).await;
    assert_eq!(blocked.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_mark_attendance_validates_and_is_idempotent() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({})).await;
    let session = app.create_session_at(gym, &activity, Utc::now() + Duration::days(1), 5).await;
    let session_id = session["id"].as_str().unwrap();

    let added = app.add_attendee(gym, session_id, "c1").await;
    let booking_id = parse_body(added).await["booking"]["id"].as_str().unwrap().to_string();

    let invalid = app.post(&format!("/api/v1/{gym}/sessions/{session_id}/attendance"),
        json!({ "booking_id": booking_id, "status": "MAYBE" })).await;
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let marked = app.post(&format!("/api/v1/{gym}/sessions/{session_id}/attendance"),
        json!({ "booking_id": booking_id, "status": "NO_SHOW" })).await;
    assert_eq!(marked.status(), StatusCode::OK);
    assert_eq!(parse_body(marked).await["booking"]["attendance_status"], "NO_SHOW");

    let again = app.post(&format!("/api/v1/{gym}/sessions/{session_id}/attendance"),
        json!({ "booking_id": booking_id, "status": "NO_SHOW" })).await;
    assert_eq!(again.status(), StatusCode::OK);

    // Marking LATE_CANCEL closes the booking itself.
    let late = app.post(&format!("/api/v1/{gym}/sessions/{session_id}/attendance"),
        json!({ "booking_id": booking_id, "status": "LATE_CANCEL" })).await;
    let body = parse_body(late).await;
    assert_eq!(body["booking"]["attendance_status"], "LATE_CANCEL");
    assert_eq!(body["booking"]["status"], "CANCELLED");
}
