mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{parse_body, TestApp};
use serde_json::json;

async fn checkin_setup(app: &TestApp, gym: &str, start_offset: Duration) -> String {
    let activity = app.create_activity(gym, None, json!({ "qr_checkin_enabled": true })).await;
    let session = app.create_session_at(gym, &activity, Utc::now() + start_offset, 5).await;
    session["id"].as_str().unwrap().to_string()
}

async fn current_token(app: &TestApp, gym: &str, session_id: &str) -> String {
    let res = app.get(&format!("/api/v1/{gym}/sessions/{session_id}/qr")).await;
    assert_eq!(res.status(), StatusCode::OK);
    parse_body(res).await["token"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_qr_checkin_marks_attendance() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let session_id = checkin_setup(&app, gym, Duration::minutes(10)).await;
    app.add_attendee(gym, &session_id, "c1").await;

    let token = current_token(&app, gym, &session_id).await;
    let res = app.post(&format!("/api/v1/{gym}/checkin/qr/{token}"), json!({ "client_id": "c1" })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["already_checked_in"], false);

    let detail = parse_body(app.get(&format!("/api/v1/{gym}/sessions/{session_id}")).await).await;
    assert_eq!(detail["checked_in_count"], 1);
    let c1 = detail["bookings"].as_array().unwrap().iter()
        .find(|b| b["client_id"] == "c1")
        .unwrap();
    assert_eq!(c1["attendance_status"], "ATTENDED");
}

#[tokio::test]
async fn test_rescanning_is_idempotent() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let session_id = checkin_setup(&app, gym, Duration::minutes(10)).await;
    app.add_attendee(gym, &session_id, "c1").await;

    let token = current_token(&app, gym, &session_id).await;
    let first = app.post(&format!("/api/v1/{gym}/checkin/qr/{token}"), json!({ "client_id": "c1" })).await;
    assert_eq!(first.status(), StatusCode::OK);

    let second = app.post(&format!("/api/v1/{gym}/checkin/qr/{token}"), json!({ "client_id": "c1" })).await;
    assert_eq!(second.status(), StatusCode::OK);
    let body = parse_body(second).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["already_checked_in"], true);

    // Exactly one record regardless of how many scans landed.
    let count: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM checkins WHERE session_id = ? AND client_id = 'c1'"
    )
        .bind(&session_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(count, 1);
}

#[tokio::test]
async fn test_checkin_requires_a_reservation() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let session_id = checkin_setup(&app, gym, Duration::minutes(10)).await;

    let token = current_token(&app, gym, &session_id).await;
    let res = app.post(&format!("/api/v1/{gym}/checkin/qr/{token}"), json!({ "client_id": "walk-in" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(res).await["code"], "NO_RESERVATION");
}

#[tokio::test]
async fn test_forged_tokens_are_rejected_generically() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let session_id = checkin_setup(&app, gym, Duration::minutes(10)).await;
    app.add_attendee(gym, &session_id, "c1").await;

    for bad in ["garbage", "1:2", "1:notanumber:affe"] {
        let res = app.post(&format!("/api/v1/{gym}/checkin/qr/{bad}"), json!({ "client_id": "c1" })).await;
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert_eq!(parse_body(res).await["code"], "INVALID_QR");
    }

    // A well-formed token with a tampered signature gets the same answer.
    let token = current_token(&app, gym, &session_id).await;
    let mut parts: Vec<String> = token.split(':').map(String::from).collect();
    parts[2] = parts[2].chars().rev().collect();
    let forged = parts.join(":");
    let res = app.post(&format!("/api/v1/{gym}/checkin/qr/{forged}"), json!({ "client_id": "c1" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(res).await["code"], "INVALID_QR");
}

#[tokio::test]
async fn test_checkin_window_is_enforced() {
    let app = TestApp::new().await;
    let gym = "gym1";
    // Three hours out: well before the 15-minute pre-start window.
    let session_id = checkin_setup(&app, gym, Duration::hours(3)).await;
    app.add_attendee(gym, &session_id, "c1").await;

    let token = current_token(&app, gym, &session_id).await;
    let res = app.post(&format!("/api/v1/{gym}/checkin/qr/{token}"), json!({ "client_id": "c1" })).await;
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    assert_eq!(parse_body(res).await["code"], "OUTSIDE_CHECKIN_WINDOW");
}

#[tokio::test]
async fn test_checkin_respects_activity_flag() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({ "qr_checkin_enabled": false })).await;
    let session = app.create_session_at(gym, &activity, Utc::now() + Duration::minutes(10), 5).await;
    let session_id = session["id"].as_str().unwrap();
    app.add_attendee(gym, session_id, "c1").await;

    let token = current_token(&app, gym, session_id).await;
    let res = app.post(&format!("/api/v1/{gym}/checkin/qr/{token}"), json!({ "client_id": "c1" })).await;
    assert_eq!(res.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_display_data_rotates_predictably() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let session_id = checkin_setup(&app, gym, Duration::minutes(10)).await;

    let res = app.get(&format!("/api/v1/{gym}/sessions/{session_id}/qr")).await;
    let body = parse_body(res).await;
    let refresh_in = body["refresh_in"].as_i64().unwrap();
    assert!(refresh_in > 0 && refresh_in <= 30);
    assert!(body["url"].as_str().unwrap().contains(body["token"].as_str().unwrap()));

    // Within the same rotation interval the token is stable.
    let again = parse_body(app.get(&format!("/api/v1/{gym}/sessions/{session_id}/qr")).await).await;
    if again["refresh_in"].as_i64().unwrap() < refresh_in {
        assert_eq!(again["token"], body["token"]);
    }
}
