mod common;

use axum::http::StatusCode;
use chrono::{Datelike, Duration, Utc};
use common::{parse_body, TestApp};
use serde_json::json;

/// First target date is the day after tomorrow; with a 28-day window that
/// weekday occurs exactly four times regardless of when the test runs.
fn target_day() -> (chrono::NaiveDate, i32, chrono::NaiveDate) {
    let first = (Utc::now() + Duration::days(2)).date_naive();
    let day_of_week = first.weekday().num_days_from_monday() as i32;
    let end_date = (Utc::now() + Duration::days(27)).date_naive();
    (first, day_of_week, end_date)
}

#[tokio::test]
async fn test_recurring_generation_creates_weekly_sessions() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({})).await;
    let (_, day_of_week, end_date) = target_day();

    let res = app.post(&format!("/api/v1/{gym}/sessions/recurring"), json!({
        "activity_id": activity,
        "days": [day_of_week],
        "start_time": "10:00",
        "end_time": "11:00",
        "end_date": end_date,
    })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;
    assert_eq!(body["created"], 4);
    assert!(body.get("conflict").is_none());

    let rule_id = body["rule_ids"][0].as_str().unwrap();
    let starts: Vec<String> = sqlx::query_scalar(
        "SELECT start_at FROM sessions WHERE rule_id = ? ORDER BY start_at ASC"
    )
        .bind(rule_id)
        .fetch_all(&app.pool)
        .await
        .unwrap();
    assert_eq!(starts.len(), 4);
    assert!(starts.iter().all(|s| s.contains("10:00")));
}

#[tokio::test]
async fn test_recurring_generation_fail_fast_on_room_conflict() {
    let app = TestApp::new().await;
    let gym = "gym1";

    let room = parse_body(app.post(&format!("/api/v1/{gym}/rooms"),
        json!({ "name": "R1", "capacity": 20 })).await).await["id"].as_str().unwrap().to_string();
    let activity = app.create_activity(gym, None, json!({})).await;
    let (first_date, day_of_week, end_date) = target_day();

    // An unrelated session already occupies R1 on the first target day.
    let blocker = app.post(&format!("/api/v1/{gym}/sessions"), json!({
        "activity_id": activity,
        "room_id": room,
        "date": first_date,
        "start_time": "10:30",
        "end_time": "11:30",
    })).await;
    assert_eq!(blocker.status(), StatusCode::OK);

    let res = app.post(&format!("/api/v1/{gym}/sessions/recurring"), json!({
        "activity_id": activity,
        "room_id": room,
        "days": [day_of_week],
        "start_time": "10:00",
        "end_time": "11:00",
        "end_date": end_date,
    })).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = parse_body(res).await;

    // FAIL policy: the batch stops at the first conflicting day.
    assert_eq!(body["created"], 0);
    assert_eq!(body["conflict"]["kind"], "ROOM_OVERLAP");
    assert_eq!(body["conflict"]["date"], first_date.to_string());
}

#[tokio::test]
async fn test_recurring_generation_skip_mode_steps_over_conflicts() {
    let app = TestApp::new().await;
    let gym = "gym1";

    let room = parse_body(app.post(&format!("/api/v1/{gym}/rooms"),
        json!({ "name": "R1", "capacity": 20 })).await).await["id"].as_str().unwrap().to_string();
    let activity = app.create_activity(gym, None, json!({})).await;
    let (first_date, day_of_week, end_date) = target_day();

    app.post(&format!("/api/v1/{gym}/sessions"), json!({
        "activity_id": activity,
        "room_id": room,
        "date": first_date,
        "start_time": "10:30",
        "end_time": "11:30",
    })).await;

    let settings = app.put(&format!("/api/v1/{gym}/schedule-settings"),
        json!({ "on_conflict": "SKIP" })).await;
    assert_eq!(settings.status(), StatusCode::OK);

    let res = app.post(&format!("/api/v1/{gym}/sessions/recurring"), json!({
        "activity_id": activity,
        "room_id": room,
        "days": [day_of_week],
        "start_time": "10:00",
        "end_time": "11:00",
        "end_date": end_date,
    })).await;
    let body = parse_body(res).await;

    assert_eq!(body["created"], 3);
    assert_eq!(body["skipped"].as_array().unwrap().len(), 1);
    assert_eq!(body["skipped"][0]["date"], first_date.to_string());
}

#[tokio::test]
async fn test_staff_overlap_blocks_single_session_creation() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({})).await;
    let (first_date, _, _) = target_day();

    let first = app.post(&format!("/api/v1/{gym}/sessions"), json!({
        "activity_id": activity,
        "staff_id": "trainer-1",
        "date": first_date,
        "start_time": "10:00",
        "end_time": "11:00",
    })).await;
    assert_eq!(first.status(), StatusCode::OK);

    let clash = app.post(&format!("/api/v1/{gym}/sessions"), json!({
        "activity_id": activity,
        "staff_id": "trainer-1",
        "date": first_date,
        "start_time": "10:30",
        "end_time": "11:30",
    })).await;
    assert_eq!(clash.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(clash).await["code"], "STAFF_OVERLAP");

    // A different trainer at the same time is fine.
    let other = app.post(&format!("/api/v1/{gym}/sessions"), json!({
        "activity_id": activity,
        "staff_id": "trainer-2",
        "date": first_date,
        "start_time": "10:30",
        "end_time": "11:30",
    })).await;
    assert_eq!(other.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_minimum_break_between_classes() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({})).await;
    let (first_date, _, _) = target_day();

    app.put(&format!("/api/v1/{gym}/schedule-settings"), json!({ "min_break_minutes": 15 })).await;

    app.post(&format!("/api/v1/{gym}/sessions"), json!({
        "activity_id": activity,
        "staff_id": "trainer-1",
        "date": first_date,
        "start_time": "09:00",
        "end_time": "10:00",
    })).await;

    let too_soon = app.post(&format!("/api/v1/{gym}/sessions"), json!({
        "activity_id": activity,
        "staff_id": "trainer-1",
        "date": first_date,
        "start_time": "10:10",
        "end_time": "11:10",
    })).await;
    assert_eq!(too_soon.status(), StatusCode::CONFLICT);
    assert_eq!(parse_body(too_soon).await["code"], "MIN_BREAK");

    let rested = app.post(&format!("/api/v1/{gym}/sessions"), json!({
        "activity_id": activity,
        "staff_id": "trainer-1",
        "date": first_date,
        "start_time": "10:15",
        "end_time": "11:15",
    })).await;
    assert_eq!(rested.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_future_update_preserves_dates_and_replaces_times() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({})).await;
    let (_, day_of_week, end_date) = target_day();

    let body = parse_body(app.post(&format!("/api/v1/{gym}/sessions/recurring"), json!({
        "activity_id": activity,
        "days": [day_of_week],
        "start_time": "10:00",
        "end_time": "11:00",
        "end_date": end_date,
    })).await).await;
    let rule_id = body["rule_ids"][0].as_str().unwrap().to_string();

    let ids_and_dates: Vec<(String, String)> = sqlx::query_as(
        "SELECT id, date(start_at) FROM sessions WHERE rule_id = ? ORDER BY start_at ASC"
    )
        .bind(&rule_id)
        .fetch_all(&app.pool)
        .await
        .unwrap();
    let first_id = ids_and_dates[0].0.clone();
    let dates_before: Vec<String> = ids_and_dates.iter().map(|(_, d)| d.clone()).collect();

    let res = app.put(&format!("/api/v1/{gym}/sessions/{first_id}"), json!({
        "mode": "future",
        "start_time": "12:00",
        "end_time": "13:00",
    })).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["updated"], 4);

    let after: Vec<(String, String)> = sqlx::query_as(
        "SELECT date(start_at), time(start_at) FROM sessions WHERE rule_id = ? ORDER BY start_at ASC"
    )
        .bind(&rule_id)
        .fetch_all(&app.pool)
        .await
        .unwrap();
    let dates_after: Vec<String> = after.iter().map(|(d, _)| d.clone()).collect();
    assert_eq!(dates_before, dates_after);
    assert!(after.iter().all(|(_, t)| t == "12:00:00"));

    let rule_time: String = sqlx::query_scalar("SELECT start_time FROM schedule_rules WHERE id = ?")
        .bind(&rule_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(rule_time, "12:00");
}

#[tokio::test]
async fn test_cancel_future_closes_the_series() {
    let app = TestApp::new().await;
    let gym = "gym1";
    let activity = app.create_activity(gym, None, json!({})).await;
    let (_, day_of_week, end_date) = target_day();

    let body = parse_body(app.post(&format!("/api/v1/{gym}/sessions/recurring"), json!({
        "activity_id": activity,
        "days": [day_of_week],
        "start_time": "10:00",
        "end_time": "11:00",
        "end_date": end_date,
    })).await).await;
    let rule_id = body["rule_ids"][0].as_str().unwrap().to_string();

    let first_id: String = sqlx::query_scalar(
        "SELECT id FROM sessions WHERE rule_id = ? ORDER BY start_at ASC LIMIT 1"
    )
        .bind(&rule_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();

    let res = app.post(&format!("/api/v1/{gym}/sessions/{first_id}/cancel"), json!({ "mode": "future" })).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["cancelled"], 4);

    let remaining: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM sessions WHERE rule_id = ? AND status = 'SCHEDULED'"
    )
        .bind(&rule_id)
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert_eq!(remaining, 0);
}
