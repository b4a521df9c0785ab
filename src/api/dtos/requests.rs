use chrono::NaiveDate;
use serde::Deserialize;

#[derive(Deserialize)]
pub struct CreateRoomRequest {
    pub name: String,
    pub capacity: i32,
    pub layout: Option<serde_json::Value>,
}

#[derive(Deserialize)]
pub struct CreateActivityRequest {
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub duration_min: Option<i32>,
    pub base_capacity: i32,
    pub qr_checkin_enabled: Option<bool>,
    pub allow_spot_booking: Option<bool>,
    pub policy_id: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateActivityRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color: Option<String>,
    pub duration_min: Option<i32>,
    pub base_capacity: Option<i32>,
    pub qr_checkin_enabled: Option<bool>,
    pub allow_spot_booking: Option<bool>,
    pub policy_id: Option<String>,
}

#[derive(Deserialize)]
pub struct CreatePolicyRequest {
    pub name: String,
    pub cancellation_window_hours: Option<i32>,
    pub penalty_type: Option<String>,
    pub waitlist_enabled: Option<bool>,
    pub waitlist_mode: Option<String>,
    pub waitlist_limit: Option<i32>,
    pub waitlist_claim_timeout_minutes: Option<i32>,
    pub auto_promote_cutoff_hours: Option<i32>,
    pub broadcast_count: Option<i32>,
}

#[derive(Deserialize)]
pub struct UpdateCheckinSettingsRequest {
    pub qr_refresh_seconds: Option<i32>,
    pub minutes_before: Option<i32>,
    pub minutes_after: Option<i32>,
    pub success_message: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateScheduleSettingsRequest {
    pub allow_room_overlaps: Option<bool>,
    pub allow_staff_overlaps: Option<bool>,
    pub min_break_minutes: Option<i32>,
    pub on_conflict: Option<String>,
    pub timezone: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateSessionRequest {
    pub activity_id: String,
    pub room_id: Option<String>,
    pub staff_id: Option<String>,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: Option<String>,
    pub max_capacity: Option<i32>,
}

#[derive(Deserialize)]
pub struct CreateRecurringRequest {
    pub activity_id: String,
    pub room_id: Option<String>,
    pub staff_id: Option<String>,
    /// 0 = Monday .. 6 = Sunday
    pub days: Vec<i32>,
    pub start_time: String,
    pub end_time: Option<String>,
    pub end_date: NaiveDate,
}

#[derive(Deserialize)]
pub struct UpdateSessionRequest {
    /// "single" (default) or "future"
    pub mode: Option<String>,
    pub room_id: Option<String>,
    pub staff_id: Option<String>,
    pub max_capacity: Option<i32>,
    pub notes: Option<String>,
    pub date: Option<NaiveDate>,
    pub start_time: Option<String>,
    pub end_time: Option<String>,
}

#[derive(Deserialize)]
pub struct CancelSessionRequest {
    pub mode: Option<String>,
}

#[derive(Deserialize)]
pub struct AddAttendeeRequest {
    pub client_id: String,
    pub spot_number: Option<i32>,
}

#[derive(Deserialize)]
pub struct RemoveAttendeeQuery {
    pub mode: Option<String>,
    pub cancellation_type: Option<String>,
}

#[derive(Deserialize)]
pub struct MarkAttendanceRequest {
    pub booking_id: String,
    pub status: String,
}

#[derive(Deserialize)]
pub struct ChangeSpotRequest {
    pub client_id: String,
    pub spot_number: i32,
}

#[derive(Deserialize)]
pub struct JoinWaitlistRequest {
    pub client_id: String,
}

#[derive(Deserialize)]
pub struct QrCheckinRequest {
    pub client_id: String,
}

#[derive(Deserialize)]
pub struct SessionsQuery {
    pub date: NaiveDate,
}
