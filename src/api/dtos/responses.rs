use crate::domain::models::{booking::Booking, session::Session, waitlist::WaitlistEntry};
use crate::domain::services::cancellation::CancellationAssessment;
use crate::domain::services::schedule::ScheduleConflict;
use serde::Serialize;

#[derive(Serialize)]
pub struct RecurringGenerationResponse {
    pub rule_ids: Vec<String>,
    pub created: i64,
    /// FAIL mode: the conflict the batch stopped at.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict: Option<ScheduleConflict>,
    /// SKIP mode: conflicts that were stepped over.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<ScheduleConflict>,
}

#[derive(Serialize)]
pub struct SessionDetailResponse {
    #[serde(flatten)]
    pub session: Session,
    pub confirmed_count: i64,
    pub checked_in_count: i64,
    pub bookings: Vec<Booking>,
    pub waitlist: Vec<WaitlistPositionView>,
    pub cancellation: Option<CancellationAssessment>,
}

#[derive(Serialize)]
pub struct WaitlistPositionView {
    #[serde(flatten)]
    pub entry: WaitlistEntry,
    pub position: i64,
}

#[derive(Serialize)]
pub struct SessionListItem {
    #[serde(flatten)]
    pub session: Session,
    pub booked: i64,
    pub checked_in: i64,
    pub is_full: bool,
}

#[derive(Serialize)]
pub struct QrDisplayResponse {
    pub token: String,
    pub url: String,
    pub refresh_in: i64,
    pub session_id: String,
    pub attendee_count: i64,
    pub checkins: i64,
    pub max_capacity: i32,
}
