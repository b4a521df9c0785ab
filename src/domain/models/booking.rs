use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// A client's reservation on a session. Rows are never hard-deleted:
/// cancellation flips `status`, late cancellations additionally carry
/// attendance_status LATE_CANCEL so they stay visible for reporting
/// while no longer counting against capacity.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub session_id: String,
    pub gym_id: String,
    pub client_id: String,
    pub spot_number: Option<i32>,
    pub status: String,
    pub attendance_status: String,
    pub booked_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub marked_by: Option<String>,
    pub marked_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn new(session_id: String, gym_id: String, client_id: String, spot_number: Option<i32>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            gym_id,
            client_id,
            spot_number,
            status: "CONFIRMED".to_string(),
            attendance_status: "PENDING".to_string(),
            booked_at: now,
            updated_at: now,
            marked_by: None,
            marked_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == "CONFIRMED" || self.status == "PENDING"
    }
}

pub const ATTENDANCE_STATUSES: [&str; 3] = ["ATTENDED", "NO_SHOW", "LATE_CANCEL"];
