use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One concrete occurrence of an activity. `max_capacity` is snapshotted
/// from the room (or the activity's base capacity) at creation and stays
/// editable per session afterwards. `qr_seq` is the integer id embedded
/// in QR check-in tokens.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Session {
    pub id: String,
    pub qr_seq: i64,
    pub gym_id: String,
    pub activity_id: String,
    pub rule_id: Option<String>,
    pub room_id: Option<String>,
    pub staff_id: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub status: String,
    pub max_capacity: i32,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewSessionParams {
    pub gym_id: String,
    pub activity_id: String,
    pub rule_id: Option<String>,
    pub room_id: Option<String>,
    pub staff_id: Option<String>,
    pub start_at: DateTime<Utc>,
    pub end_at: DateTime<Utc>,
    pub max_capacity: i32,
}

impl Session {
    pub fn new(params: NewSessionParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            // assigned by the repository on insert
            qr_seq: 0,
            gym_id: params.gym_id,
            activity_id: params.activity_id,
            rule_id: params.rule_id,
            room_id: params.room_id,
            staff_id: params.staff_id,
            start_at: params.start_at,
            end_at: params.end_at,
            status: "SCHEDULED".to_string(),
            max_capacity: params.max_capacity,
            notes: String::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_scheduled(&self) -> bool {
        self.status == "SCHEDULED"
    }
}
