use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// One check-in per (session, client), enforced by a unique index.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Checkin {
    pub id: String,
    pub session_id: String,
    pub gym_id: String,
    pub client_id: String,
    pub method: String,
    pub token: Option<String>,
    pub checked_in_at: DateTime<Utc>,
}

impl Checkin {
    pub fn new(session_id: String, gym_id: String, client_id: String, method: &str, token: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            gym_id,
            client_id,
            method: method.to_string(),
            token,
            checked_in_at: Utc::now(),
        }
    }
}

/// Per-gym QR configuration: how often the displayed code rotates and the
/// window around session start during which scans are accepted.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct CheckinSettings {
    pub gym_id: String,
    pub qr_refresh_seconds: i32,
    pub minutes_before: i32,
    pub minutes_after: i32,
    pub success_message: String,
    pub updated_at: DateTime<Utc>,
}

impl CheckinSettings {
    pub fn defaults(gym_id: &str) -> Self {
        Self {
            gym_id: gym_id.to_string(),
            qr_refresh_seconds: 30,
            minutes_before: 15,
            minutes_after: 30,
            success_message: "Check-in complete. See you in class!".to_string(),
            updated_at: Utc::now(),
        }
    }

    /// Scan-time tolerance: twice the rotation interval absorbs display
    /// and clock skew.
    pub fn max_token_age_seconds(&self) -> i64 {
        (self.qr_refresh_seconds as i64) * 2
    }
}
