use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Activity {
    pub id: String,
    pub gym_id: String,
    pub name: String,
    pub description: String,
    pub color: String,
    pub duration_min: i32,
    pub base_capacity: i32,
    pub qr_checkin_enabled: bool,
    pub allow_spot_booking: bool,
    pub policy_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

pub struct NewActivityParams {
    pub gym_id: String,
    pub name: String,
    pub description: Option<String>,
    pub color: Option<String>,
    pub duration_min: Option<i32>,
    pub base_capacity: i32,
    pub qr_checkin_enabled: bool,
    pub allow_spot_booking: bool,
    pub policy_id: Option<String>,
}

impl Activity {
    pub fn new(params: NewActivityParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            gym_id: params.gym_id,
            name: params.name,
            description: params.description.unwrap_or_default(),
            color: params.color.unwrap_or_else(|| "#3B82F6".to_string()),
            duration_min: params.duration_min.unwrap_or(60),
            base_capacity: params.base_capacity,
            qr_checkin_enabled: params.qr_checkin_enabled,
            allow_spot_booking: params.allow_spot_booking,
            policy_id: params.policy_id,
            created_at: Utc::now(),
        }
    }
}

/// Per-activity booking rules: cancellation window, penalty kind and
/// waitlist behaviour. Penalty enforcement (fees, strikes) lives in the
/// billing/loyalty collaborators; this record only classifies.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ActivityPolicy {
    pub id: String,
    pub gym_id: String,
    pub name: String,
    pub cancellation_window_hours: i32,
    pub penalty_type: String,
    pub waitlist_enabled: bool,
    pub waitlist_mode: String,
    pub waitlist_limit: i32,
    pub waitlist_claim_timeout_minutes: i32,
    pub auto_promote_cutoff_hours: i32,
    pub broadcast_count: i32,
    pub created_at: DateTime<Utc>,
}

pub struct NewPolicyParams {
    pub gym_id: String,
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

impl ActivityPolicy {
    pub fn new(params: NewPolicyParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            gym_id: params.gym_id,
            name: params.name,
            cancellation_window_hours: params.cancellation_window_hours.unwrap_or(2),
            penalty_type: params.penalty_type.unwrap_or_else(|| "FORFEIT".to_string()),
            waitlist_enabled: params.waitlist_enabled.unwrap_or(true),
            waitlist_mode: params.waitlist_mode.unwrap_or_else(|| "AUTO_PROMOTE".to_string()),
            waitlist_limit: params.waitlist_limit.unwrap_or(0),
            waitlist_claim_timeout_minutes: params.waitlist_claim_timeout_minutes.unwrap_or(30),
            auto_promote_cutoff_hours: params.auto_promote_cutoff_hours.unwrap_or(0),
            broadcast_count: params.broadcast_count.unwrap_or(3),
            created_at: Utc::now(),
        }
    }
}
