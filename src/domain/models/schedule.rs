use serde::{Deserialize, Serialize};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Recurring pattern (e.g. Yoga every Monday 10:00-11:00). Sessions are
/// generated from the rule; deactivating a rule never touches sessions
/// that already exist.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleRule {
    pub id: String,
    pub gym_id: String,
    pub activity_id: String,
    pub room_id: Option<String>,
    pub staff_id: Option<String>,
    /// 0 = Monday .. 6 = Sunday
    pub day_of_week: i32,
    /// "HH:MM"
    pub start_time: String,
    pub end_time: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

pub struct NewRuleParams {
    pub gym_id: String,
    pub activity_id: String,
    pub room_id: Option<String>,
    pub staff_id: Option<String>,
    pub day_of_week: i32,
    pub start_time: String,
    pub end_time: String,
    pub start_date: NaiveDate,
    pub end_date: Option<NaiveDate>,
}

impl ScheduleRule {
    pub fn new(params: NewRuleParams) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            gym_id: params.gym_id,
            activity_id: params.activity_id,
            room_id: params.room_id,
            staff_id: params.staff_id,
            day_of_week: params.day_of_week,
            start_time: params.start_time,
            end_time: params.end_time,
            start_date: params.start_date,
            end_date: params.end_date,
            is_active: true,
            created_at: Utc::now(),
        }
    }
}

/// Per-gym generation policy: which overlaps are tolerated and whether a
/// batch stops or skips when it hits a conflict.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct ScheduleSettings {
    pub gym_id: String,
    pub allow_room_overlaps: bool,
    pub allow_staff_overlaps: bool,
    pub min_break_minutes: i32,
    /// "FAIL" = stop at the first conflicting day, "SKIP" = skip it and keep going
    pub on_conflict: String,
    /// IANA timezone the gym's rule times are written in.
    pub timezone: String,
    pub updated_at: DateTime<Utc>,
}

impl ScheduleSettings {
    pub fn defaults(gym_id: &str) -> Self {
        Self {
            gym_id: gym_id.to_string(),
            allow_room_overlaps: false,
            allow_staff_overlaps: false,
            min_break_minutes: 0,
            on_conflict: "FAIL".to_string(),
            timezone: "UTC".to_string(),
            updated_at: Utc::now(),
        }
    }
}
