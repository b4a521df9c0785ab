use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Room {
    pub id: String,
    pub gym_id: String,
    pub name: String,
    pub capacity: i32,
    pub layout_json: String,
    pub created_at: DateTime<Utc>,
}

impl Room {
    pub fn new(gym_id: String, name: String, capacity: i32, layout_json: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            gym_id,
            name,
            capacity,
            layout_json: layout_json.unwrap_or_else(|| "[]".to_string()),
            created_at: Utc::now(),
        }
    }
}

/// One element of a room's floor plan. Spots are bookable positions,
/// obstacles are rendered but never assigned.
#[derive(Debug, Serialize, Deserialize, Clone)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LayoutItem {
    Spot { number: i32, x: f64, y: f64 },
    Obstacle { x: f64, y: f64 },
}
