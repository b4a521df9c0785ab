use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Outbox row for a fire-and-forget client notification. The request
/// handler only enqueues; the background worker delivers, so transactional
/// correctness never depends on the notification collaborator.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct NotificationJob {
    pub id: String,
    pub gym_id: String,
    pub client_id: String,
    pub session_id: String,
    pub event_type: String,
    pub status: String,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl NotificationJob {
    pub fn new(gym_id: String, client_id: String, session_id: String, event_type: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            gym_id,
            client_id,
            session_id,
            event_type: event_type.to_string(),
            status: "PENDING".to_string(),
            error_message: None,
            created_at: Utc::now(),
        }
    }
}
