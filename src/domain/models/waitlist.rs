use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Queued request for a slot in a full session.
///
/// Lifecycle: WAITING -> {NOTIFIED, CANCELLED},
/// NOTIFIED -> {PROMOTED, EXPIRED, CANCELLED}. Transitions are one-way;
/// an entry never returns to WAITING. Queue order is (is_vip DESC,
/// joined_at ASC): VIP entries are never overtaken by non-VIP entries.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct WaitlistEntry {
    pub id: String,
    pub session_id: String,
    pub gym_id: String,
    pub client_id: String,
    pub is_vip: bool,
    pub status: String,
    pub joined_at: DateTime<Utc>,
    pub notified_at: Option<DateTime<Utc>>,
    pub claim_expires_at: Option<DateTime<Utc>>,
    pub promoted_at: Option<DateTime<Utc>>,
}

impl WaitlistEntry {
    pub fn new(session_id: String, gym_id: String, client_id: String, is_vip: bool) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            session_id,
            gym_id,
            client_id,
            is_vip,
            status: "WAITING".to_string(),
            joined_at: Utc::now(),
            notified_at: None,
            claim_expires_at: None,
            promoted_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == "WAITING" || self.status == "NOTIFIED"
    }

    pub fn claim_lapsed(&self, now: DateTime<Utc>) -> bool {
        self.claim_expires_at.is_some_and(|deadline| now > deadline)
    }
}
