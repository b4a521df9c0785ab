use crate::domain::{models::activity::ActivityPolicy, ports::PolicyRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqlitePolicyRepo {
    pool: SqlitePool,
}

impl SqlitePolicyRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PolicyRepository for SqlitePolicyRepo {
    async fn create(&self, policy: &ActivityPolicy) -> Result<ActivityPolicy, AppError> {
        sqlx::query_as::<_, ActivityPolicy>(
            r#"INSERT INTO activity_policies (id, gym_id, name, cancellation_window_hours, penalty_type, waitlist_enabled, waitlist_mode, waitlist_limit, waitlist_claim_timeout_minutes, auto_promote_cutoff_hours, broadcast_count, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&policy.id)
            .bind(&policy.gym_id)
            .bind(&policy.name)
            .bind(policy.cancellation_window_hours)
            .bind(&policy.penalty_type)
            .bind(policy.waitlist_enabled)
            .bind(&policy.waitlist_mode)
            .bind(policy.waitlist_limit)
            .bind(policy.waitlist_claim_timeout_minutes)
            .bind(policy.auto_promote_cutoff_hours)
            .bind(policy.broadcast_count)
            .bind(policy.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<ActivityPolicy>, AppError> {
        sqlx::query_as::<_, ActivityPolicy>("SELECT * FROM activity_policies WHERE gym_id = ? AND id = ?")
            .bind(gym_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, gym_id: &str) -> Result<Vec<ActivityPolicy>, AppError> {
        sqlx::query_as::<_, ActivityPolicy>("SELECT * FROM activity_policies WHERE gym_id = ? ORDER BY name ASC")
            .bind(gym_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
