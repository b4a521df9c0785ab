use crate::domain::{models::activity::Activity, ports::ActivityRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteActivityRepo {
    pool: SqlitePool,
}

impl SqliteActivityRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ActivityRepository for SqliteActivityRepo {
    async fn create(&self, activity: &Activity) -> Result<Activity, AppError> {
        sqlx::query_as::<_, Activity>(
            r#"INSERT INTO activities (id, gym_id, name, description, color, duration_min, base_capacity, qr_checkin_enabled, allow_spot_booking, policy_id, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&activity.id)
            .bind(&activity.gym_id)
            .bind(&activity.name)
            .bind(&activity.description)
            .bind(&activity.color)
            .bind(activity.duration_min)
            .bind(activity.base_capacity)
            .bind(activity.qr_checkin_enabled)
            .bind(activity.allow_spot_booking)
            .bind(&activity.policy_id)
            .bind(activity.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<Activity>, AppError> {
        sqlx::query_as::<_, Activity>("SELECT * FROM activities WHERE gym_id = ? AND id = ?")
            .bind(gym_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list(&self, gym_id: &str) -> Result<Vec<Activity>, AppError> {
        sqlx::query_as::<_, Activity>("SELECT * FROM activities WHERE gym_id = ? ORDER BY name ASC")
            .bind(gym_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, activity: &Activity) -> Result<Activity, AppError> {
        sqlx::query_as::<_, Activity>(
            r#"UPDATE activities SET name = ?, description = ?, color = ?, duration_min = ?, base_capacity = ?, qr_checkin_enabled = ?, allow_spot_booking = ?, policy_id = ?
               WHERE id = ? AND gym_id = ? RETURNING *"#
        )
            .bind(&activity.name)
            .bind(&activity.description)
            .bind(&activity.color)
            .bind(activity.duration_min)
            .bind(activity.base_capacity)
            .bind(activity.qr_checkin_enabled)
            .bind(activity.allow_spot_booking)
            .bind(&activity.policy_id)
            .bind(&activity.id)
            .bind(&activity.gym_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn delete(&self, gym_id: &str, id: &str) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM activities WHERE id = ? AND gym_id = ?")
            .bind(id).bind(gym_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Activity not found".into()));
        }
        Ok(())
    }
}
