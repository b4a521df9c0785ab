use crate::domain::{models::schedule::ScheduleRule, ports::RuleRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteRuleRepo {
    pool: SqlitePool,
}

impl SqliteRuleRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RuleRepository for SqliteRuleRepo {
    async fn create(&self, rule: &ScheduleRule) -> Result<ScheduleRule, AppError> {
        sqlx::query_as::<_, ScheduleRule>(
            r#"INSERT INTO schedule_rules (id, gym_id, activity_id, room_id, staff_id, day_of_week, start_time, end_time, start_date, end_date, is_active, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&rule.id)
            .bind(&rule.gym_id)
            .bind(&rule.activity_id)
            .bind(&rule.room_id)
            .bind(&rule.staff_id)
            .bind(rule.day_of_week)
            .bind(&rule.start_time)
            .bind(&rule.end_time)
            .bind(rule.start_date)
            .bind(rule.end_date)
            .bind(rule.is_active)
            .bind(rule.created_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<ScheduleRule>, AppError> {
        sqlx::query_as::<_, ScheduleRule>("SELECT * FROM schedule_rules WHERE gym_id = ? AND id = ?")
            .bind(gym_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, rule: &ScheduleRule) -> Result<ScheduleRule, AppError> {
        sqlx::query_as::<_, ScheduleRule>(
            r#"UPDATE schedule_rules SET room_id = ?, staff_id = ?, day_of_week = ?, start_time = ?, end_time = ?, end_date = ?, is_active = ?
               WHERE id = ? AND gym_id = ? RETURNING *"#
        )
            .bind(&rule.room_id)
            .bind(&rule.staff_id)
            .bind(rule.day_of_week)
            .bind(&rule.start_time)
            .bind(&rule.end_time)
            .bind(rule.end_date)
            .bind(rule.is_active)
            .bind(&rule.id)
            .bind(&rule.gym_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
