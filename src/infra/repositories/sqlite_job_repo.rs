use crate::domain::{models::job::NotificationJob, ports::NotificationJobRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteJobRepo {
    pool: SqlitePool,
}

impl SqliteJobRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationJobRepository for SqliteJobRepo {
    async fn enqueue(&self, job: &NotificationJob) -> Result<(), AppError> {
        sqlx::query(
            r#"INSERT INTO notification_jobs (id, gym_id, client_id, session_id, event_type, status, error_message, created_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?)"#
        )
            .bind(&job.id)
            .bind(&job.gym_id)
            .bind(&job.client_id)
            .bind(&job.session_id)
            .bind(&job.event_type)
            .bind(&job.status)
            .bind(&job.error_message)
            .bind(job.created_at)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn find_pending(&self, limit: i32) -> Result<Vec<NotificationJob>, AppError> {
        sqlx::query_as::<_, NotificationJob>(
            "SELECT * FROM notification_jobs WHERE status = 'PENDING' ORDER BY created_at ASC LIMIT ?"
        )
            .bind(limit)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update_status(&self, id: &str, status: &str, error_message: Option<String>) -> Result<(), AppError> {
        sqlx::query("UPDATE notification_jobs SET status = ?, error_message = ? WHERE id = ?")
            .bind(status)
            .bind(error_message)
            .bind(id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }
}
