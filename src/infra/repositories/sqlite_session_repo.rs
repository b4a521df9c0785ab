use crate::domain::{models::session::Session, ports::SessionRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteSessionRepo {
    pool: SqlitePool,
}

impl SqliteSessionRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqliteSessionRepo {
    async fn create(&self, session: &Session) -> Result<Session, AppError> {
        // qr_seq is handed out by the insert itself so concurrent creates
        // cannot collide.
        sqlx::query_as::<_, Session>(
            r#"INSERT INTO sessions (id, qr_seq, gym_id, activity_id, rule_id, room_id, staff_id, start_at, end_at, status, max_capacity, notes, created_at, updated_at)
               VALUES (?, (SELECT IFNULL(MAX(qr_seq), 0) + 1 FROM sessions), ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&session.id)
            .bind(&session.gym_id)
            .bind(&session.activity_id)
            .bind(&session.rule_id)
            .bind(&session.room_id)
            .bind(&session.staff_id)
            .bind(session.start_at)
            .bind(session.end_at)
            .bind(&session.status)
            .bind(session.max_capacity)
            .bind(&session.notes)
            .bind(session.created_at)
            .bind(session.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<Session>, AppError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE gym_id = ? AND id = ?")
            .bind(gym_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_qr_seq(&self, qr_seq: i64) -> Result<Option<Session>, AppError> {
        sqlx::query_as::<_, Session>("SELECT * FROM sessions WHERE qr_seq = ?")
            .bind(qr_seq)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_range(&self, gym_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Vec<Session>, AppError> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE gym_id = ? AND start_at < ? AND end_at > ? AND status != 'CANCELLED' ORDER BY start_at ASC"
        )
            .bind(gym_id).bind(end).bind(start)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_future_by_rule(&self, rule_id: &str, from: DateTime<Utc>) -> Result<Vec<Session>, AppError> {
        sqlx::query_as::<_, Session>(
            "SELECT * FROM sessions WHERE rule_id = ? AND start_at >= ? AND status = 'SCHEDULED' ORDER BY start_at ASC"
        )
            .bind(rule_id).bind(from)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn update(&self, session: &Session) -> Result<Session, AppError> {
        sqlx::query_as::<_, Session>(
            r#"UPDATE sessions SET room_id = ?, staff_id = ?, start_at = ?, end_at = ?, status = ?, max_capacity = ?, notes = ?, updated_at = ?
               WHERE id = ? RETURNING *"#
        )
            .bind(&session.room_id)
            .bind(&session.staff_id)
            .bind(session.start_at)
            .bind(session.end_at)
            .bind(&session.status)
            .bind(session.max_capacity)
            .bind(&session.notes)
            .bind(Utc::now())
            .bind(&session.id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel_future_by_rule(&self, rule_id: &str, from: DateTime<Utc>) -> Result<u64, AppError> {
        let result = sqlx::query(
            "UPDATE sessions SET status = 'CANCELLED', updated_at = ? WHERE rule_id = ? AND start_at >= ? AND status = 'SCHEDULED'"
        )
            .bind(Utc::now())
            .bind(rule_id)
            .bind(from)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.rows_affected())
    }

    async fn count_by_activity(&self, activity_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM sessions WHERE activity_id = ?")
            .bind(activity_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
