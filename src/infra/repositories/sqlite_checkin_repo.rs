use crate::domain::{models::checkin::Checkin, ports::CheckinRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteCheckinRepo {
    pool: SqlitePool,
}

impl SqliteCheckinRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CheckinRepository for SqliteCheckinRepo {
    async fn insert(&self, checkin: &Checkin) -> Result<Checkin, AppError> {
        sqlx::query_as::<_, Checkin>(
            r#"INSERT INTO checkins (id, session_id, gym_id, client_id, method, token, checked_in_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&checkin.id)
            .bind(&checkin.session_id)
            .bind(&checkin.gym_id)
            .bind(&checkin.client_id)
            .bind(&checkin.method)
            .bind(&checkin.token)
            .bind(checkin.checked_in_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find(&self, session_id: &str, client_id: &str) -> Result<Option<Checkin>, AppError> {
        sqlx::query_as::<_, Checkin>("SELECT * FROM checkins WHERE session_id = ? AND client_id = ?")
            .bind(session_id).bind(client_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_by_session(&self, session_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM checkins WHERE session_id = ?")
            .bind(session_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
