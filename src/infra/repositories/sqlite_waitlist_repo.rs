use crate::domain::{models::waitlist::WaitlistEntry, ports::WaitlistRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteWaitlistRepo {
    pool: SqlitePool,
}

impl SqliteWaitlistRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl WaitlistRepository for SqliteWaitlistRepo {
    async fn insert(&self, entry: &WaitlistEntry) -> Result<WaitlistEntry, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            r#"INSERT INTO waitlist_entries (id, session_id, gym_id, client_id, is_vip, status, joined_at, notified_at, claim_expires_at, promoted_at)
               VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
               RETURNING *"#
        )
            .bind(&entry.id)
            .bind(&entry.session_id)
            .bind(&entry.gym_id)
            .bind(&entry.client_id)
            .bind(entry.is_vip)
            .bind(&entry.status)
            .bind(entry.joined_at)
            .bind(entry.notified_at)
            .bind(entry.claim_expires_at)
            .bind(entry.promoted_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>("SELECT * FROM waitlist_entries WHERE gym_id = ? AND id = ?")
            .bind(gym_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_active(&self, session_id: &str, client_id: &str) -> Result<Option<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            "SELECT * FROM waitlist_entries WHERE session_id = ? AND client_id = ? AND status IN ('WAITING', 'NOTIFIED')"
        )
            .bind(session_id).bind(client_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn active_count(&self, session_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM waitlist_entries WHERE session_id = ? AND status IN ('WAITING', 'NOTIFIED')"
        )
            .bind(session_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn active_entries(&self, session_id: &str) -> Result<Vec<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            r#"SELECT * FROM waitlist_entries WHERE session_id = ? AND status IN ('WAITING', 'NOTIFIED')
               ORDER BY is_vip DESC, joined_at ASC"#
        )
            .bind(session_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn waiting_entries(&self, session_id: &str, exclude_client: Option<&str>, limit: Option<i64>) -> Result<Vec<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            r#"SELECT * FROM waitlist_entries
               WHERE session_id = ?1 AND status = 'WAITING' AND (?2 IS NULL OR client_id != ?2)
               ORDER BY is_vip DESC, joined_at ASC
               LIMIT ?3"#
        )
            .bind(session_id)
            .bind(exclude_client)
            .bind(limit.unwrap_or(-1))
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_promoted(&self, id: &str) -> Result<WaitlistEntry, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            "UPDATE waitlist_entries SET status = 'PROMOTED', promoted_at = ? WHERE id = ? RETURNING *"
        )
            .bind(Utc::now())
            .bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_notified(&self, id: &str, claim_expires_at: DateTime<Utc>) -> Result<WaitlistEntry, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            "UPDATE waitlist_entries SET status = 'NOTIFIED', notified_at = ?, claim_expires_at = ? WHERE id = ? RETURNING *"
        )
            .bind(Utc::now())
            .bind(claim_expires_at)
            .bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_cancelled(&self, id: &str) -> Result<WaitlistEntry, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            "UPDATE waitlist_entries SET status = 'CANCELLED' WHERE id = ? RETURNING *"
        )
            .bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_expired(&self, id: &str) -> Result<WaitlistEntry, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            "UPDATE waitlist_entries SET status = 'EXPIRED' WHERE id = ? RETURNING *"
        )
            .bind(id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn promote_active_for_client(&self, session_id: &str, client_id: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"UPDATE waitlist_entries SET status = 'PROMOTED', promoted_at = ?
               WHERE session_id = ? AND client_id = ? AND status IN ('WAITING', 'NOTIFIED')"#
        )
            .bind(Utc::now())
            .bind(session_id)
            .bind(client_id)
            .execute(&self.pool).await.map_err(AppError::Database)?;
        Ok(())
    }

    async fn lapsed_entries(&self, now: DateTime<Utc>) -> Result<Vec<WaitlistEntry>, AppError> {
        sqlx::query_as::<_, WaitlistEntry>(
            "SELECT * FROM waitlist_entries WHERE status = 'NOTIFIED' AND claim_expires_at < ?"
        )
            .bind(now)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn count_active_before(&self, session_id: &str, joined_at: DateTime<Utc>, vip_only: bool) -> Result<i64, AppError> {
        // For a VIP only earlier VIPs are ahead; for everyone else, every
        // VIP is ahead regardless of when it joined.
        let query = if vip_only {
            "SELECT COUNT(*) FROM waitlist_entries WHERE session_id = ? AND status IN ('WAITING', 'NOTIFIED') AND is_vip = 1 AND joined_at < ?"
        } else {
            "SELECT COUNT(*) FROM waitlist_entries WHERE session_id = ? AND status IN ('WAITING', 'NOTIFIED') AND (is_vip = 1 OR joined_at < ?)"
        };
        sqlx::query_scalar::<_, i64>(query)
            .bind(session_id)
            .bind(joined_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
