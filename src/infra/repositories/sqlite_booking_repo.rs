use crate::domain::{models::booking::Booking, ports::BookingRepository};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

pub struct SqliteBookingRepo {
    pool: SqlitePool,
}

impl SqliteBookingRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for SqliteBookingRepo {
    /// Capacity check and write as ONE statement, so concurrent calls are
    /// serialized by the database and can never both observe a free slot.
    /// The ON CONFLICT arm revives a previously cancelled row for the same
    /// client instead of violating the (session, client) uniqueness.
    async fn insert_confirmed_if_free(&self, booking: &Booking, max_capacity: i32) -> Result<bool, AppError> {
        let result = sqlx::query(
            r#"INSERT INTO bookings (id, session_id, gym_id, client_id, spot_number, status, attendance_status, booked_at, updated_at)
               SELECT ?1, ?2, ?3, ?4, ?5, 'CONFIRMED', 'PENDING', ?6, ?6
               WHERE (SELECT COUNT(*) FROM bookings
                      WHERE session_id = ?2 AND status = 'CONFIRMED' AND attendance_status != 'LATE_CANCEL') < ?7
                 AND NOT EXISTS (SELECT 1 FROM bookings
                      WHERE session_id = ?2 AND client_id = ?4 AND status IN ('CONFIRMED', 'PENDING'))
                 AND (?5 IS NULL OR NOT EXISTS (SELECT 1 FROM bookings
                      WHERE session_id = ?2 AND spot_number = ?5 AND status IN ('CONFIRMED', 'PENDING')))
               ON CONFLICT(session_id, client_id) DO UPDATE SET
                      status = 'CONFIRMED',
                      attendance_status = 'PENDING',
                      spot_number = excluded.spot_number,
                      booked_at = excluded.booked_at,
                      updated_at = excluded.updated_at,
                      marked_by = NULL,
                      marked_at = NULL
               WHERE bookings.status = 'CANCELLED'"#
        )
            .bind(&booking.id)
            .bind(&booking.session_id)
            .bind(&booking.gym_id)
            .bind(&booking.client_id)
            .bind(booking.spot_number)
            .bind(booking.booked_at)
            .bind(max_capacity)
            .execute(&self.pool)
            .await
            .map_err(AppError::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn find_by_id(&self, gym_id: &str, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE gym_id = ? AND id = ?")
            .bind(gym_id).bind(id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn find_active(&self, session_id: &str, client_id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE session_id = ? AND client_id = ? AND status IN ('CONFIRMED', 'PENDING')"
        )
            .bind(session_id).bind(client_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn confirmed_count(&self, session_id: &str) -> Result<i64, AppError> {
        sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings WHERE session_id = ? AND status = 'CONFIRMED' AND attendance_status != 'LATE_CANCEL'"
        )
            .bind(session_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn spot_holder(&self, session_id: &str, spot_number: i32) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            "SELECT * FROM bookings WHERE session_id = ? AND spot_number = ? AND status IN ('CONFIRMED', 'PENDING')"
        )
            .bind(session_id).bind(spot_number)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_by_session(&self, session_id: &str) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE session_id = ? ORDER BY booked_at ASC")
            .bind(session_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }

    async fn cancel(&self, booking_id: &str, attendance_status: Option<&str>) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            r#"UPDATE bookings SET status = 'CANCELLED',
                      attendance_status = COALESCE(?, attendance_status),
                      updated_at = ?
               WHERE id = ? RETURNING *"#
        )
            .bind(attendance_status)
            .bind(Utc::now())
            .bind(booking_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn mark_attendance(&self, booking_id: &str, status: &str, marked_by: &str) -> Result<Booking, AppError> {
        // LATE_CANCEL also closes the booking itself.
        sqlx::query_as::<_, Booking>(
            r#"UPDATE bookings SET attendance_status = ?1,
                      status = CASE WHEN ?1 = 'LATE_CANCEL' THEN 'CANCELLED' ELSE status END,
                      marked_by = ?2, marked_at = ?3, updated_at = ?3
               WHERE id = ?4 RETURNING *"#
        )
            .bind(status)
            .bind(marked_by)
            .bind(Utc::now())
            .bind(booking_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn set_spot(&self, booking_id: &str, spot_number: i32) -> Result<Booking, AppError> {
        sqlx::query_as::<_, Booking>(
            "UPDATE bookings SET spot_number = ?, updated_at = ? WHERE id = ? RETURNING *"
        )
            .bind(spot_number)
            .bind(Utc::now())
            .bind(booking_id)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn list_active_future_by_rule(&self, rule_id: &str, client_id: &str, from: DateTime<Utc>) -> Result<Vec<Booking>, AppError> {
        sqlx::query_as::<_, Booking>(
            r#"SELECT b.* FROM bookings b
               JOIN sessions s ON s.id = b.session_id
               WHERE s.rule_id = ? AND s.status = 'SCHEDULED' AND s.start_at >= ?
                 AND b.client_id = ? AND b.status IN ('CONFIRMED', 'PENDING')
               ORDER BY s.start_at ASC"#
        )
            .bind(rule_id)
            .bind(from)
            .bind(client_id)
            .fetch_all(&self.pool).await.map_err(AppError::Database)
    }
}
