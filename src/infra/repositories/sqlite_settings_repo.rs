use crate::domain::models::checkin::CheckinSettings;
use crate::domain::models::schedule::ScheduleSettings;
use crate::domain::ports::SettingsRepository;
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::SqlitePool;

pub struct SqliteSettingsRepo {
    pool: SqlitePool,
}

impl SqliteSettingsRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsRepository for SqliteSettingsRepo {
    async fn checkin_settings(&self, gym_id: &str) -> Result<CheckinSettings, AppError> {
        let found = sqlx::query_as::<_, CheckinSettings>("SELECT * FROM checkin_settings WHERE gym_id = ?")
            .bind(gym_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        Ok(found.unwrap_or_else(|| CheckinSettings::defaults(gym_id)))
    }

    async fn upsert_checkin_settings(&self, settings: &CheckinSettings) -> Result<CheckinSettings, AppError> {
        sqlx::query_as::<_, CheckinSettings>(
            r#"INSERT INTO checkin_settings (gym_id, qr_refresh_seconds, minutes_before, minutes_after, success_message, updated_at)
               VALUES (?, ?, ?, ?, ?, ?)
               ON CONFLICT(gym_id) DO UPDATE SET
                   qr_refresh_seconds = excluded.qr_refresh_seconds,
                   minutes_before = excluded.minutes_before,
                   minutes_after = excluded.minutes_after,
                   success_message = excluded.success_message,
                   updated_at = excluded.updated_at
               RETURNING *"#
        )
            .bind(&settings.gym_id)
            .bind(settings.qr_refresh_seconds)
            .bind(settings.minutes_before)
            .bind(settings.minutes_after)
            .bind(&settings.success_message)
            .bind(settings.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }

    async fn schedule_settings(&self, gym_id: &str) -> Result<ScheduleSettings, AppError> {
        let found = sqlx::query_as::<_, ScheduleSettings>("SELECT * FROM schedule_settings WHERE gym_id = ?")
            .bind(gym_id)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)?;
        Ok(found.unwrap_or_else(|| ScheduleSettings::defaults(gym_id)))
    }

    async fn upsert_schedule_settings(&self, settings: &ScheduleSettings) -> Result<ScheduleSettings, AppError> {
        sqlx::query_as::<_, ScheduleSettings>(
            r#"INSERT INTO schedule_settings (gym_id, allow_room_overlaps, allow_staff_overlaps, min_break_minutes, on_conflict, timezone, updated_at)
               VALUES (?, ?, ?, ?, ?, ?, ?)
               ON CONFLICT(gym_id) DO UPDATE SET
                   allow_room_overlaps = excluded.allow_room_overlaps,
                   allow_staff_overlaps = excluded.allow_staff_overlaps,
                   min_break_minutes = excluded.min_break_minutes,
                   on_conflict = excluded.on_conflict,
                   timezone = excluded.timezone,
                   updated_at = excluded.updated_at
               RETURNING *"#
        )
            .bind(&settings.gym_id)
            .bind(settings.allow_room_overlaps)
            .bind(settings.allow_staff_overlaps)
            .bind(settings.min_break_minutes)
            .bind(&settings.on_conflict)
            .bind(&settings.timezone)
            .bind(settings.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
}
