use crate::api::dtos::requests::{UpdateCheckinSettingsRequest, UpdateScheduleSettingsRequest};
use crate::api::extractors::{actor::Actor, gym::GymId};
use crate::api::handlers::ensure_permission;
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::State, response::IntoResponse, Json};
use std::sync::Arc;
use tracing::info;

pub async fn get_checkin_settings(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.settings_repo.checkin_settings(&gym_id).await?))
}

pub async fn update_checkin_settings(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Json(payload): Json<UpdateCheckinSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.modify_schedule_settings").await?;

    let mut settings = state.settings_repo.checkin_settings(&gym_id).await?;
    if let Some(seconds) = payload.qr_refresh_seconds {
        if seconds <= 0 {
            return Err(AppError::Validation("QR refresh interval must be positive".into()));
        }
        settings.qr_refresh_seconds = seconds;
    }
    if let Some(minutes) = payload.minutes_before { settings.minutes_before = minutes; }
    if let Some(minutes) = payload.minutes_after { settings.minutes_after = minutes; }
    if let Some(message) = payload.success_message { settings.success_message = message; }
    settings.updated_at = chrono::Utc::now();

    let saved = state.settings_repo.upsert_checkin_settings(&settings).await?;
    info!("Check-in settings updated for gym {}", gym_id);
    Ok(Json(saved))
}

pub async fn get_schedule_settings(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
) -> Result<impl IntoResponse, AppError> {
    Ok(Json(state.settings_repo.schedule_settings(&gym_id).await?))
}

pub async fn update_schedule_settings(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Json(payload): Json<UpdateScheduleSettingsRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.modify_schedule_settings").await?;

    let mut settings = state.settings_repo.schedule_settings(&gym_id).await?;
    if let Some(allowed) = payload.allow_room_overlaps { settings.allow_room_overlaps = allowed; }
    if let Some(allowed) = payload.allow_staff_overlaps { settings.allow_staff_overlaps = allowed; }
    if let Some(minutes) = payload.min_break_minutes { settings.min_break_minutes = minutes; }
    if let Some(mode) = payload.on_conflict {
        if !["FAIL", "SKIP"].contains(&mode.as_str()) {
            return Err(AppError::Validation(format!("Unknown conflict mode: {mode}")));
        }
        settings.on_conflict = mode;
    }
    if let Some(timezone) = payload.timezone {
        if timezone.parse::<chrono_tz::Tz>().is_err() {
            return Err(AppError::Validation(format!("Unknown timezone: {timezone}")));
        }
        settings.timezone = timezone;
    }
    settings.updated_at = chrono::Utc::now();

    let saved = state.settings_repo.upsert_schedule_settings(&settings).await?;
    info!("Schedule settings updated for gym {}", gym_id);
    Ok(Json(saved))
}
