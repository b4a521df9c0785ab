use crate::api::dtos::requests::QrCheckinRequest;
use crate::api::dtos::responses::QrDisplayResponse;
use crate::api::extractors::gym::GymId;
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::{Path, State}, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::sync::Arc;

/// Data for the projected QR screen, polled by the display every few
/// seconds. The token embedded here is what attendees scan.
pub async fn qr_display(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Path((_, session_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session_repo.find_by_id(&gym_id, &session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    let settings = state.settings_repo.checkin_settings(&gym_id).await?;

    let display = state.checkin_service.display_data(&session, &settings, Utc::now());
    let attendee_count = state.booking_repo.confirmed_count(&session.id).await?;
    let checkins = state.checkin_repo.count_by_session(&session.id).await?;

    Ok(Json(QrDisplayResponse {
        url: format!("/api/v1/{}/checkin/qr/{}", gym_id, display.token),
        token: display.token,
        refresh_in: display.refresh_in,
        session_id: display.session_id,
        attendee_count,
        checkins,
        max_capacity: session.max_capacity,
    }))
}

/// The scan target. No staff gate: the rotating HMAC token plus the
/// booking requirement are what authorize the call.
pub async fn qr_checkin(
    State(state): State<Arc<AppState>>,
    GymId(_gym_id): GymId,
    Path((_, token)): Path<(String, String)>,
    Json(payload): Json<QrCheckinRequest>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = state.checkin_service
        .checkin_by_qr(&token, &payload.client_id, Utc::now())
        .await?;

    Ok(Json(json!({
        "success": true,
        "already_checked_in": outcome.already_checked_in,
        "message": outcome.message,
        "checked_in_at": outcome.checkin.checked_in_at,
    })))
}
