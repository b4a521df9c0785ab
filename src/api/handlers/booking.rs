use crate::api::dtos::requests::{AddAttendeeRequest, ChangeSpotRequest, MarkAttendanceRequest, RemoveAttendeeQuery};
use crate::api::extractors::{actor::Actor, gym::GymId};
use crate::api::handlers::{ensure_permission, load_policy};
use crate::domain::services::spots;
use crate::error::AppError;
use crate::state::AppState;
use axum::{extract::{Path, Query, State}, response::IntoResponse, Json};
use chrono::Utc;
use serde_json::json;
use std::collections::HashSet;
use std::sync::Arc;

pub async fn add_attendee(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, session_id)): Path<(String, String)>,
    Json(payload): Json<AddAttendeeRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.manage_activity_sessions").await?;

    let session = state.session_repo.find_by_id(&gym_id, &session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    let activity = state.activity_repo.find_by_id(&gym_id, &session.activity_id).await?
        .ok_or(AppError::Internal)?;

    // A requested spot must exist in the room's floor plan.
    if let Some(spot) = payload.spot_number
        && activity.allow_spot_booking
        && let Some(room_id) = &session.room_id
    {
        let room = state.room_repo.find_by_id(&gym_id, room_id).await?
            .ok_or(AppError::Internal)?;
        let layout = spots::parse_layout(&room.layout_json);
        if !layout.is_empty() && !spots::layout_has_spot(&layout, spot) {
            return Err(AppError::Validation(format!("Spot #{spot} does not exist in this room")));
        }
    }

    let booking = state.booking_service
        .add_attendee(&session, &activity, &payload.client_id, payload.spot_number)
        .await?;
    let attendee_count = state.booking_repo.confirmed_count(&session.id).await?;

    Ok(Json(json!({
        "status": "ok",
        "booking": booking,
        "attendee_count": attendee_count,
    })))
}

pub async fn remove_attendee(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, session_id, client_id)): Path<(String, String, String)>,
    Query(query): Query<RemoveAttendeeQuery>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.manage_activity_sessions").await?;

    let session = state.session_repo.find_by_id(&gym_id, &session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    let activity = state.activity_repo.find_by_id(&gym_id, &session.activity_id).await?
        .ok_or(AppError::Internal)?;
    let policy = load_policy(&state, &gym_id, &activity).await?;

    let outcome = state.booking_service
        .remove_attendee(
            &session,
            policy.as_ref(),
            &client_id,
            query.mode.as_deref().unwrap_or("single"),
            query.cancellation_type.as_deref(),
            Utc::now(),
        )
        .await?;
    let attendee_count = state.booking_repo.confirmed_count(&session.id).await?;

    Ok(Json(json!({
        "status": "ok",
        "cancellation_type": outcome.cancellation_type,
        "removed": outcome.removed,
        "moved_to_waitlist": outcome.moved_to_waitlist,
        "promoted": outcome.promoted,
        "notified": outcome.notified,
        "attendee_count": attendee_count,
    })))
}

pub async fn mark_attendance(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, _session_id)): Path<(String, String)>,
    Json(payload): Json<MarkAttendanceRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.manage_activity_sessions").await?;

    let booking = state.booking_repo.find_by_id(&gym_id, &payload.booking_id).await?
        .ok_or(AppError::NotFound("Booking not found".into()))?;
    let updated = state.booking_service.mark_attendance(&booking, &payload.status, &actor).await?;

    Ok(Json(json!({ "status": "ok", "booking": updated })))
}

/// Floor-plan view: spots with availability plus obstacles, for the
/// visual spot picker.
pub async fn get_spots(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Path((_, session_id)): Path<(String, String)>,
) -> Result<impl IntoResponse, AppError> {
    let session = state.session_repo.find_by_id(&gym_id, &session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    let activity = state.activity_repo.find_by_id(&gym_id, &session.activity_id).await?
        .ok_or(AppError::Internal)?;

    if !activity.allow_spot_booking {
        return Ok(Json(json!({ "allow_spot_booking": false })));
    }
    let Some(room_id) = &session.room_id else {
        return Ok(Json(json!({ "allow_spot_booking": true, "has_layout": false })));
    };
    let room = state.room_repo.find_by_id(&gym_id, room_id).await?
        .ok_or(AppError::Internal)?;

    let layout = spots::parse_layout(&room.layout_json);
    if layout.is_empty() {
        return Ok(Json(json!({ "allow_spot_booking": true, "has_layout": false })));
    }

    let occupied: HashSet<i32> = state.booking_repo.list_by_session(&session.id).await?
        .iter()
        .filter(|b| b.is_active())
        .filter_map(|b| b.spot_number)
        .collect();
    let (spot_list, obstacles) = spots::spot_states(&layout, &occupied);

    Ok(Json(json!({
        "allow_spot_booking": true,
        "has_layout": true,
        "session_id": session.id,
        "room_name": room.name,
        "spots": spot_list,
        "obstacles": obstacles,
        "available_spots": spot_list.iter().filter(|s| s.status == "available").count(),
        "occupied_spots": occupied.len(),
    })))
}

pub async fn change_spot(
    State(state): State<Arc<AppState>>,
    GymId(gym_id): GymId,
    Actor(actor): Actor,
    Path((_, session_id)): Path<(String, String)>,
    Json(payload): Json<ChangeSpotRequest>,
) -> Result<impl IntoResponse, AppError> {
    ensure_permission(&state, &actor, &gym_id, "activities.manage_activity_sessions").await?;

    let session = state.session_repo.find_by_id(&gym_id, &session_id).await?
        .ok_or(AppError::NotFound("Session not found".into()))?;
    let activity = state.activity_repo.find_by_id(&gym_id, &session.activity_id).await?
        .ok_or(AppError::Internal)?;

    if let Some(room_id) = &session.room_id {
        let room = state.room_repo.find_by_id(&gym_id, room_id).await?
            .ok_or(AppError::Internal)?;
        let layout = spots::parse_layout(&room.layout_json);
        if !layout.is_empty() && !spots::layout_has_spot(&layout, payload.spot_number) {
            return Err(AppError::Validation(format!(
                "Spot #{} does not exist in this room",
                payload.spot_number
            )));
        }
    }

    let booking = state.booking_service
        .change_spot(&session, &activity, &payload.client_id, payload.spot_number)
        .await?;
    Ok(Json(json!({ "status": "ok", "booking": booking })))
}
